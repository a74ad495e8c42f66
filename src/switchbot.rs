mod decoder;
mod rejection;

pub use decoder::*;
pub use rejection::*;
