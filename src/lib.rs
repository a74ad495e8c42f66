pub mod api;
pub mod config;
pub mod logger;
pub mod reading;
pub mod room;
pub mod scan;
pub mod store;
pub mod switchbot;
pub mod uploader;
