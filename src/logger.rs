use std::env;

const DEFAULT_FILTER: &str = "info";

/// Timed `pretty_env_logger`, filtered by `RUST_LOG` or `info` when unset.
pub fn init() {
    let filters = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();
}
