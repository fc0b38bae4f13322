use std::env;

/// Install the terminal logger, filtered by `RUST_LOG` and defaulting to `info`
pub fn init() {
    let filters = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}
