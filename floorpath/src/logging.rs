use env_logger::Env;

/// Install the global logger. `RUST_LOG` still wins over `level`; repeated calls are no-ops.
pub fn init(level: Option<&str>) {
    let default = level.unwrap_or("info");
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}
