use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// Log records go to stderr so they never mix with status lines or JSON
/// reports on stdout. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None);

    // `try_init` only fails if a logger was already set
    let _ = builder.try_init();
}
