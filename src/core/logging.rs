use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the level from warn to
/// info, `-vv` to debug.
pub fn init(verbose: u8) {
  let level = match verbose {
    0 => Level::WARN,
    1 => Level::INFO,
    _ => Level::DEBUG,
  };

  let filter = match std::env::var("RUST_LOG") {
    Ok(_) => EnvFilter::from_default_env(),
    Err(_) => EnvFilter::new(format!("cargo_affected={}", level)),
  };

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .try_init();
}
