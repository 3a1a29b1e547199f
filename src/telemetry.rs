#[cfg(feature = "telemetry")]
use std::sync::OnceLock;

#[cfg(feature = "telemetry")]
use tracing_subscriber::{EnvFilter, fmt};

/// Install the tracing subscriber once per process.
///
/// `RUST_LOG` wins when set; otherwise `java_clippy=info`, or
/// `java_clippy=debug` when `verbose` is on.
pub fn init_tracing(verbose: bool) {
    #[cfg(feature = "telemetry")]
    static INIT: OnceLock<()> = OnceLock::new();

    #[cfg(feature = "telemetry")]
    {
        INIT.get_or_init(|| {
            let default = if verbose {
                "java_clippy=debug"
            } else {
                "java_clippy=info"
            };
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
            let _ = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        });
    }

    #[cfg(not(feature = "telemetry"))]
    let _ = verbose;
}

/// Run a block inside a `java_clippy` span tagged with `phase`.
#[macro_export]
macro_rules! instrument_block {
    ($name:expr, $block:block) => {{
        let span = tracing::info_span!("java_clippy", phase = $name);
        let _guard = span.enter();
        (|| $block)()
    }};
}
