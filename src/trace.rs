//! Queue lifecycle and backpressure events.
//!
//! With `--features tracing`, construction, rejected capacities and values dropped along with
//! a queue are logged at `debug`, and every `Full`/`Empty` result at `trace` together with the
//! position it was detected at. Without the feature the macros expand to nothing.

/// Print seqring events to stdout, filtered by `RUST_LOG` (default `seqring=trace`).
///
/// Safe to call from several tests in one binary: only the first call installs a subscriber.
/// A no-op unless the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seqring=trace"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_thread_ids(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
macro_rules! noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as trace;
