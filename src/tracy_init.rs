//! Tracy profiler initialization.

use tracing_subscriber::prelude::*;
use tracing_tracy::TracyLayer;

/// Installs the Tracy layer as the global subscriber. Bevy's `LogPlugin`
/// must be disabled, it would try to install its own.
pub fn init_tracy() {
  tracing_subscriber::registry()
    .with(TracyLayer::default())
    .init();
}
