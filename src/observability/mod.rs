pub mod logging;
pub mod telemetry;

pub use logging::{JsonLineLogger, LogLevel, LoggingError, DEFAULT_RETAINED_LINES};
pub use telemetry::ConsensusTelemetry;
