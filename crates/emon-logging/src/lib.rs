pub mod error;
pub mod handle;
pub mod record;
pub mod sink;

pub use error::{LogSinkError, Result};
pub use handle::LogHandle;
pub use record::{LogLevel, LogRecord};
pub use sink::{RotatingFileSink, RotationPolicy};
