pub mod emoncms;
pub mod publisher;

pub use emoncms::{EmonCmsConfig, EmonCmsPublisher, FieldNames};
pub use publisher::{PublishError, Result, TelemetryPublisher};
