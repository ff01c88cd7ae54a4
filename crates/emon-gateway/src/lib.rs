pub mod clock;
pub mod config;
pub mod tasks;

pub use clock::{ClockSource, SystemClockSource};
pub use config::AppConfig;
