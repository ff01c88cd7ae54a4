pub mod client;
pub mod error;
pub mod reading;
pub mod types;

pub use client::{ModbusMeterClient, RegisterSource};
pub use error::{MeterError, Result};
pub use reading::{EnergyReading, INPUT_REGISTER_COUNT};
pub use types::MeterConfig;
