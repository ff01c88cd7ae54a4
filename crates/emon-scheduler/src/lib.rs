pub mod scheduler;
pub mod task;

pub use scheduler::IntervalScheduler;
pub use task::{drift_corrected_delay, PeriodicTask};
