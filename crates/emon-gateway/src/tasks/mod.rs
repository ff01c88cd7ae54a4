pub mod clock_sync;
pub mod log_maintenance;
pub mod poller;

pub use clock_sync::ClockSyncTask;
pub use log_maintenance::LogMaintenanceTask;
pub use poller::PollerTask;
