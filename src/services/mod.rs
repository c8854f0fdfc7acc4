pub mod notifier;
pub mod tracker;

pub use notifier::{AlertSink, Notifier, NotifyError};
pub use tracker::{run_tracker, CycleReport, Tracker};
