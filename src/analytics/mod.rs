pub mod aggregator;
pub mod change_detector;
pub mod format;

pub use aggregator::{aggregate, AggregateError};
pub use change_detector::{
    detect_alert, AlertDecision, AlertPolicy, AssetDelta, Detection, RelativeDelta,
};
pub use format::format_fixed_point;
