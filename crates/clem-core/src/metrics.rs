//! Episode metric keys logged by game masters

pub const METRIC_ABORTED: &str = "Aborted";
pub const METRIC_SUCCESS: &str = "Success";
pub const METRIC_LOSE: &str = "Lose";

pub const METRIC_REQUEST_COUNT: &str = "Request Count";
pub const METRIC_REQUEST_COUNT_PARSED: &str = "Request Count Parsed";
pub const METRIC_REQUEST_COUNT_VIOLATED: &str = "Request Count Violated";
