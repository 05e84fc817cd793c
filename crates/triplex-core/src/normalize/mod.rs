// Response Normalizer: turns each backend's payload into Frames.

pub mod coerce;
pub mod logs;
pub mod metrics;
pub mod rest;

pub use logs::{log_frames, log_series_name};
pub use metrics::{metric_frames, series_name};
pub use rest::{JsonShape, RestContext, rest_frames};
