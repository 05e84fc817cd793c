// Prometheus HTTP API: `/api/v1/query`, `/api/v1/query_range`, `/-/healthy`.

mod client;
pub mod models;

pub use client::{PrometheusClient, RangeParams};
pub use models::{ApiResponse, InstantSample, QueryData, RangeSeries, Sample};
