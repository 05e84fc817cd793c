// Loki HTTP API: `/loki/api/v1/query_range`.

mod client;
pub mod models;

pub use client::LokiClient;
pub use models::{LogQueryData, Stream};
