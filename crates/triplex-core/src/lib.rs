// triplex-core: Query routing and response normalization over triplex-api.

pub mod config;
pub mod datasource;
pub mod error;
pub mod handler;
pub mod health;
pub mod model;
pub mod normalize;
pub mod proxy;
pub mod router;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DataSourceConfig, DataSourceSettings, TlsVerification};
pub use datasource::DataSource;
pub use error::CoreError;
pub use health::{CheckHealthResult, HealthStatus};
pub use proxy::Backend;

pub use model::{
    // Queries
    DataQuery, LogsQuery, MetricsQuery, Query, QueryKind, QueryType, RestQuery, TimeRange,
    // Frames
    Field, FieldConfig, FieldValues, Frame, FrameType,
    // Results
    DataResponse, QueryDataResponse,
};

// Credential and proxy types come straight from the API layer.
pub use triplex_api::{BasicAuth, Credentials, ProxyRequest, ProxyResponse};
