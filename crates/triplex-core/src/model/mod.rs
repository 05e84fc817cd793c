// Query, Frame and result types shared by the router, handlers and
// normalizers.

pub mod frame;
pub mod query;
pub mod response;

pub use frame::{Field, FieldConfig, FieldValues, Frame, FrameType};
pub use query::{DataQuery, LogsQuery, MetricsQuery, Query, QueryKind, QueryType, RestQuery, TimeRange};
pub use response::{DataResponse, QueryDataResponse};
