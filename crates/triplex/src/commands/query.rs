//! `triplex query`: run one batch request.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use triplex_core::{DataQuery, DataSource, DataSourceSettings};

use crate::cli::{GlobalOpts, QueryArgs};
use crate::error::CliError;
use crate::{config, output};

/// A batch as read from the request file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    /// Host-style settings; the active profile is used when absent.
    #[serde(default)]
    settings: Option<DataSourceSettings>,
    queries: Vec<DataQuery>,
}

fn read_batch(file: Option<&Path>) -> Result<BatchRequest, CliError> {
    let raw = match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

pub async fn handle(
    args: QueryArgs,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let batch = read_batch(args.file.as_deref())?;
    let cfg = config::load(global)?;

    let ds_config = match batch.settings {
        Some(ref settings) => config::from_settings(global, settings)?,
        None => config::from_profile(global, &cfg)?,
    };
    let source = DataSource::new(ds_config)?;

    debug!(queries = batch.queries.len(), "executing batch");
    let result = source.query_data(&batch.queries, cancel).await;

    let format = config::output_format(global, &cfg);
    let rendered =
        output::render_query_result(format, &result, output::should_color(global.color));
    output::print_output(&rendered, global.quiet);

    let failed = result.error_count();
    if args.fail_on_error && failed > 0 {
        return Err(CliError::QueryFailed {
            failed,
            total: result.len(),
        });
    }
    Ok(())
}
