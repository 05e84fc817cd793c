//! `triplex health`: run the connectivity probe.

use tokio_util::sync::CancellationToken;

use triplex_core::DataSource;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::{config, output};

pub async fn handle(global: &GlobalOpts, cancel: &CancellationToken) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let source = DataSource::new(config::from_profile(global, &cfg)?)?;

    let result = source.check_health(cancel).await;
    tracing::info!(status = %result.status, message = %result.message, "health check finished");

    let format = config::output_format(global, &cfg);
    let rendered = output::render_health(format, &result, output::should_color(global.color));
    output::print_output(&rendered, global.quiet);

    if result.is_ok() {
        Ok(())
    } else if !source.config().has_any_backend() {
        Err(CliError::NoBackends {
            path: triplex_config::config_path().display().to_string(),
        })
    } else {
        Err(CliError::Unhealthy {
            message: result.message,
        })
    }
}
