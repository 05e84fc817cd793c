//! `triplex proxy`: raw passthrough to one backend.

use std::io::Write;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use triplex_core::{DataSource, ProxyRequest};

use crate::cli::{GlobalOpts, ProxyArgs};
use crate::config;
use crate::error::CliError;

/// Parse repeated `-H 'Name: value'` arguments.
fn parse_headers(raw: &[String]) -> Result<HeaderMap, CliError> {
    let mut headers = HeaderMap::new();
    for line in raw {
        let (name, value) = line.split_once(':').ok_or_else(|| {
            CliError::validation("header", format!("expected 'Name: value', got '{line}'"))
        })?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| CliError::validation("header", format!("'{name}': {e}")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| CliError::validation("header", format!("'{line}': {e}")))?;
        headers.append(name, value);
    }
    Ok(headers)
}

fn build_request(args: ProxyArgs) -> Result<ProxyRequest, CliError> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|e| CliError::validation("method", e.to_string()))?;
    let (path, query) = match args.path.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (args.path, None),
    };

    Ok(ProxyRequest {
        method,
        path,
        query,
        headers: parse_headers(&args.headers)?,
        body: args.data.map(Bytes::from).unwrap_or_default(),
    })
}

pub async fn handle(args: ProxyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let source = DataSource::new(config::from_profile(global, &cfg)?)?;

    let backend = args.backend.clone();
    let request = build_request(args)?;
    let response = source.call_resource(&backend, request).await;

    if !global.quiet {
        eprintln!("HTTP {}", response.status);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&response.body)?;
        if !response.body.ends_with(b"\n") {
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
