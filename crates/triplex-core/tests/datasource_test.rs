#![allow(clippy::unwrap_used)]
// End-to-end tests for `DataSource` against wiremock backends.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use triplex_core::{
    BasicAuth, Credentials, DataQuery, DataSource, DataSourceConfig, FieldValues, FrameType,
    HealthStatus, ProxyRequest,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn url(server: &MockServer) -> Option<Url> {
    Some(Url::parse(&server.uri()).unwrap())
}

fn query(raw: serde_json::Value) -> DataQuery {
    serde_json::from_value(raw).unwrap()
}

fn datasource(config: DataSourceConfig) -> DataSource {
    DataSource::new(config).unwrap()
}

// ── Metrics ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_instant_metrics_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .and(query_param("query", "up"))
        .and(query_param("time", "1704067200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"resultType": "vector", "result": [
                {"metric": {"__name__": "up", "job": "node"}, "value": [1_704_067_200, "1"]}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        metrics_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({
                "refId": "A",
                "queryType": "prometheus",
                "promQL": "up",
                "timeRange": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-01T00:00:00Z"}
            }))],
            &CancellationToken::new(),
        )
        .await;

    let frames = result.get("A").unwrap().frames().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].row_count(), 1);
    assert_eq!(frames[0].fields[1].display_name(), "up");
    assert_eq!(frames[0].fields[1].values, FieldValues::Number(vec![Some(1.0)]));
}

#[tokio::test]
async fn test_range_metrics_query_uses_interval_as_step() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/query_range"))
        .and(query_param("start", "1704067200"))
        .and(query_param("end", "1704070800"))
        .and(query_param("step", "60s"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"resultType": "matrix", "result": [{
                "metric": {"instance": "a"},
                "values": [[1_704_067_200, "1"], [1_704_067_260, "2"], [1_704_067_320, "3"]]
            }]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        metrics_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({
                "refId": "A",
                "queryType": "prometheus",
                "promQL": "rate(x[5m])",
                "intervalMs": 60000,
                "timeRange": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-01T01:00:00Z"}
            }))],
            &CancellationToken::new(),
        )
        .await;

    let frames = result.get("A").unwrap().frames().unwrap();
    assert_eq!(frames[0].fields[0].len(), 3);
    assert_eq!(frames[0].fields[1].len(), 3);
}

#[tokio::test]
async fn test_expression_is_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .and(query_param("query", "  sum(up)\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"resultType": "vector", "result": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        metrics_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({"refId": "A", "queryType": "prometheus", "promQL": "  sum(up)\n"}))],
            &CancellationToken::new(),
        )
        .await;

    assert!(!result.get("A").unwrap().is_error());
}

#[tokio::test]
async fn test_missing_expression_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        metrics_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[
                query(json!({"refId": "A", "queryType": "prometheus", "promQL": "  "})),
                query(json!({"refId": "B", "queryType": "loki", "logQL": "{a=\"b\"}"})),
            ],
            &CancellationToken::new(),
        )
        .await;

    let a = result.get("A").unwrap().error().unwrap();
    assert_eq!(a.kind(), "configuration");
    assert_eq!(a.to_string(), "Configuration error: PromQL expression is required");
    let b = result.get("B").unwrap().error().unwrap();
    assert_eq!(b.to_string(), "Configuration error: Loki URL not configured");
}

// ── Logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_logs_query_uses_configured_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loki/api/v1/query_range"))
        .and(query_param("limit", "50"))
        .and(query_param("start", "1704067200000000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"resultType": "streams", "result": [
                {"stream": {"job": "api"}, "values": [["1704067201000000000", "hello"]]},
                {"stream": {"job": "empty"}, "values": [["bad", "x"]]}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        logs_url: url(&server),
        log_limit: 50,
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({
                "refId": "L",
                "queryType": "loki",
                "logQL": "{job=\"api\"}",
                "timeRange": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-01T00:05:00Z"}
            }))],
            &CancellationToken::new(),
        )
        .await;

    let frames = result.get("L").unwrap().frames().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].frame_type, Some(FrameType::LogLines));
}

// ── REST ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rest_data_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/metrics"))
        .and(header("x-tenant", "ops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"time": "2024-01-01T00:00:00Z", "value": 5},
            {"time": "2024-01-01T00:01:00Z", "value": 7}
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: Some(Url::parse(&format!("{}/v1/", server.uri())).unwrap()),
        rest_headers: [("X-Tenant".to_owned(), "ops".to_owned())].into(),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({"refId": "R", "queryType": "rest", "restEndpoint": "/metrics"}))],
            &CancellationToken::new(),
        )
        .await;

    let frames = result.get("R").unwrap().frames().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].frame_type, Some(FrameType::TimeSeries));
    assert_eq!(frames[0].row_count(), 2);
    assert_eq!(
        frames[0].field("value").unwrap().values,
        FieldValues::Number(vec![Some(5.0), Some(7.0)])
    );
}

#[tokio::test]
async fn test_rest_object_is_one_row_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cpu": 42, "status": "ok"})))
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({"refId": "S", "queryType": "rest", "restEndpoint": "status"}))],
            &CancellationToken::new(),
        )
        .await;

    let frame = &result.get("S").unwrap().frames().unwrap()[0];
    assert_eq!(frame.frame_type, Some(FrameType::Table));
    assert_eq!(frame.row_count(), 1);
    assert_eq!(frame.field("cpu").unwrap().values, FieldValues::Mixed(vec![json!(42)]));
    assert_eq!(frame.field("status").unwrap().values, FieldValues::Mixed(vec![json!("ok")]));
}

#[tokio::test]
async fn test_basic_auth_only_sends_basic_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(|req: &Request| {
            let auth = req.headers.get("authorization").map(|v| v.to_str().unwrap().to_owned());
            let has_key = req.headers.contains_key("x-api-key");
            if auth.as_deref() == Some("Basic dXNlcjpwYXNz") && !has_key {
                ResponseTemplate::new(200).set_body_json(json!([]))
            } else {
                ResponseTemplate::new(401)
            }
        })
        .expect(1)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        credentials: Credentials {
            basic_auth: Some(BasicAuth {
                username: "user".into(),
                password: SecretString::from("pass".to_owned()),
            }),
            ..Credentials::default()
        },
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({"refId": "A", "queryType": "rest", "restEndpoint": "items"}))],
            &CancellationToken::new(),
        )
        .await;

    assert!(!result.get("A").unwrap().is_error(), "{:?}", result.get("A"));
}

#[tokio::test]
async fn test_rest_upstream_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({
                "refId": "A",
                "queryType": "rest",
                "restEndpoint": "search",
                "restMethod": "post",
                "restBody": "{}"
            }))],
            &CancellationToken::new(),
        )
        .await;

    let err = result.get("A").unwrap().error().unwrap();
    assert_eq!(err.kind(), "upstream_status");
    assert_eq!(err.to_string(), "REST returned status 502: bad gateway");
}

// ── Routing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_type_does_not_affect_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"n": 1}])))
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[
                query(json!({"refId": "A", "queryType": "unknown"})),
                query(json!({"refId": "B", "queryType": "rest", "restEndpoint": "ok"})),
            ],
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.get("A").unwrap().error().unwrap().kind(),
        "unsupported_query_type"
    );
    assert!(!result.get("B").unwrap().is_error());
}

#[tokio::test]
async fn test_non_json_multibyte_body_does_not_affect_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("{}é and more html", "a".repeat(199))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cpu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cpu": 1})))
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[
                query(json!({"refId": "A", "queryType": "rest", "restEndpoint": "page"})),
                query(json!({"refId": "B", "queryType": "rest", "restEndpoint": "cpu"})),
            ],
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.get("A").unwrap().error().unwrap().kind(), "parse");
    assert_eq!(result.get("B").unwrap().frames().unwrap()[0].row_count(), 1);
}

#[tokio::test]
async fn test_malformed_time_fields_only_fail_their_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"n": 1}])))
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[
                query(json!({"refId": "A", "queryType": "rest", "restEndpoint": "ok"})),
                query(json!({
                    "refId": "B",
                    "queryType": "rest",
                    "restEndpoint": "ok",
                    "timeRange": {"from": "yesterday", "to": "2024-01-01T00:00:00Z"}
                })),
                query(json!({
                    "refId": "C",
                    "queryType": "rest",
                    "restEndpoint": "ok",
                    "intervalMs": "30s"
                })),
            ],
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.len(), 3);
    assert!(!result.get("A").unwrap().is_error());
    assert_eq!(result.get("B").unwrap().error().unwrap().kind(), "parse");
    assert_eq!(result.get("C").unwrap().error().unwrap().kind(), "parse");
}

#[tokio::test]
async fn test_cancellation_resolves_in_flight_queries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        ..DataSourceConfig::default()
    });
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = ds
        .query_data(
            &[query(json!({"refId": "A", "queryType": "rest", "restEndpoint": "slow"}))],
            &cancel,
        )
        .await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.get("A").unwrap().error().unwrap().kind(), "cancelled");
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        timeout: Duration::from_millis(200),
        ..DataSourceConfig::default()
    });
    let result = ds
        .query_data(
            &[query(json!({"refId": "A", "queryType": "rest", "restEndpoint": "slow"}))],
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.get("A").unwrap().error().unwrap().kind(), "timeout");
}

// ── Health ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_without_backends() {
    let ds = datasource(DataSourceConfig::default());
    let health = ds.check_health(&CancellationToken::new()).await;
    assert_eq!(health.status, HealthStatus::Error);
    assert_eq!(
        health.message,
        "No data source URLs configured. Please configure at least one data source."
    );
}

#[tokio::test]
async fn test_health_probes_metrics_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/-/healthy"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let logs = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&logs)
        .await;

    let ds = datasource(DataSourceConfig {
        metrics_url: url(&server),
        logs_url: url(&logs),
        ..DataSourceConfig::default()
    });
    let health = ds.check_health(&CancellationToken::new()).await;
    assert_eq!(health.status, HealthStatus::Ok);
    assert_eq!(health.message, "Data source is ready");
}

#[tokio::test]
async fn test_health_reports_prometheus_issue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/-/healthy"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        metrics_url: url(&server),
        ..DataSourceConfig::default()
    });
    let health = ds.check_health(&CancellationToken::new()).await;
    assert_eq!(health.status, HealthStatus::Error);
    assert_eq!(
        health.message,
        "Prometheus connection issue: prometheus returned status 503: down"
    );
}

#[tokio::test]
async fn test_health_logs_only_is_ready_without_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(0)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        logs_url: url(&server),
        ..DataSourceConfig::default()
    });
    let health = ds.check_health(&CancellationToken::new()).await;
    assert_eq!(health.status, HealthStatus::Ok);
}

#[tokio::test]
async fn test_health_rest_only_is_ready_without_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        rest_url: url(&server),
        ..DataSourceConfig::default()
    });
    assert!(ds.check_health(&CancellationToken::new()).await.is_ok());
}

// ── Proxy ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_proxy_routes_by_backend_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/labels"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"status\":\"success\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let ds = datasource(DataSourceConfig {
        metrics_url: url(&server),
        credentials: Credentials {
            bearer_token: Some(SecretString::from("tok".to_owned())),
            ..Credentials::default()
        },
        ..DataSourceConfig::default()
    });
    let resp = ds
        .call_resource("prometheus", ProxyRequest::get("api/v1/labels"))
        .await;
    assert_eq!(resp.status, 200);
    assert_eq!(&resp.body[..], b"{\"status\":\"success\"}");
}

#[tokio::test]
async fn test_proxy_unknown_and_unconfigured_backends() {
    let ds = datasource(DataSourceConfig::default());

    let resp = ds.call_resource("graphite", ProxyRequest::get("x")).await;
    assert_eq!(resp.status, 404);
    let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(body, json!({"error": "Unknown resource path"}));

    let resp = ds.call_resource("rest", ProxyRequest::get("x")).await;
    assert_eq!(resp.status, 400);
}
