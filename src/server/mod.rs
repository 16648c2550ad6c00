//! HTTP API serving the feed and regional tables as JSON.
//!
//! Every request fetches fresh upstream data; nothing is cached between
//! requests.

mod handlers;
mod routes;
mod shape;

pub use handlers::CovidParams;
pub use routes::create_router;
pub use shape::OutputShape;

use std::sync::Arc;

use crate::config::Settings;
use crate::scrapers::DataSource;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DataSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// State backed by the configured upstream endpoints.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(settings.upstream()?)))
    }
}

/// Bind a listener on `host:port`. Host names are resolved.
pub async fn bind_listener(host: &str, port: u16) -> std::io::Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port)).await
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    let app = create_router(state);

    let listener = bind_listener(host, port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::models::{FeedTable, JoinedRecord};
    use crate::scrapers::{feed::parse_feed, Anchor, ScrapeError};

    const FEED: &str = r#"{"records": [
        {"dateRep": "02/03/2020", "countriesAndTerritories": "Italy", "geoId": "IT",
         "cases": 5, "deaths": 0, "popData2019": 60359546, "continentExp": "Europe"},
        {"dateRep": "01/03/2020", "countriesAndTerritories": "Italy", "geoId": "IT",
         "cases": 10, "deaths": 1, "popData2019": 60359546, "continentExp": "Europe"},
        {"dateRep": "01/03/2020", "countriesAndTerritories": "Austria", "geoId": "AT",
         "cases": 3, "deaths": 0, "popData2019": 8858775, "continentExp": "Europe"}
    ]}"#;

    struct FakeSource {
        broken: bool,
    }

    #[async_trait]
    impl DataSource for FakeSource {
        async fn feed(&self) -> Result<FeedTable, ScrapeError> {
            if self.broken {
                return Err(ScrapeError::Timeout {
                    url: "http://feed.test".to_string(),
                });
            }
            parse_feed(FEED)
        }

        async fn regions(&self) -> Result<Vec<JoinedRecord>, ScrapeError> {
            if self.broken {
                return Err(ScrapeError::missing(Anchor::Caption));
            }
            Ok(vec![JoinedRecord {
                index: 0,
                date: "2020-03-02".to_string(),
                year: 2020,
                month: 3,
                day: 2,
                country: "Germany".to_string(),
                region: "Bayern".to_string(),
                code: Some("BY".to_string()),
                cases: 4,
                cases_cum: 9,
                deaths: 1,
                deaths_cum: 1,
                population: 13_077_000,
            }])
        }
    }

    fn setup_test_app(broken: bool) -> axum::Router {
        create_router(AppState::new(Arc::new(FakeSource { broken })))
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn post(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_bind_listener_resolves_host_name() {
        let listener = bind_listener("localhost", 0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let response = setup_test_app(false).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_covid_by_country() {
        let (status, json) = send(
            setup_test_app(false),
            post("/covid", json!({"country": "Italy", "type": "list"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], json!(["2020-03-01", "2020-03-02"]));
        assert_eq!(json["cases_cum"], json!([10, 15]));
        assert_eq!(json["deaths_cum"], json!([1, 1]));
        assert_eq!(json["code"], json!(["IT", "IT"]));
    }

    #[tokio::test]
    async fn test_covid_by_code_all() {
        let (status, json) =
            send(setup_test_app(false), post("/covid", json!({"code": "ALL"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["country"], json!(["Austria", "Italy", "Italy"]));
    }

    #[tokio::test]
    async fn test_covid_country_takes_precedence() {
        let (_, json) = send(
            setup_test_app(false),
            post("/covid", json!({"country": "Austria", "code": "IT"})),
        )
        .await;
        assert_eq!(json["country"], json!(["Austria"]));
    }

    #[tokio::test]
    async fn test_covid_query_string() {
        let (status, json) = send(
            setup_test_app(false),
            get("/covid?code=AT&type=records"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["cases_cum"], json!(3));
    }

    #[tokio::test]
    async fn test_covid_missing_filter() {
        let (status, json) = send(setup_test_app(false), post("/covid", json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            json!("please provide \"country\" or \"code\" in your payload.")
        );
    }

    #[tokio::test]
    async fn test_covid_unknown_type() {
        let (status, json) = send(
            setup_test_app(false),
            post("/covid", json!({"country": "Italy", "type": "table"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("table"));
    }

    #[tokio::test]
    async fn test_covid_bad_request_before_fetch() {
        // The broken source would answer 504 if it were consulted.
        let (status, _) = send(setup_test_app(true), post("/covid", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_covid_upstream_timeout() {
        let (status, json) = send(
            setup_test_app(true),
            post("/covid", json!({"country": "All"})),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_regions_list_shape() {
        let (status, json) = send(setup_test_app(false), get("/covid/de")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["region"], json!(["Bayern"]));
        assert_eq!(json["code"], json!(["BY"]));
        assert_eq!(json["cases_cum"], json!([9]));

        let columns: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(columns.first().map(|c| c.as_str()), Some("date"));
    }

    #[tokio::test]
    async fn test_regions_ignores_type() {
        let (status, json) = send(
            setup_test_app(false),
            post("/covid/de", json!({"type": "records"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.is_object());
    }

    #[tokio::test]
    async fn test_regions_structure_error() {
        let (status, json) = send(setup_test_app(true), get("/covid/de")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("caption"));
    }
}
