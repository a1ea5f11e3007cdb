//! Reqwest-backed point-query source adapter.
//!
//! This adapter owns transport details only: query text construction, request
//! serialisation, timeout and HTTP error mapping, and JSON decoding into raw
//! elements.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::OverpassResponseDto;
use crate::domain::catalog::RawElement;
use crate::domain::ports::{PointQueryError, PointQueryRequest, PointQuerySource, QueryKind};

const DEFAULT_QUERY_TIMEOUT_SECONDS: u32 = 20;
const DEFAULT_OUTPUT_LIMIT: u32 = 40;
const DEFAULT_USER_AGENT: &str = "transit-dashboard/0.1";

/// Default public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Point-query adapter performing HTTP POST requests against one endpoint.
pub struct OverpassHttpSource {
    client: Client,
    endpoint: Url,
    user_agent: String,
    query_timeout_seconds: u32,
    output_limit: u32,
}

impl OverpassHttpSource {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            query_timeout_seconds: DEFAULT_QUERY_TIMEOUT_SECONDS,
            output_limit: DEFAULT_OUTPUT_LIMIT,
        })
    }
}

#[async_trait]
impl PointQuerySource for OverpassHttpSource {
    async fn fetch_elements(
        &self,
        request: &PointQueryRequest,
    ) -> Result<Vec<RawElement>, PointQueryError> {
        let query = build_query(request, self.query_timeout_seconds, self.output_limit)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", query)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_elements(body.as_ref())
    }
}

fn parse_elements(body: &[u8]) -> Result<Vec<RawElement>, PointQueryError> {
    let decoded: OverpassResponseDto = serde_json::from_slice(body).map_err(|error| {
        PointQueryError::decode(format!("invalid Overpass JSON payload: {error}"))
    })?;
    Ok(decoded.into_raw_elements())
}

fn build_query(
    request: &PointQueryRequest,
    query_timeout_seconds: u32,
    output_limit: u32,
) -> Result<String, PointQueryError> {
    validate_origin(request)?;
    let around = format!(
        "(around:{radius},{lat},{lon})",
        radius = request.radius_meters,
        lat = request.origin.latitude,
        lon = request.origin.longitude,
    );

    let selectors: &[&str] = match request.kind {
        QueryKind::Transport => &[
            r#"node["highway"="bus_stop"]"#,
            r#"node["railway"~"tram_stop|subway_entrance|station"]"#,
        ],
        QueryKind::Places => &[
            r#"node["amenity"~"cafe|restaurant|bar"]"#,
            r#"node["leisure"~"park|garden"]"#,
            r#"node["tourism"="museum"]"#,
        ],
    };
    let lines = selectors
        .iter()
        .map(|selector| format!("  {selector}{around};"))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "[out:json][timeout:{query_timeout_seconds}];\n(\n{lines}\n);\nout center {output_limit};"
    ))
}

fn validate_origin(request: &PointQueryRequest) -> Result<(), PointQueryError> {
    let origin = request.origin;
    if !origin.is_finite() {
        return Err(PointQueryError::invalid_request(
            "query origin must contain finite coordinates",
        ));
    }
    if !(-90.0..=90.0).contains(&origin.latitude) {
        return Err(PointQueryError::invalid_request(
            "latitude must be within [-90, 90]",
        ));
    }
    if !(-180.0..=180.0).contains(&origin.longitude) {
        return Err(PointQueryError::invalid_request(
            "longitude must be within [-180, 180]",
        ));
    }
    if request.radius_meters == 0 {
        return Err(PointQueryError::invalid_request(
            "query radius must be positive",
        ));
    }
    Ok(())
}

fn map_transport_error(error: reqwest::Error) -> PointQueryError {
    if error.is_timeout() {
        PointQueryError::timeout(error.to_string())
    } else {
        PointQueryError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PointQueryError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => PointQueryError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PointQueryError::timeout(message)
        }
        _ if status.is_client_error() => PointQueryError::invalid_request(message),
        _ => PointQueryError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
