//! Microsoft Graph `subscribedSkus` client and data model.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::auth::AccessToken;
use crate::error::{ProbeError, ProbeResult};

/// Timeout for each network round-trip (token and Graph calls alike).
pub const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by the token and Graph calls.
///
/// TLS certificate verification stays on unless `insecure` is set
/// explicitly.
pub fn build_http_client(insecure: bool) -> ProbeResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(API_TIMEOUT)
        .danger_accept_invalid_certs(insecure)
        .build()
        .map_err(ProbeError::Transport)
}

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// Capability status of a subscribed SKU as reported by the Graph API.
///
/// Only [`CapabilityStatus::Enabled`] SKUs take part in the aggregate
/// check; the single-SKU check matches on the part number regardless of
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CapabilityStatus {
    Enabled,
    Suspended,
    Warning,
    Deleted,
    LockedOut,
    /// Statuses this probe does not know about.
    #[serde(other)]
    Other,
}

/// Prepaid unit counts for a SKU. The `enabled` count is the pool the
/// thresholds are checked against.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrepaidUnits {
    pub enabled: u64,
    pub suspended: u64,
    pub warning: u64,
}

/// One element of the Graph `subscribedSkus` collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSku {
    pub sku_part_number: String,
    pub capability_status: CapabilityStatus,
    pub consumed_units: u64,
    pub prepaid_units: PrepaidUnits,
}

#[derive(Debug, Deserialize)]
struct SkuList {
    value: Vec<LicenseSku>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Graph SKU-listing endpoint.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    endpoint: Url,
}

/// Builder for constructing a [`GraphClient`].
#[derive(Debug, Default)]
pub struct GraphClientBuilder {
    endpoint: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl GraphClient {
    /// Create a new builder for configuring a `GraphClient`.
    pub fn builder() -> GraphClientBuilder {
        GraphClientBuilder::default()
    }

    /// The SKU-listing endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the tenant's subscribed SKUs.
    ///
    /// One authenticated GET, no retry. A transport failure surfaces as
    /// [`ProbeError::Transport`] (WARNING at the top level), a non-success
    /// status as [`ProbeError::Api`] (CRITICAL), a body that does not
    /// deserialize as [`ProbeError::Parse`] (UNKNOWN).
    #[tracing::instrument(name = "probe::graph::fetch_skus", skip_all)]
    pub async fn fetch_skus(&self, token: &AccessToken) -> ProbeResult<Vec<LicenseSku>> {
        tracing::debug!(endpoint = %self.endpoint, "fetching subscribed SKUs");

        let response = self
            .http
            .get(self.endpoint.clone())
            .header("Authorization", token.bearer())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(ProbeError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Graph API request failed");
            return Err(ProbeError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(ProbeError::Transport)?;
        let list: SkuList =
            serde_json::from_str(&body).map_err(|e| ProbeError::Parse(e.to_string()))?;

        tracing::debug!(count = list.value.len(), "subscribed SKUs fetched");
        Ok(list.value)
    }
}

impl GraphClientBuilder {
    /// Set the SKU-listing endpoint, e.g.
    /// `https://graph.microsoft.com/v1.0/subscribedSkus`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Use a pre-built HTTP client instead of the default one.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the `GraphClient`.
    pub fn build(self) -> ProbeResult<GraphClient> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| ProbeError::InvalidUrl("graph endpoint is required".into()))?;
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| ProbeError::InvalidUrl(format!("{endpoint}: {e}")))?;

        let http = match self.http_client {
            Some(http) => http,
            None => build_http_client(false)?,
        };

        Ok(GraphClient { http, endpoint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{acquire_token, Credentials};
    use crate::check::Status;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sku_payload() -> serde_json::Value {
        serde_json::json!({
            "value": [
                {
                    "skuPartNumber": "VISIOCLIENT",
                    "capabilityStatus": "Enabled",
                    "consumedUnits": 85,
                    "prepaidUnits": { "enabled": 100, "suspended": 0, "warning": 0 }
                },
                {
                    "skuPartNumber": "FLOW_FREE",
                    "capabilityStatus": "Suspended",
                    "consumedUnits": 2,
                    "prepaidUnits": { "enabled": 10, "suspended": 10, "warning": 0 }
                }
            ]
        })
    }

    async fn token_for(server: &MockServer) -> AccessToken {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "test-token"
            })))
            .mount(server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/token", server.uri());
        acquire_token(&http, &url, &Credentials::new("t", "c", "p"))
            .await
            .expect("token")
    }

    #[test]
    fn builder_requires_endpoint() {
        let result = GraphClient::builder().build();
        assert!(matches!(result, Err(ProbeError::InvalidUrl(_))));
    }

    #[test]
    fn builder_rejects_unparseable_endpoint() {
        let result = GraphClient::builder().endpoint("not a url").build();
        assert!(matches!(result, Err(ProbeError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn fetch_skus_sends_bearer_token() {
        let server = MockServer::start().await;
        let token = token_for(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1.0/subscribedSkus"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sku_payload()))
            .mount(&server)
            .await;

        let client = GraphClient::builder()
            .endpoint(format!("{}/v1.0/subscribedSkus", server.uri()))
            .build()
            .expect("client");

        let skus = client.fetch_skus(&token).await.expect("fetch");
        assert_eq!(skus.len(), 2);
        assert_eq!(skus[0].sku_part_number, "VISIOCLIENT");
        assert_eq!(skus[0].capability_status, CapabilityStatus::Enabled);
        assert_eq!(skus[0].consumed_units, 85);
        assert_eq!(skus[0].prepaid_units.enabled, 100);
        assert_eq!(skus[1].capability_status, CapabilityStatus::Suspended);
    }

    #[tokio::test]
    async fn non_success_status_is_a_critical_api_error() {
        let server = MockServer::start().await;
        let token = token_for(&server).await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GraphClient::builder()
            .endpoint(server.uri())
            .build()
            .expect("client");

        let err = client.fetch_skus(&token).await.expect_err("500 should fail");
        assert!(matches!(err, ProbeError::Api { status: 500 }));
        assert_eq!(err.status(), Status::Critical);
    }

    #[tokio::test]
    async fn malformed_body_is_an_unknown_parse_error() {
        let server = MockServer::start().await;
        let token = token_for(&server).await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = GraphClient::builder()
            .endpoint(server.uri())
            .build()
            .expect("client");

        let err = client
            .fetch_skus(&token)
            .await
            .expect_err("garbage body should fail");
        assert!(matches!(err, ProbeError::Parse(_)));
        assert_eq!(err.status(), Status::Unknown);
    }

    #[test]
    fn unknown_capability_status_deserializes_as_other() {
        let sku: LicenseSku = serde_json::from_value(serde_json::json!({
            "skuPartNumber": "NEW_THING",
            "capabilityStatus": "SomethingNew",
            "consumedUnits": 1,
            "prepaidUnits": { "enabled": 5 }
        }))
        .expect("deserialize");

        assert_eq!(sku.capability_status, CapabilityStatus::Other);
        assert_eq!(sku.prepaid_units.suspended, 0);
    }
}
