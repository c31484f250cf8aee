//! OAuth2 client-credentials authentication against Microsoft Entra ID.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{ProbeError, ProbeResult};

/// OAuth2 scope requested for the token. Fixed: the probe only ever talks
/// to the Microsoft Graph API.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Client-credentials grant inputs, supplied once at startup and used for
/// exactly one token request.
#[derive(Clone)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl Credentials {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"****")
            .finish()
    }
}

/// Bearer token returned by the token endpoint.
///
/// Single-use: the expiry reported alongside it is not tracked because the
/// probe exits long before any plausible expiry.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Render the `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(****)")
    }
}

/// Exchange client credentials for a bearer token.
///
/// Sends one form-encoded `grant_type=client_credentials` POST to
/// `token_url`. No retry: a transport failure surfaces as
/// [`ProbeError::Transport`] (WARNING at the top level), any non-success
/// status or unusable body as [`ProbeError::Auth`] (CRITICAL).
#[tracing::instrument(name = "probe::auth::acquire_token", skip(http, credentials))]
pub async fn acquire_token(
    http: &reqwest::Client,
    token_url: &str,
    credentials: &Credentials,
) -> ProbeResult<AccessToken> {
    tracing::debug!("requesting client-credentials token");

    let form = [
        ("client_id", credentials.client_id.as_str()),
        ("scope", GRAPH_SCOPE),
        ("client_secret", credentials.client_secret.expose_secret()),
        ("grant_type", "client_credentials"),
    ];

    let response = http
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(ProbeError::Transport)?;

    if !response.status().is_success() {
        tracing::debug!(
            status = response.status().as_u16(),
            "token endpoint rejected the request"
        );
        return Err(ProbeError::Auth("Unable to login".into()));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ProbeError::Auth(format!("Unable to login: {e}")))?;

    let token = body
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProbeError::Auth("Unable to login: no access_token in response".into()))?;

    tracing::debug!("token acquired");
    Ok(AccessToken(SecretString::from(token.to_string())))
}
