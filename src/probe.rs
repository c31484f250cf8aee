//! Top-level orchestration: one authentication call, one fetch, one
//! classification.
//!
//! The collaborators below return typed errors and never terminate the
//! process themselves; the exit-code policy lives in `main`, fed by
//! [`crate::error::ProbeError::status`] and
//! [`crate::check::Status::exit_code`].

use crate::auth::{self, Credentials};
use crate::check::{self, Evaluation, ThresholdMode, Thresholds};
use crate::cli::Cli;
use crate::error::ProbeResult;
use crate::graph::GraphClient;

/// Force `https` and strip the trailing slash. Applied to both base URLs
/// before any request is built.
pub(crate) fn normalize_base(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.strip_prefix("http://").unwrap_or(trimmed))
    }
}

/// Execute one probe cycle: authenticate, fetch the SKU inventory, and
/// classify it against the configured thresholds.
#[tracing::instrument(name = "probe::run", skip_all)]
pub async fn run(http: &reqwest::Client, cli: &Cli) -> ProbeResult<Evaluation> {
    let credentials = Credentials::new(&cli.tenant_id, &cli.client_id, &cli.client_secret);
    let token_url = format!(
        "{}/{}/oauth2/v2.0/token",
        normalize_base(&cli.url),
        credentials.tenant_id
    );

    let token = auth::acquire_token(http, &token_url, &credentials).await?;

    let graph = GraphClient::builder()
        .endpoint(normalize_base(&cli.graph_url))
        .http_client(http.clone())
        .build()?;
    let skus = graph.fetch_skus(&token).await?;

    let thresholds = Thresholds {
        warning: cli.warning,
        critical: cli.critical,
    };

    let evaluation = if cli.all {
        check::evaluate_all(&skus, &thresholds)
    } else {
        let mode = if cli.percent {
            ThresholdMode::Percent
        } else {
            ThresholdMode::UnitsLeft
        };
        // clap enforces presence of the part number when --all is absent.
        let target = cli.sku_part_number.as_deref().unwrap_or_default();
        check::evaluate_sku(&skus, target, mode, &thresholds)
    };

    Ok(evaluation)
}
