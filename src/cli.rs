//! Command-line surface of the probe.

use clap::Parser;

/// Monitoring probe for Microsoft 365 license consumption.
#[derive(Debug, Parser)]
#[command(name = "check_azure_license", version, about, allow_negative_numbers = true)]
pub struct Cli {
    /// Base URL for Microsoft login, e.g. 'https://login.microsoftonline.com'.
    #[arg(short = 'u', long)]
    pub url: String,

    /// Base URL for the Microsoft Graph API, e.g.
    /// 'https://graph.microsoft.com/v1.0/subscribedSkus'.
    #[arg(short = 'g', long)]
    pub graph_url: String,

    /// Tenant ID of the Azure tenant, in GUID format.
    #[arg(short = 't', long)]
    pub tenant_id: String,

    /// Client ID of the Azure app registration, in GUID format.
    #[arg(short = 'C', long)]
    pub client_id: String,

    /// Client secret of the Azure app registration.
    #[arg(short = 'P', long)]
    pub client_secret: String,

    /// skuPartNumber of the license to check, e.g. 'VISIOCLIENT'.
    /// Case-insensitive; upper-cased before matching.
    #[arg(short = 's', long, value_parser = to_upper, required_unless_present = "all")]
    pub sku_part_number: Option<String>,

    /// Evaluate thresholds as a consumption percentage instead of
    /// absolute units left.
    #[arg(short = 'p', long)]
    pub percent: bool,

    /// Check every enabled license in the tenant. Requires --percent.
    #[arg(short = 'a', long, requires = "percent")]
    pub all: bool,

    /// Warning threshold.
    #[arg(short = 'w', long)]
    pub warning: i64,

    /// Critical threshold.
    #[arg(short = 'c', long)]
    pub critical: i64,

    /// Disable TLS certificate verification for both endpoints.
    #[arg(long)]
    pub insecure: bool,
}

fn to_upper(value: &str) -> Result<String, std::convert::Infallible> {
    Ok(value.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "check_azure_license",
            "-u",
            "https://login.microsoftonline.com",
            "-g",
            "https://graph.microsoft.com/v1.0/subscribedSkus",
            "-t",
            "tenant",
            "-C",
            "client",
            "-P",
            "secret",
            "-w",
            "80",
            "-c",
            "90",
        ]
    }

    #[test]
    fn sku_part_number_is_upper_cased() {
        let mut args = base_args();
        args.extend(["-s", "visioclient"]);

        let cli = Cli::try_parse_from(args).expect("parse");
        assert_eq!(cli.sku_part_number.as_deref(), Some("VISIOCLIENT"));
    }

    #[test]
    fn sku_part_number_is_required_without_all() {
        let err = Cli::try_parse_from(base_args()).expect_err("missing -s should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn all_requires_percent() {
        let mut args = base_args();
        args.push("--all");

        let err = Cli::try_parse_from(args).expect_err("--all without --percent should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn all_with_percent_parses_without_a_sku() {
        let mut args = base_args();
        args.extend(["--all", "--percent"]);

        let cli = Cli::try_parse_from(args).expect("parse");
        assert!(cli.all);
        assert!(cli.percent);
        assert!(cli.sku_part_number.is_none());
        assert!(!cli.insecure);
    }

    #[test]
    fn thresholds_accept_negative_values() {
        let args = vec![
            "check_azure_license",
            "-u",
            "u",
            "-g",
            "g",
            "-t",
            "t",
            "-C",
            "C",
            "-P",
            "P",
            "-s",
            "X",
            "-w",
            "-5",
            "-c",
            "-1",
        ];
        let cli = Cli::try_parse_from(args).expect("parse");
        assert_eq!(cli.warning, -5);
        assert_eq!(cli.critical, -1);
    }
}
