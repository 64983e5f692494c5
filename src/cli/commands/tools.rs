use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

/// `cms resolve <host>`
pub async fn resolve(client: &ApiClient, host: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = client.get("/api/domain-tools/resolve", &[("host", host)]).await?;

    if body.get("success").and_then(Value::as_bool) != Some(true) {
        let error = body.get("error").map(display).unwrap_or_else(|| "resolution failed".to_string());
        return Err(anyhow::anyhow!("{}: {}", host, error));
    }

    output_fields(
        output_format,
        &envelope_data(body),
        &[
            ("Host", "normalizedHost"),
            ("Resolved by", "resolvedBy"),
            ("Tenant id", "tenant.id"),
            ("Tenant", "tenant.name"),
            ("Slug", "tenant.slug"),
            ("Status", "tenant.status"),
            ("Domain id", "tenantDomain.id"),
            ("Accessible", "accessible"),
            ("Access error", "accessError"),
        ],
    )
}

/// `cms health <domain>`
pub async fn health(client: &ApiClient, domain: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let body = client.get("/api/domain-tools/health", &[("domain", domain)]).await?;
    output_health(output_format, &envelope_data(body))
}

pub fn output_health(output_format: OutputFormat, health: &Value) -> anyhow::Result<()> {
    output_fields(
        output_format,
        health,
        &[
            ("Domain", "domain"),
            ("Reachable", "isReachable"),
            ("Response time ms", "responseTime"),
            ("Status code", "statusCode"),
            ("Error", "error"),
            ("Checked at", "checkedAt"),
        ],
    )
}
