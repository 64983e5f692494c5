use anyhow::{anyhow, Context};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::Cli;

/// Thin HTTP client for the CMS API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tenant_id: Option<i32>,
    tenant_domain: Option<String>,
    token: Option<String>,
}

impl ApiClient {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: cli.server.trim_end_matches('/').to_string(),
            tenant_id: cli.tenant_id,
            tenant_domain: cli.tenant_domain.clone(),
            token: cli.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));

        if let Some(id) = self.tenant_id {
            builder = builder.header("X-Tenant-Id", id.to_string());
        }
        if let Some(domain) = &self.tenant_domain {
            builder = builder.header("X-Tenant-Domain", domain);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Value> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> anyhow::Result<Value> {
        let mut builder = self.request(Method::POST, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        self.send(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.request(Method::DELETE, path)).await
    }

    async fn send(&self, builder: RequestBuilder) -> anyhow::Result<Value> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.base_url))?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("server answered {} with a non-JSON body", status))?;

        if status.is_success() {
            return Ok(body);
        }
        Err(anyhow!(error_message(status, &body)))
    }
}

/// `{error: true, message, code}` from the API, or the raw status
fn error_message(status: StatusCode, body: &Value) -> String {
    match (body.get("message").and_then(Value::as_str), body.get("code").and_then(Value::as_str)) {
        (Some(message), Some(code)) => format!("{} ({})", message, code),
        (Some(message), None) => message.to_string(),
        _ => format!("server answered {}", status),
    }
}
