use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};

use super::types::DomainHealth;

/// Well-known path a domain owner serves the verification token on.
pub const VERIFICATION_PATH: &str = "/.well-known/cms-domain-verification";

/// Network access used for domain health checks and ownership proof.
#[async_trait]
pub trait DomainProbe: Send + Sync {
    /// Reachability check; every failure is reported inside the result.
    async fn check(&self, domain: &str) -> DomainHealth;

    /// Token the domain currently publishes at [`VERIFICATION_PATH`].
    async fn fetch_verification_token(&self, domain: &str) -> Result<Option<String>, String>;
}

/// [`DomainProbe`] over HTTP(S) with `reqwest`.
pub struct HttpDomainProbe {
    client: reqwest::Client,
}

impl HttpDomainProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("cms-api-rust/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DomainProbe for HttpDomainProbe {
    async fn check(&self, domain: &str) -> DomainHealth {
        let started = Instant::now();
        let result = self.client.head(format!("https://{}/", domain)).send().await;
        let elapsed = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                let status = response.status();
                DomainHealth {
                    domain: domain.to_string(),
                    is_reachable: status.is_success() || status.is_redirection(),
                    response_time: elapsed,
                    status_code: Some(status.as_u16()),
                    error: None,
                    checked_at: Utc::now(),
                }
            }
            Err(e) => DomainHealth::unreachable(domain, elapsed, e.to_string()),
        }
    }

    async fn fetch_verification_token(&self, domain: &str) -> Result<Option<String>, String> {
        let url = format!("http://{}{}", domain, VERIFICATION_PATH);
        let response = self.client.get(&url).send().await.map_err(|e| e.to_string())?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(format!("{} answered {}", url, response.status()));
        }

        let body = response.text().await.map_err(|e| e.to_string())?;
        let token = body.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }
}
