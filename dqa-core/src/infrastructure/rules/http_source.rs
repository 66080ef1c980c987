// dqa-core/src/infrastructure/rules/http_source.rs

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::DqaError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::RuleSource;

/// Rule files served raw by a repository contents API.
pub struct HttpRuleSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    timeout_secs: u64,
}

impl HttpRuleSource {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, DqaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("dqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InfrastructureError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
            timeout_secs,
        })
    }

    pub fn url_for(&self, location: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            location.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl RuleSource for HttpRuleSource {
    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> Result<String, DqaError> {
        let url = self.url_for(location);

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3.raw");
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InfrastructureError::Timeout(self.timeout_secs, url.clone())
            } else {
                InfrastructureError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InfrastructureError::HttpStatus {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        let text = response.text().await.map_err(InfrastructureError::Http)?;
        debug!(bytes = text.len(), "Fetched rule file");
        Ok(text)
    }

    fn describe(&self, location: &str) -> String {
        self.url_for(location)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let source = HttpRuleSource::new(
            "https://api.github.com/repos/org/Data-Quality/contents/",
            None,
            5,
        )
        .unwrap();
        assert_eq!(
            source.url_for("/SecondaryReports/Ranking/RuleSet1_Admin.csv"),
            "https://api.github.com/repos/org/Data-Quality/contents/SecondaryReports/Ranking/RuleSet1_Admin.csv"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let source = HttpRuleSource::new("http://127.0.0.1:9", None, 2).unwrap();
        assert!(source.fetch("rules.csv").await.is_err());
    }
}
