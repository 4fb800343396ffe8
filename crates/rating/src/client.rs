//! HTTP client for the rating service.

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::RatingClientError;
use crate::models::*;

/// Connection settings for [`RatingApiClient`].
///
/// No request timeout is configured here: the transport default applies,
/// and superseded responses are defused by the caller rather than aborted.
#[derive(Debug, Clone)]
pub struct RatingClientConfig {
    /// Base URL of the rating service, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token attached to every request.
    pub auth_token: Option<String>,
}

impl RatingClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        RatingClientConfig {
            base_url,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Thin `reqwest`-based client for the rating service endpoints.
pub struct RatingApiClient {
    client: Client,
    config: RatingClientConfig,
}

impl RatingApiClient {
    pub fn new(config: RatingClientConfig) -> Self {
        RatingApiClient {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, RatingClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn get_json<R>(&self, path: &str) -> Result<R, RatingClientError>
    where
        R: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn read_json<R>(response: reqwest::Response) -> Result<R, RatingClientError>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RatingClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| RatingClientError::Parse(e.to_string()))
    }

    pub(crate) async fn calculate_risk_items(
        &self,
        request: &CalculateRiskItemsRequest,
    ) -> Result<CalculateRiskItemsResponse, RatingClientError> {
        self.post_json("calculations/risk-items", request).await
    }

    pub(crate) async fn calculate_aggregate(
        &self,
        request: &CalculateAggregateRequest,
    ) -> Result<CalculateAggregateResponse, RatingClientError> {
        self.post_json("calculations/aggregate", request).await
    }

    pub(crate) async fn apply_adjustments(
        &self,
        request: &ApplyAdjustmentsRequest,
    ) -> Result<AdjustmentResultPayload, RatingClientError> {
        self.post_json("calculations/adjustments", request).await
    }

    pub(crate) async fn calculate_pro_rata(
        &self,
        request: &ProRataRequest,
    ) -> Result<ProRataResultPayload, RatingClientError> {
        self.post_json("calculations/pro-rata", request).await
    }

    pub(crate) async fn calculation_breakdown(
        &self,
        proposal_id: &str,
    ) -> Result<RawBreakdown, RatingClientError> {
        self.get_json(&format!("calculations/breakdown/{}", proposal_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_strips_trailing_slashes() {
        let config = RatingClientConfig::new("https://rating.example.com/api/");
        assert_eq!(config.base_url, "https://rating.example.com/api");

        let client = RatingApiClient::new(config);
        assert_eq!(
            client.url("/calculations/aggregate"),
            "https://rating.example.com/api/calculations/aggregate"
        );
    }
}
