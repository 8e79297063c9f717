use crate::domain::model::LaunchParams;
use crate::lti::oauth::OAuthSigner;
use crate::lti::outcome_request::OutcomeRequest;
use crate::lti::outcome_response::OutcomeResponse;
use crate::utils::error::{LtiError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 一次 outcomes 呼叫的結果：HTTP 狀態、原始回應內容與解析結果
#[derive(Debug, Clone)]
pub struct OutcomeExchange {
    pub status: u16,
    pub raw_body: String,
    pub response: OutcomeResponse,
}

#[derive(Debug)]
pub struct ToolProvider {
    signer: OAuthSigner,
    params: LaunchParams,
    client: Client,
    last_outcome: Option<OutcomeResponse>,
}

impl ToolProvider {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        params: LaunchParams,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self::with_client(consumer_key, consumer_secret, params, client))
    }

    pub fn with_client(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        params: LaunchParams,
        client: Client,
    ) -> Self {
        Self {
            signer: OAuthSigner::new(consumer_key, consumer_secret),
            params,
            client,
            last_outcome: None,
        }
    }

    pub async fn post_replace_result(&mut self, score: f64) -> Result<OutcomeExchange> {
        let request = OutcomeRequest::replace(self.params.lis_result_sourcedid.clone(), score);
        self.post_outcome_request(request).await
    }

    pub async fn post_read_result(&mut self) -> Result<OutcomeExchange> {
        let request = OutcomeRequest::read(self.params.lis_result_sourcedid.clone());
        self.post_outcome_request(request).await
    }

    pub async fn post_delete_result(&mut self) -> Result<OutcomeExchange> {
        let request = OutcomeRequest::delete(self.params.lis_result_sourcedid.clone());
        self.post_outcome_request(request).await
    }

    /// 最近一次回應的 code major 是否為 success
    pub fn last_outcome_success(&self) -> bool {
        self.last_outcome
            .as_ref()
            .map(OutcomeResponse::is_success)
            .unwrap_or(false)
    }

    pub fn last_outcome(&self) -> Option<&OutcomeResponse> {
        self.last_outcome.as_ref()
    }

    async fn post_outcome_request(&mut self, request: OutcomeRequest) -> Result<OutcomeExchange> {
        self.last_outcome = None;

        if !self.params.is_outcome_service() {
            return Err(LtiError::MissingConfigError {
                field: "lis_outcome_service_url / lis_result_sourcedid".to_string(),
            });
        }

        let body = request.to_xml()?;
        let url = self.params.lis_outcome_service_url.as_str();
        let authorization = self
            .signer
            .authorization_header("POST", url, body.as_bytes())?;

        tracing::debug!(
            "Posting {} ({}) to {} for user {} with consumer key {}",
            request.operation_name(),
            request.message_identifier,
            url,
            self.params.user_id.as_deref().unwrap_or("-"),
            self.params.oauth_consumer_key
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/xml")
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Outcome service response status: {}", status);

        let raw_body = response.text().await?;
        // 無法解析時仍保留原始內容，讓呼叫端可以寫檔排查
        let parsed = match OutcomeResponse::from_xml(&raw_body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Err(LtiError::InvalidResponse {
                    status: status.as_u16(),
                    message: e.to_string(),
                    raw_body,
                })
            }
        };

        self.last_outcome = Some(parsed.clone());

        Ok(OutcomeExchange {
            status: status.as_u16(),
            raw_body,
            response: parsed,
        })
    }
}
