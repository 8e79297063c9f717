use crate::core::{Action, ConfigProvider, ExportPlugin, ExportReport, Gradebook, LaunchParams, Storage};
use crate::lti::ToolProvider;
use crate::utils::error::{LtiError, Result};
use async_trait::async_trait;

/// 將單一學生的作業成績匯出到 LTI Outcomes service
pub struct LtiExportPlugin<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> LtiExportPlugin<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn launch_params(&self) -> LaunchParams {
        LaunchParams {
            lis_outcome_service_url: self.config.outcome_service_url().to_string(),
            lis_result_sourcedid: self.config.result_sourcedid().to_string(),
            oauth_consumer_key: self.config.consumer_key().to_string(),
            user_id: self.config.user_id().map(str::to_string),
        }
    }

    fn student_score(&self, gradebook: &dyn Gradebook) -> Result<f64> {
        let submission =
            gradebook.find_submission(self.config.assignment(), self.config.student_id())?;
        tracing::info!("student_score: {}", submission.score);

        let mut score = submission.score;
        if self.config.normalize_score() {
            match submission.max_score {
                Some(max_score) if max_score > 0.0 => {
                    score = submission.score / max_score;
                    tracing::info!("Normalized score {} / {} = {}", submission.score, max_score, score);
                }
                _ => tracing::warn!(
                    "⚠️ Cannot normalize score without a positive max score, sending {} as is",
                    submission.score
                ),
            }
        }

        if !(0.0..=1.0).contains(&score) {
            tracing::warn!(
                "⚠️ Score {} is outside 0.0-1.0; the outcome service may reject it",
                score
            );
        }

        Ok(score)
    }

    async fn write_response(&self, raw_body: &str) -> Result<Option<String>> {
        match self.config.output_path() {
            None => {
                tracing::info!("No output file specified, so not writing to file.");
                Ok(None)
            }
            Some(path) => {
                tracing::info!("Writing the result of the call to {}", path);
                self.storage.write_file(path, raw_body.as_bytes()).await?;
                Ok(Some(path.to_string()))
            }
        }
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider> ExportPlugin for LtiExportPlugin<S, C> {
    async fn export(&self, gradebook: &dyn Gradebook) -> Result<ExportReport> {
        let action: Action = self.config.action().parse()?;
        tracing::info!("action: {}", action);

        let mut tool = ToolProvider::new(
            self.config.consumer_key(),
            self.config.consumer_secret(),
            self.launch_params(),
            self.config.timeout_seconds(),
        )?;

        let score_sent = match action {
            Action::Replace => Some(self.student_score(gradebook)?),
            Action::Read | Action::Delete => None,
        };

        let posted = match (action, score_sent) {
            (Action::Replace, Some(score)) => tool.post_replace_result(score).await,
            (Action::Delete, _) => tool.post_delete_result().await,
            _ => tool.post_read_result().await,
        };

        let exchange = match posted {
            Ok(exchange) => exchange,
            // 非 outcomes 回應（例如 401 頁面）也照原文寫檔
            Err(LtiError::InvalidResponse {
                status,
                message,
                raw_body,
            }) => {
                self.write_response(&raw_body).await?;
                return Err(LtiError::InvalidResponse {
                    status,
                    message,
                    raw_body,
                });
            }
            Err(e) => return Err(e),
        };

        let response = exchange.response;

        // 分數可能是 0，所以用 Some 判斷
        if let Some(score) = response.score {
            tracing::info!("The score retrieved from the server was {}", score);
        }

        let output_path = self.write_response(&exchange.raw_body).await?;

        if !tool.last_outcome_success() {
            let code_major = response
                .code_major
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            let description = response.description.clone().unwrap_or_default();
            tracing::error!("The outcome for the LTI request was {}", description);
            return Err(LtiError::OutcomeFailed {
                code_major,
                description,
            });
        }

        Ok(ExportReport {
            action,
            score_sent,
            score_returned: response.score,
            code_major: response.code_major,
            description: response.description,
            output_path,
        })
    }
}
