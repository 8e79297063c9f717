use crate::domain::model::{ExportReport, Submission};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 宿主評分系統提供的成績查詢能力
pub trait Gradebook: Send + Sync {
    fn find_submission(&self, assignment: &str, student_id: &str) -> Result<Submission>;
}

pub trait ConfigProvider: Send + Sync {
    fn consumer_key(&self) -> &str;
    fn consumer_secret(&self) -> &str;
    fn outcome_service_url(&self) -> &str;
    fn result_sourcedid(&self) -> &str;
    fn user_id(&self) -> Option<&str>;
    fn assignment(&self) -> &str;
    fn student_id(&self) -> &str;
    /// 原始字串，交給 `Action::from_str` 解析
    fn action(&self) -> &str;
    fn output_path(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn normalize_score(&self) -> bool;
}

#[async_trait]
pub trait ExportPlugin: Send + Sync {
    async fn export(&self, gradebook: &dyn Gradebook) -> Result<ExportReport>;
}
