use crate::core::{ExportPlugin, ExportReport, Gradebook};
use crate::utils::error::Result;

/// 扮演宿主角色：以成績簿呼叫匯出 plugin
pub struct ExportEngine<P: ExportPlugin> {
    plugin: P,
}

impl<P: ExportPlugin> ExportEngine<P> {
    pub fn new(plugin: P) -> Self {
        Self { plugin }
    }

    pub async fn run(&self, gradebook: &dyn Gradebook) -> Result<ExportReport> {
        tracing::info!("🚀 Starting LTI export...");

        let report = self.plugin.export(gradebook).await?;

        tracing::info!(
            "✅ {} completed (codeMajor: {})",
            report.action,
            report.code_major.as_deref().unwrap_or("unknown")
        );
        if let Some(path) = &report.output_path {
            tracing::info!("📁 Response saved to: {}", path);
        }

        Ok(report)
    }
}
