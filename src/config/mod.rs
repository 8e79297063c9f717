#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::Action;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_required, validate_url,
};

/// CLI 與 TOML 共用的設定檢查
pub fn validate_export_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_required("key", config.consumer_key())?;
    validate_required("secret", config.consumer_secret())?;
    validate_url("lis_outcome_service_url", config.outcome_service_url())?;
    validate_required("lis_result_sourcedid", config.result_sourcedid())?;

    let action: Action = config.action().parse()?;
    if action == Action::Replace {
        validate_required("assignment", config.assignment())?;
        validate_required("student_id", config.student_id())?;
    }

    if let Some(path) = config.output_path() {
        validate_path("to", path)?;
    }

    validate_positive_number("timeout_seconds", config.timeout_seconds(), 1)?;
    Ok(())
}
