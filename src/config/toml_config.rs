use crate::domain::ports::ConfigProvider;
use crate::lti::tool_provider::DEFAULT_TIMEOUT_SECONDS;
use crate::utils::error::{LtiError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub lti: LtiConfig,
    #[serde(default)]
    pub export: ExportConfig,
    pub gradebook: Option<GradebookConfig>,
    pub http: Option<HttpConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LtiConfig {
    pub key: String,
    pub secret: String,
    pub lis_outcome_service_url: String,
    pub lis_result_sourcedid: String,
    pub user_id: Option<String>,
}

impl std::fmt::Debug for LtiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LtiConfig")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("lis_outcome_service_url", &self.lis_outcome_service_url)
            .field("lis_result_sourcedid", &self.lis_result_sourcedid)
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub assignment: String,
    #[serde(default, alias = "nbgrader_id")]
    pub student_id: String,
    #[serde(default = "default_action")]
    pub action: String,
    pub to: Option<String>,
    #[serde(default)]
    pub normalize_score: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            assignment: String::new(),
            student_id: String::new(),
            action: default_action(),
            to: None,
            normalize_score: false,
        }
    }
}

fn default_action() -> String {
    "read".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradebookConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LtiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LtiError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LTI_SECRET})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LtiError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 取得成績簿路徑
    pub fn gradebook_path(&self) -> &str {
        self.gradebook
            .as_ref()
            .map(|g| g.path.as_str())
            .unwrap_or("grades.csv")
    }
}

impl ConfigProvider for TomlConfig {
    fn consumer_key(&self) -> &str {
        &self.lti.key
    }

    fn consumer_secret(&self) -> &str {
        &self.lti.secret
    }

    fn outcome_service_url(&self) -> &str {
        &self.lti.lis_outcome_service_url
    }

    fn result_sourcedid(&self) -> &str {
        &self.lti.lis_result_sourcedid
    }

    fn user_id(&self) -> Option<&str> {
        self.lti.user_id.as_deref()
    }

    fn assignment(&self) -> &str {
        &self.export.assignment
    }

    fn student_id(&self) -> &str {
        &self.export.student_id
    }

    fn action(&self) -> &str {
        &self.export.action
    }

    fn output_path(&self) -> Option<&str> {
        self.export
            .to
            .as_deref()
            .filter(|path| !path.trim().is_empty())
    }

    fn timeout_seconds(&self) -> u64 {
        self.http
            .as_ref()
            .and_then(|h| h.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn normalize_score(&self) -> bool {
        self.export.normalize_score
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        crate::config::validate_export_config(self)
    }
}
