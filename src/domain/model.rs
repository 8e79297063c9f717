use crate::utils::error::LtiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 要對 outcomes service 執行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Read,
    Replace,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Replace => "replace",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = LtiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "read" => Ok(Action::Read),
            "replace" => Ok(Action::Replace),
            "delete" => Ok(Action::Delete),
            other => Err(LtiError::UnrecognisedAction {
                action: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub assignment: String,
    pub student_id: String,
    pub score: f64,
    pub max_score: Option<f64>,
}

/// 交給 ToolProvider 的固定參數
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub lis_outcome_service_url: String,
    pub lis_result_sourcedid: String,
    /// 僅供記錄；簽章用的 key 由 `OAuthSigner` 持有
    pub oauth_consumer_key: String,
    /// 僅供記錄
    pub user_id: Option<String>,
}

impl LaunchParams {
    pub fn is_outcome_service(&self) -> bool {
        !self.lis_outcome_service_url.trim().is_empty()
            && !self.lis_result_sourcedid.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    pub action: Action,
    pub score_sent: Option<f64>,
    pub score_returned: Option<f64>,
    pub code_major: Option<String>,
    pub description: Option<String>,
    pub output_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_trims_whitespace() {
        assert_eq!(" replace\n".parse::<Action>().unwrap(), Action::Replace);
        assert_eq!("read".parse::<Action>().unwrap(), Action::Read);
        assert_eq!("delete".parse::<Action>().unwrap(), Action::Delete);
    }

    #[test]
    fn test_action_parse_rejects_unknown() {
        let err = "update".parse::<Action>().unwrap_err();
        assert!(matches!(err, LtiError::UnrecognisedAction { ref action } if action == "update"));
        assert!("READ".parse::<Action>().is_err());
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_defaults_to_read() {
        assert_eq!(Action::default(), Action::Read);
    }

    #[test]
    fn test_launch_params_outcome_service() {
        let mut params = LaunchParams {
            lis_outcome_service_url: "https://lms.example.com/outcomes".to_string(),
            lis_result_sourcedid: "abcdef".to_string(),
            oauth_consumer_key: "key".to_string(),
            user_id: None,
        };
        assert!(params.is_outcome_service());

        params.lis_result_sourcedid.clear();
        assert!(!params.is_outcome_service());
    }
}
