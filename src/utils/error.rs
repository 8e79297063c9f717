use thiserror::Error;

#[derive(Error, Debug)]
pub enum LtiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unrecognised action '{action}'. Please choose from replace, read, or delete")]
    UnrecognisedAction { action: String },

    #[error("No submission of '{assignment}' found for student '{student}'")]
    SubmissionNotFound { assignment: String, student: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Malformed outcome response: {message}")]
    MalformedResponse { message: String },

    #[error("Invalid outcome response (HTTP {status}): {message}")]
    InvalidResponse {
        status: u16,
        message: String,
        /// 回應原文，不列入錯誤訊息
        raw_body: String,
    },

    #[error("The outcome for the LTI request was {code_major}: {description}")]
    OutcomeFailed {
        code_major: String,
        description: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Gradebook,
    Network,
    Outcome,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LtiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LtiError::ConfigError { .. }
            | LtiError::ConfigValidationError { .. }
            | LtiError::InvalidConfigValueError { .. }
            | LtiError::MissingConfigError { .. }
            | LtiError::UnrecognisedAction { .. } => ErrorCategory::Configuration,
            LtiError::CsvError(_)
            | LtiError::SubmissionNotFound { .. }
            | LtiError::ProcessingError { .. } => ErrorCategory::Gradebook,
            LtiError::HttpError(_) => ErrorCategory::Network,
            LtiError::XmlError(_)
            | LtiError::MalformedResponse { .. }
            | LtiError::InvalidResponse { .. }
            | LtiError::OutcomeFailed { .. } => ErrorCategory::Outcome,
            LtiError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 依錯誤類型給出修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            LtiError::UnrecognisedAction { .. } => {
                "Set --action to one of: read, replace, delete".to_string()
            }
            LtiError::MissingConfigError { field } => {
                format!("Provide a value for '{}' on the command line or in the config file", field)
            }
            LtiError::InvalidConfigValueError { field, .. }
            | LtiError::ConfigValidationError { field, .. } => {
                format!("Check the value of '{}'", field)
            }
            LtiError::ConfigError { .. } => "Check the configuration file".to_string(),
            LtiError::SubmissionNotFound { .. } => {
                "Make sure the assignment has been autograded and the gradebook export is current"
                    .to_string()
            }
            LtiError::CsvError(_) | LtiError::ProcessingError { .. } => {
                "Check that the gradebook file is a valid grade export".to_string()
            }
            LtiError::HttpError(_) => {
                "Check network connectivity and the outcome service URL, then retry".to_string()
            }
            LtiError::InvalidResponse { status, .. } if *status == 401 || *status == 403 => {
                "The outcome service rejected the signature; check the key and secret".to_string()
            }
            LtiError::InvalidResponse { .. }
            | LtiError::MalformedResponse { .. }
            | LtiError::XmlError(_) => {
                "Check that the URL points at an LTI Basic Outcomes service".to_string()
            }
            LtiError::OutcomeFailed { .. } => {
                "Check the lis_result_sourcedid and that the LMS still accepts grades for it"
                    .to_string()
            }
            LtiError::IoError(_) => "Check file permissions and the output path".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Gradebook => format!("Could not read the score: {}", self),
            ErrorCategory::Network => format!("Could not reach the outcome service: {}", self),
            ErrorCategory::Outcome => format!("The outcome request did not succeed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 對應 CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, LtiError>;
