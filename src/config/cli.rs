use crate::domain::ports::ConfigProvider;
use crate::lti::tool_provider::DEFAULT_TIMEOUT_SECONDS;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Clone, Parser)]
#[command(name = "lti-export")]
#[command(about = "Report a student's assignment score to an LTI Outcomes service")]
pub struct CliConfig {
    #[arg(long, env = "LTI_CONSUMER_KEY", help = "The client key for the OAuth request")]
    pub key: String,

    #[arg(
        long,
        env = "LTI_CONSUMER_SECRET",
        hide_env_values = true,
        help = "The client secret for the OAuth request"
    )]
    pub secret: String,

    #[arg(long, help = "The URL of the LTI Outcomes service")]
    pub lis_outcome_service_url: String,

    #[arg(
        long,
        help = "The lis_result_sourcedid from the LTI launch; identifies one gradebook cell"
    )]
    pub lis_result_sourcedid: String,

    #[arg(long, default_value = "", help = "The assignment we're enquiring about")]
    pub assignment: String,

    #[arg(
        long,
        alias = "nbgrader-id",
        default_value = "",
        help = "The student name according to the gradebook"
    )]
    pub student_id: String,

    #[arg(long, help = "The ID of the student in the LMS")]
    pub user_id: Option<String>,

    #[arg(
        long,
        default_value = "read",
        help = "The action to perform at the outcome service. Options: read, replace, delete"
    )]
    pub action: String,

    #[arg(long, help = "Write the raw response XML to this file")]
    pub to: Option<String>,

    #[arg(long, default_value = "grades.csv", help = "Grade export CSV to read scores from")]
    pub gradebook: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, help = "Divide the score by the submission's max score before sending")]
    pub normalize_score: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs and print the export report as JSON")]
    pub json_logs: bool,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("key", &self.key)
            .field("secret", &"***")
            .field("lis_outcome_service_url", &self.lis_outcome_service_url)
            .field("lis_result_sourcedid", &self.lis_result_sourcedid)
            .field("assignment", &self.assignment)
            .field("student_id", &self.student_id)
            .field("user_id", &self.user_id)
            .field("action", &self.action)
            .field("to", &self.to)
            .field("gradebook", &self.gradebook)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("normalize_score", &self.normalize_score)
            .finish()
    }
}

impl ConfigProvider for CliConfig {
    fn consumer_key(&self) -> &str {
        &self.key
    }

    fn consumer_secret(&self) -> &str {
        &self.secret
    }

    fn outcome_service_url(&self) -> &str {
        &self.lis_outcome_service_url
    }

    fn result_sourcedid(&self) -> &str {
        &self.lis_result_sourcedid
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn assignment(&self) -> &str {
        &self.assignment
    }

    fn student_id(&self) -> &str {
        &self.student_id
    }

    fn action(&self) -> &str {
        &self.action
    }

    fn output_path(&self) -> Option<&str> {
        self.to.as_deref().filter(|path| !path.trim().is_empty())
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn normalize_score(&self) -> bool {
        self.normalize_score
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        crate::config::validate_export_config(self)
    }
}
