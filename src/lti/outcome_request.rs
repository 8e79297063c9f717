use crate::domain::model::Action;
use crate::utils::error::{LtiError, Result};
use quick_xml::escape::escape;

pub const OUTCOMES_NAMESPACE: &str = "http://www.imsglobal.org/services/ltiv1p1/xsd/imsoms_v1p0";
pub const IMSX_VERSION: &str = "V1.0";

/// LTI Basic Outcomes 的單一請求
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRequest {
    pub operation: Action,
    pub lis_result_sourcedid: String,
    pub score: Option<f64>,
    pub message_identifier: String,
}

impl OutcomeRequest {
    pub fn new(operation: Action, lis_result_sourcedid: impl Into<String>) -> Self {
        Self {
            operation,
            lis_result_sourcedid: lis_result_sourcedid.into(),
            score: None,
            message_identifier: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn replace(lis_result_sourcedid: impl Into<String>, score: f64) -> Self {
        let mut request = Self::new(Action::Replace, lis_result_sourcedid);
        request.score = Some(score);
        request
    }

    pub fn read(lis_result_sourcedid: impl Into<String>) -> Self {
        Self::new(Action::Read, lis_result_sourcedid)
    }

    pub fn delete(lis_result_sourcedid: impl Into<String>) -> Self {
        Self::new(Action::Delete, lis_result_sourcedid)
    }

    pub fn operation_name(&self) -> &'static str {
        match self.operation {
            Action::Replace => "replaceResultRequest",
            Action::Read => "readResultRequest",
            Action::Delete => "deleteResultRequest",
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        let operation = self.operation_name();
        let sourced_id = escape(self.lis_result_sourcedid.as_str());

        let result = match self.operation {
            Action::Replace => {
                let score = self.score.ok_or_else(|| LtiError::MissingConfigError {
                    field: "score".to_string(),
                })?;
                format!(
                    "<result><resultScore><language>en</language><textString>{}</textString></resultScore></result>",
                    format_score(score)?
                )
            }
            Action::Read | Action::Delete => String::new(),
        };

        Ok(format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<imsx_POXEnvelopeRequest xmlns="{ns}">"#,
                "<imsx_POXHeader><imsx_POXRequestHeaderInfo>",
                "<imsx_version>{version}</imsx_version>",
                "<imsx_messageIdentifier>{message_id}</imsx_messageIdentifier>",
                "</imsx_POXRequestHeaderInfo></imsx_POXHeader>",
                "<imsx_POXBody><{op}><resultRecord>",
                "<sourcedGUID><sourcedId>{sourced_id}</sourcedId></sourcedGUID>",
                "{result}",
                "</resultRecord></{op}></imsx_POXBody>",
                "</imsx_POXEnvelopeRequest>"
            ),
            ns = OUTCOMES_NAMESPACE,
            version = IMSX_VERSION,
            message_id = escape(self.message_identifier.as_str()),
            op = operation,
            sourced_id = sourced_id,
            result = result,
        ))
    }
}

/// 分數原樣輸出，不做四捨五入或範圍轉換
pub fn format_score(score: f64) -> Result<String> {
    if !score.is_finite() {
        return Err(LtiError::InvalidConfigValueError {
            field: "score".to_string(),
            value: score.to_string(),
            reason: "Score must be a finite number".to_string(),
        });
    }
    Ok(score.to_string())
}
