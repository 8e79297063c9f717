use crate::domain::model::Action;
use crate::lti::outcome_request::{format_score, IMSX_VERSION, OUTCOMES_NAMESPACE};
use crate::utils::error::{LtiError, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use serde::Serialize;

pub const CODE_MAJOR_SUCCESS: &str = "success";

/// 解析後的 `imsx_POXEnvelopeResponse`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutcomeResponse {
    pub code_major: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub message_identifier: Option<String>,
    pub message_ref_identifier: Option<String>,
    pub operation_ref_identifier: Option<String>,
    pub operation: Option<Action>,
    /// 只有 read 會帶回分數；空字串視為沒有分數，0 是有效分數
    pub score: Option<f64>,
}

impl OutcomeResponse {
    pub fn is_success(&self) -> bool {
        self.code_major.as_deref() == Some(CODE_MAJOR_SUCCESS)
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut response = OutcomeResponse::default();
        let mut stack: Vec<String> = Vec::new();
        let mut saw_envelope = false;

        loop {
            match reader.read_event()? {
                XmlEvent::Start(e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    if stack.is_empty() {
                        saw_envelope = tag == "imsx_POXEnvelopeResponse";
                    }
                    if let Some(action) = response_operation(&tag) {
                        response.operation = Some(action);
                    }
                    stack.push(tag);
                }
                XmlEvent::Empty(e) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    if let Some(action) = response_operation(&tag) {
                        response.operation = Some(action);
                    }
                }
                XmlEvent::End(_) => {
                    stack.pop();
                }
                XmlEvent::Text(e) => {
                    let text = e.unescape()?.trim().to_string();
                    response.apply_text(&stack, text)?;
                }
                XmlEvent::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                    response.apply_text(&stack, text)?;
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }

        if !saw_envelope {
            return Err(LtiError::MalformedResponse {
                message: "missing imsx_POXEnvelopeResponse root element".to_string(),
            });
        }

        Ok(response)
    }

    fn apply_text(&mut self, stack: &[String], text: String) -> Result<()> {
        let Some(current) = stack.last() else {
            return Ok(());
        };

        match current.as_str() {
            "imsx_codeMajor" => self.code_major = Some(text),
            "imsx_severity" => self.severity = Some(text),
            "imsx_description" => self.description = Some(text),
            "imsx_messageIdentifier" => self.message_identifier = Some(text),
            "imsx_messageRefIdentifier" => self.message_ref_identifier = Some(text),
            "imsx_operationRefIdentifier" => self.operation_ref_identifier = Some(text),
            "textString" if stack.iter().any(|tag| tag == "resultScore") => {
                if !text.is_empty() {
                    let score = text.parse::<f64>().map_err(|_| LtiError::MalformedResponse {
                        message: format!("resultScore is not a number: {}", text),
                    })?;
                    self.score = Some(score);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// 重新產生 envelope XML
    pub fn to_xml(&self) -> Result<String> {
        let operation = self.operation.map(|action| match action {
            Action::Replace => "replaceResultResponse",
            Action::Read => "readResultResponse",
            Action::Delete => "deleteResultResponse",
        });

        let body = match (operation, self.operation) {
            (Some(op), Some(Action::Read)) => {
                let score = match self.score {
                    Some(score) => format_score(score)?,
                    None => String::new(),
                };
                format!(
                    "<{op}><result><resultScore><language>en</language><textString>{score}</textString></resultScore></result></{op}>"
                )
            }
            (Some(op), _) => format!("<{op}/>"),
            (None, _) => String::new(),
        };

        let field = |value: &Option<String>| escape(value.as_deref().unwrap_or_default()).into_owned();

        Ok(format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<imsx_POXEnvelopeResponse xmlns="{ns}">"#,
                "<imsx_POXHeader><imsx_POXResponseHeaderInfo>",
                "<imsx_version>{version}</imsx_version>",
                "<imsx_messageIdentifier>{message_id}</imsx_messageIdentifier>",
                "<imsx_statusInfo>",
                "<imsx_codeMajor>{code_major}</imsx_codeMajor>",
                "<imsx_severity>{severity}</imsx_severity>",
                "<imsx_description>{description}</imsx_description>",
                "<imsx_messageRefIdentifier>{message_ref}</imsx_messageRefIdentifier>",
                "<imsx_operationRefIdentifier>{operation_ref}</imsx_operationRefIdentifier>",
                "</imsx_statusInfo>",
                "</imsx_POXResponseHeaderInfo></imsx_POXHeader>",
                "<imsx_POXBody>{body}</imsx_POXBody>",
                "</imsx_POXEnvelopeResponse>"
            ),
            ns = OUTCOMES_NAMESPACE,
            version = IMSX_VERSION,
            message_id = field(&self.message_identifier),
            code_major = field(&self.code_major),
            severity = field(&self.severity),
            description = field(&self.description),
            message_ref = field(&self.message_ref_identifier),
            operation_ref = field(&self.operation_ref_identifier),
            body = body,
        ))
    }
}

fn response_operation(tag: &str) -> Option<Action> {
    match tag {
        "replaceResultResponse" => Some(Action::Replace),
        "readResultResponse" => Some(Action::Read),
        "deleteResultResponse" => Some(Action::Delete),
        _ => None,
    }
}
