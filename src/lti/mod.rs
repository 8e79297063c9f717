//! LTI 1.1 Basic Outcomes 客戶端：簽章、請求 XML、回應解析與傳送。

pub mod oauth;
pub mod outcome_request;
pub mod outcome_response;
pub mod tool_provider;

pub use outcome_request::OutcomeRequest;
pub use outcome_response::OutcomeResponse;
pub use tool_provider::{OutcomeExchange, ToolProvider};
