//! OAuth 1.0a 簽章（HMAC-SHA1），用於 LTI 1.1 outcomes 請求。
//!
//! Outcomes 請求的 body 是 XML 而非表單，因此簽章中以 `oauth_body_hash`
//! 代替 body 參數。

use crate::utils::error::{LtiError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use url::Url;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

#[derive(Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    consumer_secret: String,
}

impl std::fmt::Debug for OAuthSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSigner")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .finish()
    }
}

impl OAuthSigner {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// 產生 `Authorization` header，nonce 與 timestamp 取自當下
    pub fn authorization_header(&self, method: &str, url: &str, body: &[u8]) -> Result<String> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_header_with(method, url, body, &nonce, timestamp)
    }

    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        body: &[u8],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String> {
        let mut oauth_params = vec![
            ("oauth_body_hash".to_string(), body_hash(body)),
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                SIGNATURE_METHOD.to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];

        let base_string = signature_base_string(method, url, &oauth_params)?;
        tracing::debug!("OAuth signature base string: {}", base_string);

        let signature = self.sign(&base_string)?;
        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", fields))
    }

    fn sign(&self, base_string: &str) -> Result<String> {
        // 沒有 token，key 以 "&" 結尾
        let key = format!("{}&", percent_encode(&self.consumer_secret));
        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| LtiError::ConfigError {
                message: format!("Cannot initialise HMAC-SHA1: {}", e),
            })?;
        mac.update(base_string.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

/// base64(SHA-1(body))
pub fn body_hash(body: &[u8]) -> String {
    BASE64.encode(Sha1::digest(body))
}

/// RFC 3986 編碼，只保留 unreserved 字元
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn signature_base_string(
    method: &str,
    url: &str,
    oauth_params: &[(String, String)],
) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| LtiError::InvalidConfigValueError {
        field: "lis_outcome_service_url".to_string(),
        value: url.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .chain(
            oauth_params
                .iter()
                .map(|(k, v)| (percent_encode(k), percent_encode(v))),
        )
        .collect();
    params.sort();

    let normalized = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(&base_uri(&parsed)),
        percent_encode(&normalized)
    ))
}

/// scheme 與 host 已由 `Url` 轉小寫；預設 port 不會出現在 `port()`
fn base_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}
