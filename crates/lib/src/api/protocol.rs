//! API wire types (request params and the success/error response shape).

use serde::{Deserialize, Serialize};

/// Wire response: `{ "success", "message"? or "error"? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Params for POST /send-message: text to one recipient.
/// Fields are optional on the wire so missing ones produce our 400 shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageParams {
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// Params for POST /send-media: media by URL to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMediaParams {
    pub phone: Option<String>,
    pub file_url: Option<String>,
    pub caption: Option<String>,
}

/// Params for POST /send-multiple-text: text to each recipient in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTextParams {
    pub phones: Option<Vec<String>>,
    pub message: Option<String>,
}

/// Params for POST /send-multiple-media: media by URL to each recipient in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMediaParams {
    pub phones: Option<Vec<String>>,
    pub file_url: Option<String>,
    pub caption: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_omits_error() {
        let json = serde_json::to_string(&ApiResponse::ok("Message sent!")).expect("serialize");
        assert_eq!(json, r#"{"success":true,"message":"Message sent!"}"#);
    }

    #[test]
    fn err_response_omits_message() {
        let json = serde_json::to_string(&ApiResponse::err("boom")).expect("serialize");
        assert_eq!(json, r#"{"success":false,"error":"boom"}"#);
    }

    #[test]
    fn media_params_use_camel_case_file_url() {
        let params: SendMediaParams =
            serde_json::from_str(r#"{ "phone": "123", "fileUrl": "http://x/y.pdf" }"#)
                .expect("parse params");
        assert_eq!(params.file_url.as_deref(), Some("http://x/y.pdf"));
        assert!(params.caption.is_none());
    }
}
