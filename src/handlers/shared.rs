use serde::{Deserialize, Serialize};

/// Uniform response envelope. `code` carries a stable machine-readable kind
/// on failures so clients can branch without parsing the message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    // Success with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    // Success with message
    pub fn success_with_message(data: Option<T>, message: &str) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.to_string()),
            code: None,
        }
    }
}

impl ApiResponse<()> {
    // Error response (no data)
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
            code: None,
        }
    }

    pub fn error_with_code(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
            code: Some(code.to_string()),
        }
    }
}
