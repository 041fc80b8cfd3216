use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Discriminator for ingestion outcome messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Error,
    Warning,
    Success,
}

/// Outcome message returned by the upload endpoint.
///
/// Always delivered with HTTP 200: a quota rejection or unsupported file type
/// is an outcome of the upload conversation, not a transport failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestMessage {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
}

impl IngestMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageType::Error,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageType::Warning,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageType::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_discriminator() {
        let message = IngestMessage::error("quota exceeded");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["message"], "quota exceeded");
        assert_eq!(json["type"], "error");

        let json = serde_json::to_value(IngestMessage::success("ok")).unwrap();
        assert_eq!(json["type"], "success");

        let json = serde_json::to_value(IngestMessage::warning("hm")).unwrap();
        assert_eq!(json["type"], "warning");
    }
}
