pub mod telegram;

use serde::Deserialize;
use teloxide::types::ChatId;

/// One inbound webhook event. Only the `message` payload is used.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

/// The parts of a Telegram message this bot acts on
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

/// A file attachment as declared by the sender
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_message_parses() {
        let msg: IncomingMessage = serde_json::from_value(serde_json::json!({
            "message_id": 7,
            "date": 1700000000,
            "chat": { "id": 42, "type": "private" },
            "document": { "file_id": "doc-1", "file_unique_id": "u", "file_name": "a.pdf", "file_size": 10 }
        }))
        .unwrap();

        assert_eq!(msg.chat.id, ChatId(42));
        assert!(msg.text.is_none());
        let doc = msg.document.unwrap();
        assert_eq!(doc.file_id, "doc-1");
        assert_eq!(doc.file_name.as_deref(), Some("a.pdf"));
        assert_eq!(doc.file_size, Some(10));
    }

    #[test]
    fn test_update_without_message() {
        let update: Update = serde_json::from_str(r#"{"update_id": 1}"#).unwrap();
        assert!(update.message.is_none());
    }
}
