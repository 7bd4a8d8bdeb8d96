//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::ApprovalRequest;
use crate::llm::{ChatMessage, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Generic `{success: true}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Query string of `PUT /cart/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuantityQuery {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub cart_item_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmRequest {
    pub payment_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmResponse {
    pub success: bool,
    pub order_id: Uuid,
}

/// A chat message as sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    pub content: String,
}

impl IncomingMessage {
    /// Convert to a history message. Roles other than user, assistant and
    /// system are dropped.
    pub fn to_chat_message(&self) -> Option<ChatMessage> {
        match self.role.as_str() {
            "user" => Some(ChatMessage::user(self.content.clone())),
            "assistant" => Some(ChatMessage::assistant(self.content.clone())),
            "system" => Some(ChatMessage::system(self.content.clone())),
            other => {
                tracing::warn!("Ignoring chat message with role {:?}", other);
                None
            }
        }
    }
}

/// Body of the shopping assistant chat endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    #[serde(default = "default_thread_id")]
    pub thread_id: String,
    /// Decision for a paused turn. When set, `messages` is ignored.
    #[serde(default)]
    pub resume_value: Option<bool>,
}

fn default_thread_id() -> String {
    "1".to_string()
}

/// Result of a single-shot chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChatReply {
    Completed {
        thread_id: String,
        reply: String,
    },
    Interrupted {
        thread_id: String,
        interrupts: Vec<ApprovalRequest>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathChatRequest {
    pub messages: Vec<IncomingMessage>,
}

/// Math agent result: the call count and the content of every message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathResponse {
    pub llm_calls: usize,
    pub messages: Vec<String>,
}

impl MathResponse {
    pub fn from_history(llm_calls: usize, messages: &[ChatMessage]) -> Self {
        Self {
            llm_calls,
            messages: messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| m.content.clone().unwrap_or_default())
                .collect(),
        }
    }
}
