//! Agent bridge message types
//!
//! agentqa sends requests (`open`, `run`, `close`); the bridge answers each
//! with a response carrying the same sequence number and may interleave
//! events (step notifications) while a request is in flight.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::common::config::{BrowserConfig, LlmConfig};

/// Request from agentqa to the bridge
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub seq: u64,
    #[serde(rename = "type")]
    pub message_type: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl Request {
    pub fn new(seq: u64, command: &str, arguments: Option<Value>) -> Self {
        Self {
            seq,
            message_type: "request".to_string(),
            command: command.to_string(),
            arguments,
        }
    }
}

/// Message from the bridge to agentqa
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Response(Response),
    Event(Event),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub request_seq: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Event {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Arguments for `open`: everything the bridge needs to build its browser
/// context and language model client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenArguments {
    pub browser: BrowserConfig,
    pub llm: LlmConfig,
    pub use_vision: bool,
}

/// Arguments for `run`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArguments {
    pub task: String,
    pub max_steps: u32,
    pub max_actions_per_step: u32,
    /// Where the bridge saves its own conversation record for the case
    pub log_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_message_shape() {
        let msg: Message = serde_json::from_value(json!({
            "type": "response",
            "request_seq": 3,
            "success": true,
            "body": {"is_successful": true}
        }))
        .unwrap();

        match msg {
            Message::Response(r) => {
                assert_eq!(r.request_seq, 3);
                assert!(r.success);
                assert!(r.message.is_none());
            }
            Message::Event(_) => panic!("expected response"),
        }
    }

    #[test]
    fn test_event_without_body() {
        let msg: Message =
            serde_json::from_value(json!({"type": "event", "event": "step"})).unwrap();
        assert!(matches!(msg, Message::Event(Event { ref event, body: None }) if event == "step"));
    }

    #[test]
    fn test_request_omits_missing_arguments() {
        let request = Request::new(1, "close", None);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"seq": 1, "type": "request", "command": "close"})
        );
    }
}
