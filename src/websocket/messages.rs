//! WebSocket Message Types
//!
//! Defines all message types exchanged between dashboard clients and the
//! `/printerhub` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join groups for targeted updates (e.g. "printer:printer-7")
    JoinGroup {
        groups: Vec<String>,
    },
    /// Leave groups
    LeaveGroup {
        groups: Vec<String>,
    },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A device update fanned out by the ingestion path
    Broadcast {
        /// Event name (telemetry, event, job, equipment, message)
        event: String,
        /// The decoded device message
        payload: Value,
    },
    /// A device update delivered to the members of one group
    GroupUpdate {
        group: String,
        event: String,
        payload: Value,
    },
    /// Group membership confirmed
    Joined {
        groups: Vec<String>,
    },
    /// Group membership removed
    Left {
        groups: Vec<String>,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        message: String,
    },
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
}

impl ServerMessage {
    pub fn broadcast(event: impl Into<String>, payload: Value) -> Self {
        ServerMessage::Broadcast {
            event: event.into(),
            payload,
        }
    }

    pub fn group_update(group: impl Into<String>, event: impl Into<String>, payload: Value) -> Self {
        ServerMessage::GroupUpdate {
            group: group.into(),
            event: event.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialize_join() {
        let json = r#"{"type": "join_group", "groups": ["printer:printer-7", "all"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::JoinGroup { groups } => {
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0], "printer:printer-7");
            }
            _ => panic!("Expected JoinGroup"),
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_server_message_serialize_broadcast() {
        let msg = ServerMessage::broadcast("telemetry", serde_json::json!({"printerId": "p1"}));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"broadcast\""));
        assert!(json.contains("\"event\":\"telemetry\""));
        assert!(json.contains("\"printerId\":\"p1\""));
    }

    #[test]
    fn test_server_message_serialize_group_update() {
        let msg = ServerMessage::group_update("printer:p1", "job", serde_json::json!({"jobId": "j1"}));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"group_update\""));
        assert!(json.contains("\"group\":\"printer:p1\""));
        assert!(json.contains("\"event\":\"job\""));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }
}
