//! WebSocket Connection Hub
//!
//! Tracks connected dashboard observers and their group memberships, and fans
//! device updates out to them.
//!
//! Every connection owns a bounded queue drained by a single writer task, so
//! messages reach one observer in the order they were broadcast. Enqueueing
//! uses `try_send`: a full or closed queue drops the message for that
//! observer only and never blocks the broadcasting task.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::broadcaster::Broadcaster;
use super::messages::ServerMessage;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages all WebSocket connections and group memberships
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// Group memberships: Group → Set of ConnectionIds
    groups: RwLock<HashMap<String, HashSet<ConnectionId>>>,
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Per-connection outbound queue capacity
    pub connection_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            connection_buffer: 256,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    pub sender: mpsc::Sender<ServerMessage>,
    pub groups: HashSet<String>,
}

impl ConnectionHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Create the bounded queue for a new connection
    pub fn channel(&self) -> (mpsc::Sender<ServerMessage>, mpsc::Receiver<ServerMessage>) {
        mpsc::channel(self.config.connection_buffer.max(1))
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID, or an error if the connection limit has
    /// been reached.
    pub async fn register(
        &self,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(
            id.clone(),
            ConnectionHandle {
                sender,
                groups: HashSet::new(),
            },
        );

        tracing::info!(connection_id = %id, "Observer connected");
        Ok(id)
    }

    /// Unregister a connection and drop its group memberships
    pub async fn unregister(&self, id: &str) {
        let handle = self.connections.write().await.remove(id);

        if let Some(handle) = handle {
            let mut groups = self.groups.write().await;
            for group in handle.groups {
                if let Some(members) = groups.get_mut(&group) {
                    members.remove(id);
                    if members.is_empty() {
                        groups.remove(&group);
                    }
                }
            }
        }

        tracing::info!(connection_id = %id, "Observer disconnected");
    }

    /// Add a connection to groups; invalid names are skipped
    pub async fn join_group(
        &self,
        id: &str,
        names: Vec<String>,
    ) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections.get_mut(id).ok_or(HubError::ConnectionNotFound)?;

        let mut groups = self.groups.write().await;
        let mut joined = Vec::new();

        for name in names {
            if !is_valid_group(&name) {
                tracing::warn!(group = %name, "Invalid group ignored");
                continue;
            }

            handle.groups.insert(name.clone());
            groups.entry(name.clone()).or_default().insert(id.to_string());
            joined.push(name);
        }

        tracing::debug!(connection_id = %id, groups = ?joined, "Joined groups");
        Ok(joined)
    }

    /// Remove a connection from groups
    pub async fn leave_group(
        &self,
        id: &str,
        names: Vec<String>,
    ) -> Result<Vec<String>, HubError> {
        let mut connections = self.connections.write().await;
        let handle = connections.get_mut(id).ok_or(HubError::ConnectionNotFound)?;

        let mut groups = self.groups.write().await;
        let mut left = Vec::new();

        for name in names {
            if handle.groups.remove(&name) {
                if let Some(members) = groups.get_mut(&name) {
                    members.remove(id);
                    if members.is_empty() {
                        groups.remove(&name);
                    }
                }
                left.push(name);
            }
        }

        tracing::debug!(connection_id = %id, groups = ?left, "Left groups");
        Ok(left)
    }

    /// Enqueue a message for every connection; returns how many accepted it
    pub async fn send_to_all(&self, message: ServerMessage) -> usize {
        let connections = self.connections.read().await;

        let delivered = connections
            .iter()
            .filter(|(id, handle)| deliver(id, handle, message.clone()))
            .count();

        tracing::trace!(
            observers = connections.len(),
            delivered,
            "Broadcast to all observers"
        );
        delivered
    }

    /// Enqueue a message for every member of a group
    pub async fn send_to_group(&self, group: &str, message: ServerMessage) -> usize {
        // Same order as join_group and leave_group: connections, then groups
        let connections = self.connections.read().await;
        let groups = self.groups.read().await;
        let Some(members) = groups.get(group) else {
            return 0;
        };

        let delivered = members
            .iter()
            .filter_map(|id| connections.get(id).map(|handle| (id, handle)))
            .filter(|(id, handle)| deliver(id, handle, message.clone()))
            .count();

        tracing::trace!(group = %group, members = members.len(), delivered, "Broadcast to group");
        delivered
    }

    /// Enqueue a message for one connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => HubError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => HubError::SendFailed,
        })
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of connections in a group
    pub async fn group_size(&self, group: &str) -> usize {
        self.groups
            .read()
            .await
            .get(group)
            .map(|members| members.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl Broadcaster for ConnectionHub {
    async fn broadcast_to_all(&self, event: &str, payload: Value) {
        self.send_to_all(ServerMessage::broadcast(event, payload))
            .await;
    }

    async fn broadcast_to_group(&self, group: &str, event: &str, payload: Value) {
        self.send_to_group(group, ServerMessage::group_update(group, event, payload))
            .await;
    }
}

/// Best-effort enqueue for one observer; failures are logged, not returned
fn deliver(id: &str, handle: &ConnectionHandle, message: ServerMessage) -> bool {
    match handle.sender.try_send(message) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(connection_id = %id, "Observer queue full, dropping update");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!(connection_id = %id, "Observer queue closed, dropping update");
            false
        }
    }
}

/// Group names: non-empty, at most 128 chars, no whitespace
fn is_valid_group(name: &str) -> bool {
    !name.is_empty() && name.len() <= 128 && !name.chars().any(char::is_whitespace)
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Connection queue is full")]
    QueueFull,

    #[error("Failed to send message")]
    SendFailed,
}
