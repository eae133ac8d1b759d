//! Real-Time Fan-out
//!
//! Pushes device updates to dashboard clients over WebSocket.
//!
//! ## Architecture
//!
//! - **Broadcaster**: the trait the ingestion path publishes through
//! - **ConnectionHub**: active connections, groups and best-effort delivery
//! - **Handler**: WebSocket upgrade and per-connection tasks
//! - **Messages**: client and server message formats
//!
//! ## Usage
//!
//! Clients connect to `/printerhub` and receive every update as
//! `{"type": "broadcast", "event": "telemetry", "payload": {...}}`.
//! After joining a group such as `printer:printer-7` they also receive that
//! device's updates as `{"type": "group_update", "group": ..., "event": ...}`.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8080/printerhub');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'broadcast') console.log(msg.event, msg.payload);
//! };
//! ```

mod broadcaster;
mod handler;
mod hub;
mod messages;

pub use broadcaster::Broadcaster;
pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
