//! API Routes
//!
//! Route handlers organized by functionality.

pub mod dapr;
pub mod equipment;
pub mod health;
pub mod jobs;
pub mod messaging;
pub mod printers;
