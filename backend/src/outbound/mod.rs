//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **email**: transactional email over HTTP, or a logging stand-in
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod email;
pub mod persistence;
