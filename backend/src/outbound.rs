//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain types and infrastructure
//! concerns. They contain no business logic:
//!
//! - **persistence**: in-process repositories guarding their state behind
//!   a single mutex each, so multi-step operations stay atomic
//! - **mail**: confirmation-code delivery

pub mod mail;
pub mod persistence;
