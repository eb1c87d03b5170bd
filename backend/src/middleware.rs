//! Actix middleware shared by every endpoint.

pub mod trace;

pub use trace::Trace;
