//! Core domain model and services.
//!
//! Everything in this module is transport-agnostic: validated value
//! types, access predicates, signers for confirmation codes and session
//! tokens, and the services implementing the driving ports. Transport
//! and persistence concerns live in `crate::inbound` and
//! `crate::outbound` behind the traits in [`ports`].

pub mod access;
pub mod catalogue;
pub mod confirmation;
pub mod error;
pub mod ports;
pub mod review;
pub mod session;
mod signup_service;
mod token_service;
pub mod user;

pub use error::{Error, ErrorCode};
pub use signup_service::SignupService;
pub use token_service::TokenService;

/// Convenience alias for fallible domain operations.
pub type ApiResult<T> = Result<T, Error>;
