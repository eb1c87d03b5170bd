//! Ports at the domain boundary.
//!
//! Driven ports describe the collaborators the domain calls out to
//! (persistence, mail). Driving ports describe what the transport layer
//! may ask of the domain. Adapters live under `crate::outbound` and
//! `crate::inbound`.

mod auth_use_cases;
mod catalogue_repository;
mod mail_sink;
mod review_repository;
mod user_repository;

pub use auth_use_cases::{SignupUseCase, TokenExchangeUseCase};
pub use catalogue_repository::{CatalogueRepository, CatalogueRepositoryError, TitleFilter};
pub use mail_sink::{MailDispatchError, MailMessage, MailSink};
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
pub use user_repository::{UserRepository, UserRepositoryError};

#[cfg(test)]
pub use auth_use_cases::{MockSignupUseCase, MockTokenExchangeUseCase};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
#[cfg(test)]
pub use mail_sink::MockMailSink;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
