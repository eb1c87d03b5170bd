//! In-process repository adapters.
//!
//! Each repository keeps its records behind one mutex, so compound
//! operations (get-or-create, uniqueness checks, cascades) observe a
//! consistent snapshot without a separate transaction layer.

mod memory_catalogue_repository;
mod memory_review_repository;
mod memory_user_repository;

pub use memory_catalogue_repository::MemoryCatalogueRepository;
pub use memory_review_repository::MemoryReviewRepository;
pub use memory_user_repository::MemoryUserRepository;
