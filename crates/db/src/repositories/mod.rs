//! sqlx repositories, one per table family.
//!
//! Each repository is a unit struct with associated async functions taking
//! `&PgPool`, returning `sqlx::Error` directly.

pub mod chat_repo;
pub mod directory_repo;
pub mod identity_link_repo;
pub mod linking_code_repo;
pub mod processed_update_repo;

pub use chat_repo::ChatRepo;
pub use directory_repo::DirectoryRepo;
pub use identity_link_repo::IdentityLinkRepo;
pub use linking_code_repo::LinkingCodeRepo;
pub use processed_update_repo::ProcessedUpdateRepo;
