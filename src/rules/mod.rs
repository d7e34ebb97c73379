//! @acp:module "Rules"
//! @acp:summary "Presentation library look-up rules, definitions and their repository"
//! @acp:domain symbology
//! @acp:layer data

pub mod repository;
pub mod types;

pub use repository::{RepositoryBuilder, RepositorySnapshot, RuleRepository, PLACEHOLDER_NAME};
pub use types::*;
