//! @acp:module "Features"
//! @acp:summary "Chart feature model, attribute decoding and the feature arena"
//! @acp:domain symbology
//! @acp:layer model

pub mod arena;
pub mod attributes;
pub mod types;

pub use arena::FeatureArena;
pub use attributes::{CodeList, LIST_CAPACITY};
pub use types::*;
