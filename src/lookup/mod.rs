//! @acp:module "Lookup"
//! @acp:summary "Look-up rule selection"
//! @acp:domain symbology
//! @acp:layer logic

pub mod selector;

pub use selector::{evaluate, select, values_match, Selection};
