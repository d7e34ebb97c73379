//! @acp:module "Resolved Objects"
//! @acp:summary "Per-object rule cache and diagnostics"
//! @acp:domain symbology
//! @acp:layer service

pub mod cache;
pub mod report;

pub use cache::{
    placeholder_rule, Binding, FinalizeContext, ResolvedObject, RuleKey, Stamp, VariantSlot,
    PLACEHOLDER_VIEW_GROUP,
};
pub use report::ObjectReport;
