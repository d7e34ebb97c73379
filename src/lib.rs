#![forbid(unsafe_code)]

//! @acp:module "S-52 Symbology Library"
//! @acp:summary "Look-up rule selection and conditional symbology for S-57 chart features"
//! @acp:domain symbology
//! @acp:layer api
//! @acp:stability beta
//!
//! # s52
//!
//! Resolves S-57 chart features into ordered S-52 drawing instructions.
//!
//! ## Pipeline
//!
//! - **Lookup**: best-match look-up rule per feature and table
//! - **Instructions**: mini-language compiled into typed command nodes
//! - **Conditional symbology**: named procedures driven by attributes,
//!   touch links and mariner parameters
//! - **Object cache**: finalized commands per variant, rebuilt when a
//!   parameter, link or rule generation moves
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use s52::{CellId, Feature, GeometryKind, RuleRepository, Symbolizer, Variant};
//!
//! fn main() -> anyhow::Result<()> {
//!     let repo = RuleRepository::from_json("plib.json")?;
//!     let mut symbolizer = Symbolizer::new(Arc::new(repo));
//!
//!     let ids = symbolizer.load_cell(
//!         CellId(1),
//!         vec![Feature::new("DEPARE", GeometryKind::Area)
//!             .with_attr("DRVAL1", "5")
//!             .with_attr("DRVAL2", "15")],
//!     )?;
//!
//!     for command in symbolizer.finalized_commands(ids[0], Variant::Primary)? {
//!         println!("{}", command);
//!     }
//!     Ok(())
//! }
//! ```

pub mod conditional;
pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod instruction;
pub mod lookup;
pub mod mariner;
pub mod object;
pub mod rules;
pub mod touch;

// Re-exports
pub use conditional::{ConditionalProcedure, CsContext, ProcedureRegistry};
pub use config::SymbologyConfig;
pub use engine::Symbolizer;
pub use error::{Result, SymbologyError};
pub use feature::{CellId, CodeList, Extent, Feature, FeatureArena, FeatureId, GeometryKind, TouchRole};
pub use instruction::{CommandNode, InstructionCompiler, PriorityOverride, TextContent, TextSpec};
pub use lookup::{select, Selection};
pub use mariner::{MarinerParam, MarinerSnapshot, MarinerStore};
pub use object::{ObjectReport, ResolvedObject};
pub use rules::{
    AttrConstraint, AttrTest, Definition, DefinitionKind, DisplayCategory, LupRule, LupTable,
    Priority, RadarPriority, RepositoryBuilder, RuleRepository, Variant,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install a `tracing` subscriber filtered by `RUST_LOG`, defaulting to `warn`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
