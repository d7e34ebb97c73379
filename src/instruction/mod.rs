//! @acp:module "Instructions"
//! @acp:summary "Presentation mini-language: command nodes, compiler and label text"
//! @acp:domain symbology
//! @acp:layer logic

pub mod command;
pub mod compiler;
pub mod text;

pub use command::{
    format_number, CommandNode, LegUnit, LinePattern, LineStyle, PriorityOverride, ProcedureRef,
    Rotation, SectorArc, SectorLeg, TextContent, TextSpec,
};
pub use compiler::{split_params, tokenize, InstructionCompiler, RawCommand};
pub use text::{apply_format, is_text_visible, resolve_text, IMPORTANT_TEXT_LIMIT};
