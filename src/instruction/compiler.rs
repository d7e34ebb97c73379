//! @acp:module "Instruction Compiler"
//! @acp:summary "Parses presentation mini-language strings into command nodes"
//! @acp:domain symbology
//! @acp:layer logic
//!
//! Instruction strings are sequences of two-letter commands with a
//! parenthesized payload, separated by `;`:
//!
//! ```text
//! SY(LIGHTS11,135);TX(OBJNAM,1,2,2,'15110',0,0,CHBLK,26);CS(LIGHTS05)
//! ```
//!
//! Quoted payload text may contain `;` and `)`. A payload missing its
//! closing parenthesis runs to the end of the string.

use std::sync::Arc;

use super::command::*;
use crate::error::{Result, SymbologyError};
use crate::rules::{Definition, DefinitionKind, LupRule, RuleRepository, PLACEHOLDER_NAME};

/// One tokenized command before binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCommand<'a> {
    pub tag: &'a str,
    pub payload: &'a str,
}

/// Split an instruction string into tagged commands, preserving order
pub fn tokenize(text: &str) -> Vec<RawCommand<'_>> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut commands = Vec::new();
    let mut i = 0;

    while i < len {
        while i < len && (bytes[i] == b';' || bytes[i].is_ascii_whitespace()) {
            i += 1;
        }
        if i >= len {
            break;
        }

        let is_tag = i + 2 <= len
            && bytes[i].is_ascii_uppercase()
            && bytes[i + 1].is_ascii_uppercase();
        if !is_tag {
            let skip_to = next_separator(bytes, i);
            tracing::warn!("Skipping malformed instruction text: {}", &text[i..skip_to]);
            i = skip_to;
            continue;
        }

        let tag = &text[i..i + 2];
        let mut j = i + 2;
        while j < len && bytes[j] == b' ' {
            j += 1;
        }

        if j < len && bytes[j] == b'(' {
            let start = j + 1;
            let mut in_quote = false;
            let mut end = None;
            for (k, &b) in bytes.iter().enumerate().skip(start) {
                match b {
                    b'\'' => in_quote = !in_quote,
                    b')' if !in_quote => {
                        end = Some(k);
                        break;
                    }
                    _ => {}
                }
            }
            match end {
                Some(end) => {
                    commands.push(RawCommand {
                        tag,
                        payload: &text[start..end],
                    });
                    i = end + 1;
                }
                None => {
                    commands.push(RawCommand {
                        tag,
                        payload: &text[start..],
                    });
                    i = len;
                }
            }
        } else {
            let end = next_separator(bytes, j);
            commands.push(RawCommand {
                tag,
                payload: text[j..end].trim(),
            });
            i = end;
        }
    }

    commands
}

fn next_separator(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b';')
        .map(|p| from + p)
        .unwrap_or(bytes.len())
}

/// Split a payload on commas outside single quotes
pub fn split_params(payload: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut in_quote = false;
    let mut start = 0;
    for (idx, ch) in payload.char_indices() {
        match ch {
            '\'' => in_quote = !in_quote,
            ',' if !in_quote => {
                params.push(payload[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    params.push(payload[start..].trim());
    params
}

fn unquote(param: &str) -> &str {
    param
        .strip_prefix('\'')
        .and_then(|p| p.strip_suffix('\''))
        .unwrap_or(param)
}

fn param<'a>(params: &[&'a str], idx: usize) -> Option<&'a str> {
    params.get(idx).copied().filter(|p| !p.is_empty())
}

fn param_num<T: std::str::FromStr>(params: &[&str], idx: usize, default: T) -> T {
    param(params, idx)
        .and_then(|p| unquote(p).parse::<T>().ok())
        .unwrap_or(default)
}

/// @acp:summary "Binds instruction text against a rule repository"
pub struct InstructionCompiler<'a> {
    repo: &'a RuleRepository,
}

impl<'a> InstructionCompiler<'a> {
    pub fn new(repo: &'a RuleRepository) -> Self {
        Self { repo }
    }

    /// Compile arbitrary instruction text.
    ///
    /// Unknown definitions degrade to the placeholder; an unknown
    /// conditional procedure is a repository integrity error.
    pub fn compile(&self, text: &str) -> Result<Vec<CommandNode>> {
        let mut nodes = Vec::new();
        for raw in tokenize(text) {
            if let Some(node) = self.bind(raw)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    /// Compile a look-up rule, enforcing at most one `CS` command
    pub fn compile_rule(&self, rule: &LupRule, index: usize) -> Result<Vec<CommandNode>> {
        let nodes = self.compile(&rule.instruction)?;
        let count = nodes.iter().filter(|n| n.is_conditional()).count();
        if count > 1 {
            return Err(SymbologyError::MultipleConditionalCalls {
                class: rule.class.clone(),
                rule: index,
                count,
            });
        }
        Ok(nodes)
    }

    /// Compile a conditional fragment; fragments may not recurse into `CS`
    pub fn compile_fragment(&self, procedure: &str, text: &str) -> Result<Vec<CommandNode>> {
        let nodes = self.compile(text)?;
        if nodes.iter().any(CommandNode::is_conditional) {
            return Err(SymbologyError::NestedConditionalCall(procedure.to_string()));
        }
        Ok(nodes)
    }

    fn bind(&self, raw: RawCommand<'_>) -> Result<Option<CommandNode>> {
        let params = split_params(raw.payload);
        let node = match raw.tag {
            "SY" => CommandNode::ShowPointSymbol {
                symbol: self.definition(DefinitionKind::Symbol, params[0]),
                rotation: rotation(&params, 1),
            },
            "LC" => CommandNode::ShowComplexLine {
                line: self.definition(DefinitionKind::Line, params[0]),
            },
            "AP" => CommandNode::ShowAreaPattern {
                pattern: self.definition(DefinitionKind::Pattern, params[0]),
                rotation: rotation(&params, 1),
            },
            "LS" => match line_style(&params, 0) {
                Some(style) => CommandNode::ShowSimpleLine(style),
                None => {
                    tracing::warn!("Invalid line style LS({})", raw.payload);
                    return Ok(None);
                }
            },
            "AC" => CommandNode::ShowAreaColor {
                color: params[0].to_string(),
                transparency: param_num(&params, 1, 0u8).min(4),
            },
            "TX" => CommandNode::ShowText(text_spec(&params, false)),
            "TE" => CommandNode::ShowText(text_spec(&params, true)),
            "CA" => CommandNode::ShowSectorArc(SectorArc {
                outline_color: param(&params, 0).unwrap_or("OUTLW").to_string(),
                outline_width: param_num(&params, 1, 4u8),
                arc_color: param(&params, 2).unwrap_or("CHMGD").to_string(),
                arc_width: param_num(&params, 3, 2u8),
                start: param_num(&params, 4, 0.0f64),
                end: param_num(&params, 5, 360.0f64),
                radius: param_num(&params, 6, 20.0f64),
            }),
            "SL" => {
                let unit = param(&params, 2)
                    .and_then(LegUnit::from_code)
                    .unwrap_or(LegUnit::Millimetres);
                let style = line_style(&params, 3).unwrap_or(LineStyle {
                    pattern: LinePattern::Dash,
                    width: 1,
                    color: "CHBLK".to_string(),
                });
                CommandNode::ShowSectorLeg(SectorLeg {
                    bearing: param_num(&params, 0, 0.0f64),
                    length: param_num(&params, 1, 25.0f64),
                    unit,
                    style,
                })
            }
            "CS" => {
                let name = params[0];
                let procedure = self
                    .repo
                    .procedure(name)
                    .ok_or_else(|| SymbologyError::UnknownProcedure(name.to_string()))?;
                CommandNode::CallConditional(ProcedureRef {
                    name: name.to_string(),
                    procedure,
                })
            }
            "OP" => match PriorityOverride::parse(raw.payload) {
                Ok(o) => CommandNode::OverridePriority(o),
                Err(e) => {
                    tracing::warn!("Ignoring priority override: {}", e);
                    return Ok(None);
                }
            },
            other => {
                tracing::warn!("Unknown instruction tag {}({})", other, raw.payload);
                return Ok(None);
            }
        };
        Ok(Some(node))
    }

    fn definition(&self, kind: DefinitionKind, name: &str) -> Arc<Definition> {
        match self.repo.definition(kind, name) {
            Some(def) => def,
            None if name == PLACEHOLDER_NAME => self.repo.placeholder(kind),
            None => {
                tracing::warn!("Unknown {:?} definition '{}', using placeholder", kind, name);
                self.repo.placeholder(kind)
            }
        }
    }
}

fn rotation(params: &[&str], idx: usize) -> Rotation {
    match param(params, idx) {
        None => Rotation::None,
        Some(p) => match p.parse::<f64>() {
            Ok(d) => Rotation::Degrees(d),
            Err(_) => Rotation::Attribute(p.to_string()),
        },
    }
}

fn line_style(params: &[&str], offset: usize) -> Option<LineStyle> {
    let pattern = LinePattern::from_code(param(params, offset)?)?;
    Some(LineStyle {
        pattern,
        width: param_num(params, offset + 1, 1u8),
        color: param(params, offset + 2).unwrap_or("CHBLK").to_string(),
    })
}

fn text_spec(params: &[&str], formatted: bool) -> TextSpec {
    let (content, rest) = if formatted {
        let format = unquote(param(params, 0).unwrap_or("''")).to_string();
        let attributes = unquote(param(params, 1).unwrap_or("''"))
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        (TextContent::Format { format, attributes }, 2)
    } else {
        let source = param(params, 0).unwrap_or("''");
        let content = if source.starts_with('\'') {
            TextContent::Literal(unquote(source).to_string())
        } else {
            TextContent::Attribute(source.to_string())
        };
        (content, 1)
    };

    TextSpec {
        content,
        hjust: param_num(params, rest, 1u8),
        vjust: param_num(params, rest + 1, 2u8),
        spacing: param_num(params, rest + 2, 2u8),
        chars: unquote(param(params, rest + 3).unwrap_or("15110")).to_string(),
        x_offset: param_num(params, rest + 4, 0i32),
        y_offset: param_num(params, rest + 5, 0i32),
        color: param(params, rest + 6).unwrap_or("CHBLK").to_string(),
        group: param_num(params, rest + 7, 21u32),
    }
}
