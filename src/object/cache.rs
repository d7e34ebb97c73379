//! @acp:module "Object Rule Cache"
//! @acp:summary "Per-feature finalized command arrays with generation stamps"
//! @acp:domain symbology
//! @acp:layer service
//!
//! Each resolved object keeps one slot per [`Variant`]. A slot is valid
//! while its [`Stamp`] equals the current symbology generation, link
//! generation and selected rule. Labels are cached separately against the
//! text generation, so a label-only parameter write never recompiles the
//! commands.

use serde::Serialize;

use crate::conditional::CsContext;
use crate::error::{Result, SymbologyError};
use crate::feature::{Feature, FeatureArena, FeatureId, GeometryKind};
use crate::instruction::{resolve_text, CommandNode, InstructionCompiler};
use crate::lookup::select;
use crate::mariner::MarinerStore;
use crate::rules::{DisplayCategory, LupRule, LupTable, Priority, RadarPriority, RuleRepository, Variant};

/// View group of the substituted rule for classes without any look-up rule
pub const PLACEHOLDER_VIEW_GROUP: u32 = 21010;

/// Rule used when a class has no bucket in the table.
///
/// Forced into the base display category at a high draw priority so an
/// unknown feature is never silently invisible.
pub fn placeholder_rule(class: &str, geometry: GeometryKind, table: LupTable) -> LupRule {
    let instruction = match geometry {
        GeometryKind::Point => "SY(QUESMRK1)",
        GeometryKind::Line => "LC(QUESMRK1)",
        GeometryKind::Area => "AP(QUESMRK1);LS(DASH,1,CHMGD)",
    };
    LupRule::new(
        class,
        table,
        instruction,
        Priority::new(8, RadarPriority::Over, DisplayCategory::Base, PLACEHOLDER_VIEW_GROUP),
    )
}

/// Identity of the rule a slot was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleKey {
    pub table: LupTable,
    /// Position in the class bucket; `None` for the placeholder rule
    pub index: Option<usize>,
}

/// Inputs a finalized slot depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub symbology: u64,
    pub links: u64,
    pub rule: RuleKey,
}

/// What a slot was compiled from, kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub key: RuleKey,
    pub instruction: String,
    /// Satisfied constraints in their encoded form
    pub matched: Vec<String>,
    /// Procedure name as written in the rule
    pub procedure: Option<String>,
    pub fragment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct LabelCache {
    text_generation: u64,
    texts: Vec<String>,
}

/// @acp:summary "Finalized commands of one variant"
#[derive(Debug, Clone, Default)]
pub struct VariantSlot {
    stamp: Option<Stamp>,
    commands: Vec<CommandNode>,
    priority: Priority,
    binding: Option<Binding>,
    labels: Option<LabelCache>,
}

impl VariantSlot {
    pub fn stamp(&self) -> Option<Stamp> {
        self.stamp
    }

    /// Last finalized commands; empty before the first finalize
    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }
}

/// Shared state a finalize pass reads
#[derive(Debug, Clone, Copy)]
pub struct FinalizeContext<'a> {
    pub repo: &'a RuleRepository,
    pub arena: &'a FeatureArena,
    pub mariner: &'a MarinerStore,
}

/// @acp:summary "A feature bound to its rules with cached command arrays"
#[derive(Debug, Clone)]
pub struct ResolvedObject {
    id: FeatureId,
    slots: [VariantSlot; 2],
}

impl ResolvedObject {
    pub fn new(id: FeatureId) -> Self {
        Self {
            id,
            slots: [VariantSlot::default(), VariantSlot::default()],
        }
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn slot(&self, variant: Variant) -> &VariantSlot {
        &self.slots[variant.index()]
    }

    /// Mark both slots stale, e.g. after an attribute edit
    pub fn invalidate(&mut self) {
        for slot in &mut self.slots {
            slot.stamp = None;
            slot.labels = None;
        }
    }

    /// @acp:summary "Finalized, fully expanded commands for a variant"
    pub fn finalize(&mut self, ctx: &FinalizeContext<'_>, variant: Variant) -> Result<&[CommandNode]> {
        self.refresh(ctx, variant)?;
        Ok(&self.slots[variant.index()].commands)
    }

    /// Effective priority after any conditional override
    pub fn priority(&mut self, ctx: &FinalizeContext<'_>, variant: Variant) -> Result<Priority> {
        self.refresh(ctx, variant)?;
        Ok(self.slots[variant.index()].priority)
    }

    /// Resolved label strings of the variant's text commands
    pub fn labels(&mut self, ctx: &FinalizeContext<'_>, variant: Variant) -> Result<&[String]> {
        self.refresh(ctx, variant)?;
        let feature = ctx.arena.require(self.id)?;
        let generation = ctx.mariner.text_generation();
        let slot = &mut self.slots[variant.index()];

        let fresh = slot
            .labels
            .as_ref()
            .is_some_and(|l| l.text_generation == generation);
        if !fresh {
            let params = ctx.mariner.snapshot();
            let texts = slot
                .commands
                .iter()
                .filter_map(|node| match node {
                    CommandNode::ShowText(spec) => resolve_text(spec, feature, &params),
                    _ => None,
                })
                .collect();
            slot.labels = Some(LabelCache {
                text_generation: generation,
                texts,
            });
        }

        Ok(slot
            .labels
            .as_ref()
            .map(|l| l.texts.as_slice())
            .unwrap_or_default())
    }

    fn refresh(&mut self, ctx: &FinalizeContext<'_>, variant: Variant) -> Result<()> {
        let feature = ctx.arena.require(self.id)?;
        let table = LupTable::for_geometry(feature.geometry, variant);

        let selection = ctx
            .repo
            .candidates(table, &feature.class)
            .and_then(|candidates| select(candidates, feature));
        let key = RuleKey {
            table,
            index: selection.as_ref().map(|s| s.index),
        };
        let stamp = Stamp {
            symbology: ctx.mariner.symbology_generation(),
            links: ctx.arena.link_generation(),
            rule: key,
        };

        if self.slots[variant.index()].stamp == Some(stamp) {
            return Ok(());
        }

        let placeholder;
        let (rule, index, matched) = match &selection {
            Some(s) => (
                s.rule,
                s.index,
                s.matched.iter().map(|c| c.to_string()).collect(),
            ),
            None => {
                tracing::warn!(
                    "No look-up rule for {} in {}, using placeholder",
                    feature.class,
                    table
                );
                placeholder = placeholder_rule(&feature.class, feature.geometry, table);
                (&placeholder, 0, Vec::new())
            }
        };

        let mut slot = build_slot(ctx, feature, rule, index, variant)?;
        slot.stamp = Some(stamp);
        if let Some(binding) = slot.binding.as_mut() {
            binding.key = key;
            binding.matched = matched;
        }

        tracing::debug!(
            "Finalized {} {} ({:?}): {} commands, priority {}",
            feature.class,
            feature.id,
            variant,
            slot.commands.len(),
            slot.priority
        );
        self.slots[variant.index()] = slot;
        Ok(())
    }
}

/// Compile a rule and splice its conditional fragment in place
fn build_slot(
    ctx: &FinalizeContext<'_>,
    feature: &Feature,
    rule: &LupRule,
    index: usize,
    variant: Variant,
) -> Result<VariantSlot> {
    let compiler = InstructionCompiler::new(ctx.repo);
    let nodes = compiler.compile_rule(rule, index)?;

    let mut priority = rule.priority;
    let mut commands = Vec::with_capacity(nodes.len());
    let mut procedure = None;
    let mut fragment = None;

    for node in nodes {
        let CommandNode::CallConditional(call) = node else {
            commands.push(node);
            continue;
        };

        let params = ctx.mariner.snapshot();
        let cs = CsContext::new(feature, ctx.arena, &params, variant);
        match call.procedure.compute(&cs) {
            Some(text) => {
                for spliced in compiler.compile_fragment(&call.name, &text)? {
                    if let CommandNode::OverridePriority(o) = &spliced {
                        o.apply(&mut priority);
                    }
                    commands.push(spliced);
                }
                fragment = Some(text);
            }
            None if call.procedure.always_returns() => {
                return Err(SymbologyError::EmptyProcedureOutput {
                    procedure: call.name,
                    class: feature.class.clone(),
                });
            }
            None => {}
        }
        procedure = Some(call.name);
    }

    Ok(VariantSlot {
        stamp: None,
        commands,
        priority,
        binding: Some(Binding {
            key: RuleKey {
                table: rule.table,
                index: Some(index),
            },
            instruction: rule.instruction.clone(),
            matched: Vec::new(),
            procedure,
            fragment,
        }),
        labels: None,
    })
}
