//! Pure projection of fetched data into a [`VisualStructure`].
//!
//! Nothing here touches the network or mutates its input. The resulting
//! structure is printed as terminal text through its `Display` impl or
//! serialised as JSON.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{BoardTree, Pipeline};

/// Message shown in place of a view whose root data could not be loaded.
pub const FAILURE_MESSAGE: &str = "Failed to load";

/// Rendering switches decided at the presentation boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Mark branches whose fetch failed. When `false`, a failed branch looks
    /// exactly like a branch with no children.
    pub surface_branch_failures: bool,
}

/// A renderable view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum VisualStructure {
    /// One column per pipeline.
    Board(Vec<Column>),
    /// A flat list of labels.
    Labels(Vec<String>),
    /// Verbatim pretty-printed JSON.
    Dump(String),
    /// A failure indication shown instead of the requested view.
    Failure(String),
}

/// A pipeline column on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub heading: String,
    pub blocks: Vec<StageBlock>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

/// A labelled stage block inside a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageBlock {
    pub label: String,
    pub cards: Vec<Card>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

/// A single negotiation card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub label: String,
}

/// Projects a board tree into columns, blocks, and cards.
pub fn render_board(tree: &BoardTree, options: RenderOptions) -> VisualStructure {
    let columns = tree
        .pipelines
        .iter()
        .map(|node| Column {
            heading: node.pipeline.name.clone(),
            blocks: node
                .stages
                .children()
                .iter()
                .map(|stage| StageBlock {
                    label: stage.stage.name.clone(),
                    cards: stage
                        .negotiations
                        .children()
                        .iter()
                        .map(|n| Card {
                            label: n.title.clone(),
                        })
                        .collect(),
                    failed: options.surface_branch_failures && stage.negotiations.is_failed(),
                })
                .collect(),
            failed: options.surface_branch_failures && node.stages.is_failed(),
        })
        .collect();
    VisualStructure::Board(columns)
}

/// Projects a pipeline list into name labels.
pub fn render_names(pipelines: &[Pipeline]) -> VisualStructure {
    VisualStructure::Labels(pipelines.iter().map(|p| p.name.clone()).collect())
}

/// Dumps raw JSON verbatim with two-space indentation.
pub fn render_dump(value: &Value) -> VisualStructure {
    // serde_json's pretty printer indents with two spaces.
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    VisualStructure::Dump(text)
}

/// The generic failure indication.
pub fn render_failure() -> VisualStructure {
    VisualStructure::Failure(FAILURE_MESSAGE.to_string())
}

impl fmt::Display for VisualStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualStructure::Board(columns) => {
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{column}")?;
                }
                Ok(())
            }
            VisualStructure::Labels(labels) => {
                for label in labels {
                    writeln!(f, "{label}")?;
                }
                Ok(())
            }
            VisualStructure::Dump(text) => writeln!(f, "{text}"),
            VisualStructure::Failure(message) => writeln!(f, "{message}"),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.heading)?;
        if self.failed {
            writeln!(f, "  (stages unavailable)")?;
        }
        for block in &self.blocks {
            writeln!(f, "  {}", block.label)?;
            if block.failed {
                writeln!(f, "    (negotiations unavailable)")?;
            }
            for card in &block.cards {
                writeln!(f, "    - {}", card.label)?;
            }
        }
        Ok(())
    }
}
