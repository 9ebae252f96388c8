//! Entity snapshots and the assembled board tree.
//!
//! Every value here is a read-only snapshot of one fetch. Nothing is cached:
//! a new [`BoardTree`] is built per aggregation call and replaces the old one.

use serde::{Deserialize, Serialize};

use crate::{ApiFailure, ApiToken, NegotiationId, PipelineId, StageId};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Root-level grouping entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub name: String,
}

/// Mid-level grouping entity, owned by exactly one [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
}

/// Leaf entity, owned by exactly one [`Stage`]. Displayed as a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negotiation {
    pub id: NegotiationId,
    pub title: String,
}

// ---------------------------------------------------------------------------
// Branch outcome
// ---------------------------------------------------------------------------

/// Outcome of fetching one child collection below the root.
///
/// `Empty` and `Failed` both expose no children through [`Branch::children`];
/// whether they are shown differently is decided when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch<T> {
    /// The fetch succeeded and returned at least one child, in API order.
    Loaded(Vec<T>),
    /// The fetch succeeded and returned no children.
    Empty,
    /// The fetch failed; the branch is shown as having no children.
    Failed(ApiFailure),
}

impl<T> Branch<T> {
    /// Wraps a successfully fetched child list.
    pub fn from_children(children: Vec<T>) -> Self {
        if children.is_empty() {
            Branch::Empty
        } else {
            Branch::Loaded(children)
        }
    }

    /// Children in API order. Empty for both [`Branch::Empty`] and [`Branch::Failed`].
    pub fn children(&self) -> &[T] {
        match self {
            Branch::Loaded(children) => children,
            Branch::Empty | Branch::Failed(_) => &[],
        }
    }

    /// Returns `true` if the branch fetch failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Branch::Failed(_))
    }

    /// The failure that emptied this branch, if any.
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Branch::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Board tree
// ---------------------------------------------------------------------------

/// A stage together with its negotiations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNode {
    pub stage: Stage,
    pub negotiations: Branch<Negotiation>,
}

/// A pipeline together with its stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineNode {
    pub pipeline: Pipeline,
    pub stages: Branch<StageNode>,
}

/// The three-level structure assembled by [`crate::BoardAggregator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardTree {
    pub pipelines: Vec<PipelineNode>,
}

impl BoardTree {
    /// Number of pipeline nodes.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns `true` if the board has no pipelines.
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Number of branches below the root whose fetch failed.
    pub fn failed_branch_count(&self) -> usize {
        self.pipelines
            .iter()
            .map(|p| {
                let own = usize::from(p.stages.is_failed());
                let below = p
                    .stages
                    .children()
                    .iter()
                    .filter(|s| s.negotiations.is_failed())
                    .count();
                own + below
            })
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Credential context threaded into an [`crate::ApiClient`] at construction.
///
/// Absent token means requests go out unauthenticated; authorization is the
/// server's decision.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<ApiToken>,
}

impl AuthContext {
    /// A context that sends no `X-API-Key` header.
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// A context that authenticates every request with `token`.
    pub fn with_token(token: ApiToken) -> Self {
        Self { token: Some(token) }
    }

    /// The current token, if any.
    pub fn token(&self) -> Option<&ApiToken> {
        self.token.as_ref()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl From<Option<ApiToken>> for AuthContext {
    fn from(token: Option<ApiToken>) -> Self {
        Self { token }
    }
}

/// Query parameters of the login handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub account_id: String,
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
}

/// Body returned by a successful login handshake.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: ApiToken,
}
