//! Core domain for dealboard.
//!
//! This crate contains the entity types, the [`ApiClient`] port, the board
//! aggregator, and the renderer. Infrastructure crates implement
//! [`ApiClient`]; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is fetched and how it is assembled; `api-client` defines
//! *how* it travels over HTTP.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PipelineId`, `ApiToken`, etc.) |
//! | [`types`] | Entities, `Branch`, `BoardTree`, `AuthContext` |
//! | [`errors`] | `ApiFailure`, `BoardError` |
//! | [`client`] | The `ApiClient` port and `ApiPath` |
//! | [`aggregator`] | `BoardAggregator::build_board` |
//! | [`render`] | Projection into `VisualStructure` |
//! | [`views`] | Single-level views and the create-pipeline action |

pub mod aggregator;
pub mod client;
pub mod errors;
pub mod identifiers;
pub mod render;
pub mod types;
pub mod views;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use aggregator::{fetch_list, BoardAggregator};
pub use client::{ApiClient, ApiPath};
pub use errors::{ApiFailure, BoardError};
pub use identifiers::{ApiToken, NegotiationId, PipelineId, PipelineName, StageId};
pub use render::{
    render_board, render_dump, render_failure, render_names, Card, Column, RenderOptions,
    StageBlock, VisualStructure,
};
pub use types::{
    AuthContext, BoardTree, Branch, LoginRequest, LoginResponse, Negotiation, Pipeline,
    PipelineNode, Stage, StageNode,
};
