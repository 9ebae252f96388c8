//! Board aggregation: pipelines → stages → negotiations.
//!
//! [`BoardAggregator::build_board`] walks the hierarchy depth-first, one
//! pipeline at a time, awaiting every request before issuing the next. At
//! most one request is in flight and child order always matches API order.
//! Total latency is the sum of all request latencies; boards are expected
//! to be small.
//!
//! Failure policy: a failed root fetch aborts the build with
//! [`BoardError::RootFailure`]. A failed fetch anywhere below the root empties
//! that branch only ([`Branch::Failed`]) and the walk carries on with the next
//! sibling.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::{
    ApiClient, ApiFailure, ApiPath, BoardError, BoardTree, Branch, Negotiation, Pipeline,
    PipelineNode, Stage, StageNode,
};

/// Builds [`BoardTree`]s from an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct BoardAggregator<C> {
    client: C,
}

impl<C: ApiClient> BoardAggregator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetches and assembles a fresh board.
    #[instrument(skip(self))]
    pub async fn build_board(&self) -> Result<BoardTree, BoardError> {
        let pipelines: Vec<Pipeline> = fetch_list(&self.client, &ApiPath::pipelines())
            .await
            .map_err(|source| {
                warn!(reason = source.reason(), error = %source, "pipeline list unavailable");
                BoardError::RootFailure { source }
            })?;

        let mut tree = BoardTree {
            pipelines: Vec::with_capacity(pipelines.len()),
        };
        for pipeline in pipelines {
            let stages = self.load_stages(&pipeline).await;
            tree.pipelines.push(PipelineNode { pipeline, stages });
        }

        debug!(
            pipelines = tree.len(),
            failed_branches = tree.failed_branch_count(),
            "board assembled"
        );
        Ok(tree)
    }

    #[instrument(skip_all, fields(pipeline = %pipeline.id))]
    async fn load_stages(&self, pipeline: &Pipeline) -> Branch<StageNode> {
        let stages: Vec<Stage> =
            match fetch_list(&self.client, &ApiPath::stages(pipeline.id)).await {
                Ok(stages) => stages,
                Err(failure) => {
                    warn!(reason = failure.reason(), error = %failure, "stage list unavailable");
                    return Branch::Failed(failure);
                }
            };

        let mut nodes = Vec::with_capacity(stages.len());
        for stage in stages {
            let negotiations = self.load_negotiations(pipeline, &stage).await;
            nodes.push(StageNode {
                stage,
                negotiations,
            });
        }
        Branch::from_children(nodes)
    }

    #[instrument(skip_all, fields(pipeline = %pipeline.id, stage = %stage.id))]
    async fn load_negotiations(&self, pipeline: &Pipeline, stage: &Stage) -> Branch<Negotiation> {
        let path = ApiPath::negotiations(pipeline.id, stage.id);
        match fetch_list::<Negotiation, _>(&self.client, &path).await {
            Ok(negotiations) => Branch::from_children(negotiations),
            Err(failure) => {
                warn!(reason = failure.reason(), error = %failure, "negotiation list unavailable");
                Branch::Failed(failure)
            }
        }
    }
}

/// GETs `path` and decodes the body as a JSON array of `T`.
///
/// A body that is not the expected shape is reported as
/// [`ApiFailure::DecodeError`], the same as any other failed fetch.
pub async fn fetch_list<T, C>(client: &C, path: &ApiPath) -> Result<Vec<T>, ApiFailure>
where
    T: DeserializeOwned,
    C: ApiClient + ?Sized,
{
    let body = client.get_json(path).await?;
    Ok(serde_json::from_value(body)?)
}
