//! Single-level views and the create-pipeline action.
//!
//! These talk to the [`ApiClient`] directly with the same header contract as
//! the aggregator and project the result with [`crate::render`]. Any failure of
//! the one request a view depends on renders the generic failure indication.

use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::render::{render_dump, render_failure, render_names};
use crate::{fetch_list, ApiClient, ApiFailure, ApiPath, Pipeline, PipelineName, VisualStructure};

/// Pipeline names, in API order.
#[instrument(skip(client))]
pub async fn pipeline_list<C: ApiClient + ?Sized>(client: &C) -> VisualStructure {
    match fetch_list::<Pipeline, _>(client, &ApiPath::pipelines()).await {
        Ok(pipelines) => render_names(&pipelines),
        Err(failure) => {
            warn!(reason = failure.reason(), error = %failure, "pipeline list unavailable");
            render_failure()
        }
    }
}

/// Verbatim dump of whatever JSON `path` returns.
///
/// Backs both the dashboard (`/pipelines`) and the admin user list
/// (`/admin/users`).
#[instrument(skip_all, fields(path = %path))]
pub async fn raw_dump<C: ApiClient + ?Sized>(client: &C, path: &ApiPath) -> VisualStructure {
    match client.get_json(path).await {
        Ok(body) => render_dump(&body),
        Err(failure) => {
            warn!(reason = failure.reason(), error = %failure, "dump source unavailable");
            render_failure()
        }
    }
}

/// POSTs a new pipeline and returns the created entity.
#[instrument(skip_all, fields(name = %name))]
pub async fn create_pipeline<C: ApiClient + ?Sized>(
    client: &C,
    name: &PipelineName,
) -> Result<Pipeline, ApiFailure> {
    let body: Value = json!({ "name": name.as_str() });
    let created = client.post_json(&ApiPath::pipelines(), body).await?;
    let pipeline: Pipeline = serde_json::from_value(created)?;
    info!(pipeline = %pipeline.id, "pipeline created");
    Ok(pipeline)
}

/// Creates a pipeline, then reloads the pipeline list.
///
/// Returns `None` without sending anything when `name` is empty. The outcome
/// of the POST is logged but does not stop the reload, so the list always
/// reflects server state.
pub async fn create_and_list<C: ApiClient + ?Sized>(
    client: &C,
    name: &str,
) -> Option<VisualStructure> {
    let Some(name) = PipelineName::new(name) else {
        info!("empty pipeline name, nothing to create");
        return None;
    };
    if let Err(failure) = create_pipeline(client, &name).await {
        warn!(reason = failure.reason(), error = %failure, "pipeline creation failed");
    }
    Some(pipeline_list(client).await)
}
