use std::future::Future;

use tracing::{debug, info, warn};

use crate::context::ContextBuilder;
use crate::dispatcher::{Analyst, Answer};
use crate::error::Error;
use crate::model_gateway::ModelGateway;
use crate::training::{DateWindow, TrainingSnapshot};
use crate::training_source::TrainingSource;

async fn retry_once<T, F, Fut>(what: &str, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    match op().await {
        Err(err) if err.is_transient() => {
            warn!(request = what, error = %err, "transient failure, retrying once");
            op().await
        }
        result => result,
    }
}

pub async fn fetch_snapshot<S: TrainingSource>(
    source: &S,
    window: DateWindow,
) -> Result<TrainingSnapshot, Error> {
    let profile = retry_once("athlete profile", || source.fetch_profile()).await?;
    let activities = retry_once("activities", || source.fetch_activities(window)).await?;
    let wellness = match source.fetch_wellness(window).await {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "wellness data unavailable, continuing without it");
            Vec::new()
        }
    };

    info!(
        oldest = %window.oldest,
        newest = %window.newest,
        activities = activities.len(),
        wellness_records = wellness.len(),
        "fetched training data"
    );
    Ok(TrainingSnapshot {
        profile,
        activities,
        wellness,
        window,
    })
}

pub async fn answer_question<S, G>(
    source: &S,
    builder: &ContextBuilder,
    analyst: &Analyst<'_, G>,
    window: DateWindow,
    question: &str,
) -> Result<Answer, Error>
where
    S: TrainingSource,
    G: ModelGateway,
{
    let snapshot = fetch_snapshot(source, window).await?;
    let context = builder.build(&snapshot, question);
    debug!(
        context_chars = context.char_count(),
        activities_rendered = context.activities_rendered,
        activities_omitted = context.activities_omitted,
        wellness_rendered = context.wellness_rendered,
        "built prompt context"
    );
    if context.activities_omitted > 0 {
        info!(
            omitted = context.activities_omitted,
            "context budget reached, older activities left out"
        );
    }
    analyst.ask(&context, question).await
}
