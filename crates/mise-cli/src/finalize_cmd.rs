//! `mise finalize`: run one finalizer pass over a snapshot.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use mise_core::clock::{Clock, FixedClock, SystemClock};
use mise_core::events::EventPublisher;
use mise_core::finalizer::Finalizer;
use mise_core::store::{MealPlanStore, PrepTaskSink, RecipeStore};
use mise_store::RecordingPublisher;

use crate::config::MiseConfig;
use crate::dataset::load_snapshot;

/// Run the finalize command.
pub async fn run_finalize(snapshot: &Path, at: Option<&str>, config: &MiseConfig) -> Result<()> {
    let store = Arc::new(load_snapshot(snapshot)?);
    let publisher = Arc::new(RecordingPublisher::new());

    let clock: Arc<dyn Clock> = match at {
        Some(raw) => {
            let instant = raw
                .parse()
                .with_context(|| format!("invalid --at timestamp {raw:?}"))?;
            Arc::new(FixedClock(instant))
        }
        None => Arc::new(SystemClock),
    };

    let meal_plans: Arc<dyn MealPlanStore> = store.clone();
    let recipes: Arc<dyn RecipeStore> = store.clone();
    let tasks: Arc<dyn PrepTaskSink> = store.clone();
    let events: Arc<dyn EventPublisher> = publisher.clone();

    let finalizer = Finalizer::new(
        meal_plans,
        recipes,
        tasks,
        events,
        clock,
        config.finalizer.clone(),
        config.prep.clone(),
    );

    let finalized = finalizer.run_once(&CancellationToken::new()).await?;
    println!("Finalized {finalized} meal plan(s).");

    for plan in store.all_plans() {
        println!("  plan {}: {}", plan.id, plan.status);
    }

    let events = publisher.published();
    if !events.is_empty() {
        println!("Events published:");
        for (topic, payload) in events {
            println!("  [{topic}] {payload}");
        }
    }

    Ok(())
}
