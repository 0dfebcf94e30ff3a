//! `mise run`: drive the finalizer loop over a snapshot until interrupted.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use mise_core::clock::SystemClock;
use mise_core::finalizer::Finalizer;
use mise_core::store::{MealPlanStore, PrepTaskSink, RecipeStore};
use mise_store::TracingPublisher;

use crate::config::MiseConfig;
use crate::dataset::load_snapshot;

/// Run the finalizer loop. First ctrl-c cancels cooperatively; a second
/// force-exits.
pub async fn run_loop(snapshot: &Path, config: &MiseConfig) -> Result<()> {
    let store = Arc::new(load_snapshot(snapshot)?);

    let meal_plans: Arc<dyn MealPlanStore> = store.clone();
    let recipes: Arc<dyn RecipeStore> = store.clone();
    let tasks: Arc<dyn PrepTaskSink> = store.clone();

    let finalizer = Finalizer::new(
        meal_plans,
        recipes,
        tasks,
        Arc::new(TracingPublisher),
        Arc::new(SystemClock),
        config.finalizer.clone(),
        config.prep.clone(),
    );

    println!(
        "Finalizer running every {:?} (ctrl-c to stop)",
        config.finalizer.tick_interval
    );

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let got_first_signal = Arc::new(AtomicBool::new(false));
    let got_first_clone = Arc::clone(&got_first_signal);

    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if got_first_clone.swap(true, Ordering::SeqCst) {
                eprintln!("second interrupt, exiting immediately");
                std::process::exit(130);
            }
            eprintln!("interrupt received, finishing current tick");
            cancel_clone.cancel();
        }
    });

    finalizer.run(cancel).await
}
