//! Integration tests for the meal-plan finalizer, run against the in-memory
//! store and a recording publisher.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use mise_core::config::{FinalizerConfig, PrepConfig};
use mise_core::finalizer::Finalizer;
use mise_core::model::{
    DayOfWeek, MealPlan, MealPlanOption, MealPlanOptionVote, MealPlanStatus, MealSlot,
};
use mise_core::events::EventPublisher;
use mise_core::store::{MealPlanStore, PrepTaskSink, RecipeStore, SlotSelection, StoreError};
use mise_store::{MemoryStore, RecordingPublisher};
use mise_test_utils::{
    FixedClock, RecipeBuilder, StepBuilder, ballot, clock_at, meal_plan, option,
};

const STARTS_AT: &str = "2030-01-10T18:00:00Z";
const DEADLINE: &str = "2030-01-08T18:00:00Z";
const NOW: &str = "2030-01-09T00:00:00Z";
const TIMELY: &str = "2030-01-07T12:00:00Z";

struct Harness {
    store: Arc<MemoryStore>,
    publisher: Arc<RecordingPublisher>,
    finalizer: Finalizer,
    cancel: CancellationToken,
}

fn harness() -> Harness {
    harness_with_clock(clock_at(NOW))
}

fn harness_with_clock(clock: FixedClock) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let publisher = Arc::new(RecordingPublisher::new());
    let meal_plans: Arc<dyn MealPlanStore> = store.clone();
    let recipes: Arc<dyn RecipeStore> = store.clone();
    let tasks: Arc<dyn PrepTaskSink> = store.clone();
    let events: Arc<dyn EventPublisher> = publisher.clone();
    let finalizer = Finalizer::new(
        meal_plans,
        recipes,
        tasks,
        events,
        Arc::new(clock),
        FinalizerConfig::default(),
        PrepConfig::default(),
    );
    Harness {
        store,
        publisher,
        finalizer,
        cancel: CancellationToken::new(),
    }
}

/// A two-step recipe whose first step is prep-eligible.
fn seed_recipe(store: &MemoryStore, id: &str) {
    store.insert_recipe(
        RecipeBuilder::new(id)
            .step(StepBuilder::new(1).product("dressing", 86_400, "refrigerate"))
            .step(
                StepBuilder::new(2)
                    .product_ingredient("dressing")
                    .product("dish", 0, ""),
            )
            .build(),
    );
}

/// A due plan with two dinner options and one lunch option, all voted on.
fn seed_votable_plan(store: &MemoryStore) {
    seed_recipe(store, "recipe-1");
    store.insert_plan(meal_plan("plan-1", STARTS_AT, DEADLINE));

    store.insert_option(option(
        "opt-din-a",
        "plan-1",
        "recipe-1",
        DayOfWeek::Friday,
        MealSlot::Dinner,
    ));
    store.insert_option(option(
        "opt-din-b",
        "plan-1",
        "recipe-1",
        DayOfWeek::Friday,
        MealSlot::Dinner,
    ));
    store.insert_option(option(
        "opt-lun-a",
        "plan-1",
        "recipe-1",
        DayOfWeek::Saturday,
        MealSlot::Lunch,
    ));

    for vote in ballot("alice", &["opt-din-b", "opt-din-a"], TIMELY)
        .into_iter()
        .chain(ballot("bob", &["opt-din-b", "opt-din-a"], TIMELY))
        .chain(ballot("alice", &["opt-lun-a"], TIMELY))
    {
        store.insert_vote(vote);
    }
}

#[tokio::test]
async fn finalizes_due_plan_and_publishes_events() {
    let h = harness();
    seed_votable_plan(&h.store);

    let finalized = h.finalizer.run_once(&h.cancel).await.unwrap();
    assert_eq!(finalized, 1);

    let plan = h.store.plan("plan-1").unwrap();
    assert_eq!(plan.status, MealPlanStatus::Finalized);
    assert!(h.store.option("opt-din-b").unwrap().chosen);
    assert!(!h.store.option("opt-din-a").unwrap().chosen);
    assert!(h.store.option("opt-lun-a").unwrap().chosen);

    assert_eq!(h.publisher.events_of_type("meal_plan_finalized").len(), 1);
    assert_eq!(h.publisher.events_of_type("meal_plan_option_chosen").len(), 2);

    // One prep task per chosen option (step 1 is storable).
    assert_eq!(h.store.tasks_for_option("opt-din-b").len(), 1);
    assert_eq!(h.store.tasks_for_option("opt-lun-a").len(), 1);
    assert!(h.store.tasks_for_option("opt-din-a").is_empty());
    assert_eq!(h.publisher.events_of_type("prep_task_created").len(), 2);
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let h = harness();
    seed_votable_plan(&h.store);

    assert_eq!(h.finalizer.run_once(&h.cancel).await.unwrap(), 1);
    let events_after_first = h.publisher.published().len();
    let tasks_after_first = h.store.task_count();

    assert_eq!(h.finalizer.run_once(&h.cancel).await.unwrap(), 0);
    assert_eq!(h.publisher.published().len(), events_after_first);
    assert_eq!(h.store.task_count(), tasks_after_first);
    assert!(h.store.option("opt-din-b").unwrap().chosen);
}

#[tokio::test]
async fn unresolved_slot_keeps_plan_open_and_silent() {
    let h = harness();
    seed_recipe(&h.store, "recipe-1");
    h.store.insert_plan(meal_plan("plan-1", STARTS_AT, DEADLINE));
    h.store.insert_option(option(
        "opt-din-a",
        "plan-1",
        "recipe-1",
        DayOfWeek::Friday,
        MealSlot::Dinner,
    ));
    h.store.insert_option(option(
        "opt-lun-a",
        "plan-1",
        "recipe-1",
        DayOfWeek::Saturday,
        MealSlot::Lunch,
    ));
    // Dinner has a ballot; lunch has none.
    for vote in ballot("alice", &["opt-din-a"], TIMELY) {
        h.store.insert_vote(vote);
    }

    let finalized = h.finalizer.run_once(&h.cancel).await.unwrap();
    assert_eq!(finalized, 0);

    let plan = h.store.plan("plan-1").unwrap();
    assert_eq!(plan.status, MealPlanStatus::AwaitingVotes);
    assert!(!h.store.option("opt-din-a").unwrap().chosen);
    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn plan_before_deadline_is_untouched() {
    let h = harness_with_clock(clock_at("2030-01-08T00:00:00Z"));
    seed_votable_plan(&h.store);

    let finalized = h.finalizer.run_once(&h.cancel).await.unwrap();
    assert_eq!(finalized, 0);
    assert_eq!(
        h.store.plan("plan-1").unwrap().status,
        MealPlanStatus::AwaitingVotes
    );
}

#[tokio::test]
async fn tie_break_records_tiebroken_flag() {
    let h = harness();
    seed_recipe(&h.store, "recipe-1");
    h.store.insert_plan(meal_plan("plan-1", STARTS_AT, DEADLINE));
    h.store.insert_option(option(
        "opt-z",
        "plan-1",
        "recipe-1",
        DayOfWeek::Friday,
        MealSlot::Dinner,
    ));
    h.store.insert_option(option(
        "opt-a",
        "plan-1",
        "recipe-1",
        DayOfWeek::Friday,
        MealSlot::Dinner,
    ));
    for vote in ballot("alice", &["opt-z", "opt-a"], TIMELY)
        .into_iter()
        .chain(ballot("bob", &["opt-a", "opt-z"], TIMELY))
    {
        h.store.insert_vote(vote);
    }

    assert_eq!(h.finalizer.run_once(&h.cancel).await.unwrap(), 1);

    let winner = h.store.option("opt-a").unwrap();
    assert!(winner.chosen);
    assert!(winner.tiebroken);
    assert!(!h.store.option("opt-z").unwrap().chosen);
}

#[tokio::test]
async fn plan_without_options_finalizes_vacuously() {
    let h = harness();
    h.store.insert_plan(meal_plan("plan-1", STARTS_AT, DEADLINE));

    assert_eq!(h.finalizer.run_once(&h.cancel).await.unwrap(), 1);
    assert_eq!(
        h.store.plan("plan-1").unwrap().status,
        MealPlanStatus::Finalized
    );
    assert_eq!(h.publisher.events_of_type("meal_plan_finalized").len(), 1);
    assert!(h.publisher.events_of_type("meal_plan_option_chosen").is_empty());
}

#[tokio::test]
async fn store_outage_aborts_the_tick() {
    let h = harness();
    seed_votable_plan(&h.store);
    h.store.set_unavailable(true);

    let result = h.finalizer.run_once(&h.cancel).await;
    assert!(result.is_err());

    h.store.set_unavailable(false);
    assert_eq!(
        h.store.plan("plan-1").unwrap().status,
        MealPlanStatus::AwaitingVotes
    );

    // The next tick succeeds.
    assert_eq!(h.finalizer.run_once(&h.cancel).await.unwrap(), 1);
}

#[tokio::test]
async fn cancellation_stops_before_processing() {
    let h = harness();
    seed_votable_plan(&h.store);
    h.cancel.cancel();

    assert_eq!(h.finalizer.run_once(&h.cancel).await.unwrap(), 0);
    assert_eq!(
        h.store.plan("plan-1").unwrap().status,
        MealPlanStatus::AwaitingVotes
    );
    assert!(h.publisher.published().is_empty());
}

#[tokio::test]
async fn plans_finalize_in_deadline_then_id_order() {
    let h = harness();
    seed_recipe(&h.store, "recipe-1");

    // Same deadline: ids break the tie. Earlier deadline goes first.
    h.store.insert_plan(meal_plan("plan-b", STARTS_AT, DEADLINE));
    h.store.insert_plan(meal_plan("plan-a", STARTS_AT, DEADLINE));
    h.store
        .insert_plan(meal_plan("plan-c", STARTS_AT, "2030-01-07T18:00:00Z"));

    assert_eq!(h.finalizer.run_once(&h.cancel).await.unwrap(), 3);

    let finalized: Vec<String> = h
        .publisher
        .events_of_type("meal_plan_finalized")
        .iter()
        .map(|e| e["meal_plan_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(finalized, vec!["plan-c", "plan-a", "plan-b"]);
}

// ---------------------------------------------------------------------------
// Invariant-violation triage
// ---------------------------------------------------------------------------

/// A store whose due-plan query reports a stale plan, as a competing
/// finalizer instance would see just before losing the commit race.
struct StaleStore {
    inner: Arc<MemoryStore>,
    stale: MealPlan,
}

#[async_trait]
impl MealPlanStore for StaleStore {
    async fn plans_awaiting_finalization(
        &self,
        _now: DateTime<Utc>,
    ) -> Result<Vec<MealPlan>, StoreError> {
        Ok(vec![self.stale.clone()])
    }

    async fn options_for_plan(
        &self,
        plan_id: &str,
    ) -> Result<Vec<MealPlanOption>, StoreError> {
        self.inner.options_for_plan(plan_id).await
    }

    async fn votes_for_options(
        &self,
        option_ids: &[String],
    ) -> Result<Vec<MealPlanOptionVote>, StoreError> {
        self.inner.votes_for_options(option_ids).await
    }

    async fn commit_finalization(
        &self,
        plan_id: &str,
        selections: &[SlotSelection],
    ) -> Result<(), StoreError> {
        self.inner.commit_finalization(plan_id, selections).await
    }
}

#[tokio::test]
async fn losing_the_commit_race_abandons_only_that_plan() {
    let store = Arc::new(MemoryStore::new());
    seed_votable_plan(&store);

    // The plan is already finalized, but the stale view predates that.
    let stale = meal_plan("plan-1", STARTS_AT, DEADLINE);
    store
        .commit_finalization(
            "plan-1",
            &[SlotSelection {
                option_id: "opt-din-b".into(),
                tiebroken: false,
            }],
        )
        .await
        .unwrap();

    let publisher = Arc::new(RecordingPublisher::new());
    let stale_store = Arc::new(StaleStore {
        inner: Arc::clone(&store),
        stale,
    });
    let recipes: Arc<dyn RecipeStore> = store.clone();
    let tasks: Arc<dyn PrepTaskSink> = store.clone();
    let events: Arc<dyn EventPublisher> = publisher.clone();
    let finalizer = Finalizer::new(
        stale_store,
        recipes,
        tasks,
        events,
        Arc::new(clock_at(NOW)),
        FinalizerConfig::default(),
        PrepConfig::default(),
    );

    // The violation is logged and absorbed; the tick itself succeeds.
    let finalized = finalizer
        .run_once(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(finalized, 0);
    assert!(publisher.events_of_type("meal_plan_finalized").is_empty());
}
