//! Integration tests for prep-task inference.

use mise_core::config::PrepConfig;
use mise_core::model::{PrepTask, PrepTaskKind};
use mise_core::prep::{STORAGE_EXPLANATION, infer_prep_tasks};
use mise_test_utils::{RecipeBuilder, StepBuilder, ts};

fn task_tuple(task: &PrepTask) -> (String, String, PrepTaskKind, String, String, String) {
    (
        task.meal_plan_option_id.clone(),
        task.recipe_step_id.clone(),
        task.kind,
        task.cannot_complete_before.to_rfc3339(),
        task.cannot_complete_after.to_rfc3339(),
        task.creation_explanation.clone(),
    )
}

#[test]
fn frozen_ingredient_produces_thaw_task() {
    let recipe = RecipeBuilder::new("prawn-curry")
        .step(
            StepBuilder::new(1)
                .catalog_ingredient("prawns", Some(-18))
                .product("curry", 0, ""),
        )
        .build();

    let tasks = infer_prep_tasks(
        &recipe,
        ts("2030-01-10T18:00:00Z"),
        "opt-1",
        ts("2030-01-05T00:00:00Z"),
        &PrepConfig::default(),
    )
    .unwrap();

    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task.kind, PrepTaskKind::FrozenIngredient);
    assert_eq!(task.cannot_complete_before, ts("2030-01-08T18:00:00Z"));
    assert_eq!(task.cannot_complete_after, ts("2030-01-09T18:00:00Z"));
    assert!(task.creation_explanation.contains("frozen ingredient (#1)"));
}

#[test]
fn storable_root_close_to_event_clamps_to_now() {
    let now = ts("2030-01-10T15:00:00Z");
    let starts_at = ts("2030-01-10T18:00:00Z");

    let recipe = RecipeBuilder::new("salad")
        .step(StepBuilder::new(1).product("dressing", 86_400, "refrigerate"))
        .step(
            StepBuilder::new(2)
                .product_ingredient("dressing")
                .product("salad", 0, ""),
        )
        .build();

    let tasks =
        infer_prep_tasks(&recipe, starts_at, "opt-1", now, &PrepConfig::default()).unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].kind, PrepTaskKind::StorageEligible);
    assert_eq!(tasks[0].cannot_complete_before, now);
    assert_eq!(tasks[0].cannot_complete_after, starts_at);
    assert_eq!(tasks[0].creation_explanation, STORAGE_EXPLANATION);
}

#[test]
fn root_without_storage_instructions_is_ineligible() {
    let recipe = RecipeBuilder::new("salad")
        .step(StepBuilder::new(1).product("dressing", 86_400, ""))
        .step(
            StepBuilder::new(2)
                .product_ingredient("dressing")
                .product("salad", 0, ""),
        )
        .build();

    let tasks = infer_prep_tasks(
        &recipe,
        ts("2030-01-10T18:00:00Z"),
        "opt-1",
        ts("2030-01-10T15:00:00Z"),
        &PrepConfig::default(),
    )
    .unwrap();

    assert!(tasks.is_empty());
}

#[test]
fn root_excluded_when_consumer_has_second_parent() {
    // Both roots feed step 3; neither may be scheduled alone.
    let recipe = RecipeBuilder::new("stew")
        .step(StepBuilder::new(1).product("broth", 604_800, "freeze"))
        .step(StepBuilder::new(2).product("veg", 86_400, "refrigerate"))
        .step(
            StepBuilder::new(3)
                .product_ingredient("broth")
                .product_ingredient("veg")
                .product("stew", 0, ""),
        )
        .build();

    let tasks = infer_prep_tasks(
        &recipe,
        ts("2030-01-10T18:00:00Z"),
        "opt-1",
        ts("2030-01-01T00:00:00Z"),
        &PrepConfig::default(),
    )
    .unwrap();

    assert!(tasks.is_empty());
}

#[test]
fn inference_is_idempotent() {
    let recipe = RecipeBuilder::new("prawn-curry")
        .step(
            StepBuilder::new(1)
                .catalog_ingredient("prawns", Some(-18))
                .product("paste", 172_800, "refrigerate"),
        )
        .step(
            StepBuilder::new(2)
                .product_ingredient("paste")
                .product("curry", 0, ""),
        )
        .build();
    let starts_at = ts("2030-01-10T18:00:00Z");
    let now = ts("2030-01-05T00:00:00Z");

    let first = infer_prep_tasks(&recipe, starts_at, "opt-1", now, &PrepConfig::default())
        .unwrap()
        .iter()
        .map(task_tuple)
        .collect::<Vec<_>>();
    let second = infer_prep_tasks(&recipe, starts_at, "opt-1", now, &PrepConfig::default())
        .unwrap()
        .iter()
        .map(task_tuple)
        .collect::<Vec<_>>();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn every_window_fits_before_the_event() {
    let recipe = RecipeBuilder::new("banquet")
        .step(
            StepBuilder::new(1)
                .catalog_ingredient("ice-cream", Some(-20))
                .product("base", 259_200, "freeze"),
        )
        .step(
            StepBuilder::new(2)
                .product_ingredient("base")
                .catalog_ingredient("berries", Some(2))
                .product("dessert", 0, ""),
        )
        .build();
    let starts_at = ts("2030-01-10T18:00:00Z");

    let tasks = infer_prep_tasks(
        &recipe,
        starts_at,
        "opt-1",
        ts("2030-01-02T00:00:00Z"),
        &PrepConfig::default(),
    )
    .unwrap();

    assert!(!tasks.is_empty());
    for task in &tasks {
        assert!(task.cannot_complete_before <= task.cannot_complete_after);
        assert!(task.cannot_complete_after <= starts_at);
    }
}

#[test]
fn custom_threshold_changes_what_counts_as_frozen() {
    let recipe = RecipeBuilder::new("cellar")
        .step(
            StepBuilder::new(1)
                .catalog_ingredient("cheese", Some(8))
                .product("board", 0, ""),
        )
        .build();

    let config = PrepConfig {
        frozen_ingredient_threshold_celsius: 10,
        ..PrepConfig::default()
    };

    let tasks = infer_prep_tasks(
        &recipe,
        ts("2030-01-10T18:00:00Z"),
        "opt-1",
        ts("2030-01-05T00:00:00Z"),
        &config,
    )
    .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].kind, PrepTaskKind::FrozenIngredient);
}
