//! `mise analyze`: build and print the DAG for a recipe file.

use std::path::Path;

use anyhow::Result;

use mise_core::graph::RecipeGraph;

use crate::dataset::load_recipe;

/// Run the analyze command.
pub fn run_analyze(file: &Path) -> Result<()> {
    let recipe = load_recipe(file)?;

    let graph = match RecipeGraph::build(&recipe) {
        Ok(graph) => graph,
        Err(err) => {
            anyhow::bail!("invalid recipe {:?}: {err}", recipe.id);
        }
    };

    println!(
        "Recipe: {} ({}, {} steps, {} edges)",
        recipe.name,
        recipe.id,
        graph.vertex_count(),
        graph.edge_count()
    );

    let order = graph
        .topological_order()
        .iter()
        .map(|i| format!("#{i}"))
        .collect::<Vec<_>>()
        .join(" -> ");
    println!("Execution order: {order}");

    println!("Edges:");
    for from in graph.step_indices() {
        for to in graph.out_neighbors(from) {
            println!("  #{from} -> #{to}");
        }
    }

    let roots = graph
        .roots()
        .iter()
        .map(|i| format!("#{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("Roots: {roots}");

    Ok(())
}
