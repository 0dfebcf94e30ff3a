//! Recipe graph builder: lifts a recipe into a DAG of steps.
//!
//! Vertices are keyed by `step.index` (stable ordering for deterministic
//! downstream algorithms); edges run from the producing step to the
//! consuming step for every product reference in an ingredient or instrument
//! entry. Duplicate edges collapse. Well-formed recipes only cite earlier
//! steps, so the graph is acyclic by construction; the builder still rejects
//! cycles and dangling references because stored data can be corrupted.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use thiserror::Error;

use crate::model::Recipe;

/// Errors surfaced while lifting a recipe into a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("recipe has no steps")]
    EmptyRecipe,

    #[error("step #{step_index} references unknown product {product_id:?}")]
    DanglingProductReference { step_index: u32, product_id: String },

    #[error(
        "step #{step_index} references product {product_id:?} produced by step #{producer_index}, which does not come before it"
    )]
    ForwardProductReference {
        step_index: u32,
        producer_index: u32,
        product_id: String,
    },

    #[error("recipe graph contains a cycle through step #{step_index}")]
    InvalidRecipeGraph { step_index: u32 },
}

/// The DAG implied by one recipe's product flow.
#[derive(Debug, Clone)]
pub struct RecipeGraph {
    /// Outgoing edges, keyed by producing step index.
    out_edges: BTreeMap<u32, BTreeSet<u32>>,
    /// Incoming edges, keyed by consuming step index.
    in_edges: BTreeMap<u32, BTreeSet<u32>>,
}

impl RecipeGraph {
    /// Build the graph for a recipe.
    ///
    /// Fails with [`GraphError::EmptyRecipe`] for a recipe without steps,
    /// [`GraphError::DanglingProductReference`] when a product reference
    /// resolves to no step, [`GraphError::ForwardProductReference`] when it
    /// resolves to the consuming step itself or a later one, and
    /// [`GraphError::InvalidRecipeGraph`] when an edge would close a cycle.
    pub fn build(recipe: &Recipe) -> Result<Self, GraphError> {
        if recipe.steps.is_empty() {
            return Err(GraphError::EmptyRecipe);
        }

        let mut graph = Self {
            out_edges: BTreeMap::new(),
            in_edges: BTreeMap::new(),
        };
        for step in &recipe.steps {
            graph.out_edges.entry(step.index).or_default();
            graph.in_edges.entry(step.index).or_default();
        }

        // Product id -> producing step index.
        let mut producers: HashMap<&str, u32> = HashMap::new();
        for step in &recipe.steps {
            for product in &step.products {
                producers.insert(product.id.as_str(), step.index);
            }
        }

        for step in &recipe.steps {
            let ingredient_refs = step.ingredients.iter().filter_map(|e| e.product_id());
            let instrument_refs = step.instruments.iter().filter_map(|e| e.product_id());

            for product_id in ingredient_refs.chain(instrument_refs) {
                let producer_index = *producers.get(product_id).ok_or_else(|| {
                    GraphError::DanglingProductReference {
                        step_index: step.index,
                        product_id: product_id.to_string(),
                    }
                })?;

                if producer_index >= step.index {
                    return Err(GraphError::ForwardProductReference {
                        step_index: step.index,
                        producer_index,
                        product_id: product_id.to_string(),
                    });
                }

                graph.insert_edge(producer_index, step.index)?;
            }
        }

        Ok(graph)
    }

    /// Insert the edge `from -> to`, collapsing duplicates. Rejects an edge
    /// that would close a cycle (`to` already reaches `from`).
    fn insert_edge(&mut self, from: u32, to: u32) -> Result<(), GraphError> {
        if self.reaches(to, from) {
            return Err(GraphError::InvalidRecipeGraph { step_index: from });
        }
        self.out_edges.entry(from).or_default().insert(to);
        self.in_edges.entry(to).or_default().insert(from);
        Ok(())
    }

    /// Depth-first reachability: is `target` reachable from `start`?
    fn reaches(&self, start: u32, target: u32) -> bool {
        if start == target {
            return true;
        }
        let mut stack = vec![start];
        let mut seen = BTreeSet::new();
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            for &next in self.out_edges.get(&node).into_iter().flatten() {
                if next == target {
                    return true;
                }
                stack.push(next);
            }
        }
        false
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.out_edges.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.out_edges.values().map(BTreeSet::len).sum()
    }

    /// All step indices, ascending.
    pub fn step_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.out_edges.keys().copied()
    }

    /// Whether the edge `from -> to` exists.
    pub fn has_edge(&self, from: u32, to: u32) -> bool {
        self.out_edges
            .get(&from)
            .is_some_and(|set| set.contains(&to))
    }

    /// Steps consuming a product of `index`, ascending.
    pub fn out_neighbors(&self, index: u32) -> impl Iterator<Item = u32> + '_ {
        self.out_edges.get(&index).into_iter().flatten().copied()
    }

    /// Steps producing an input of `index`, ascending.
    pub fn in_neighbors(&self, index: u32) -> impl Iterator<Item = u32> + '_ {
        self.in_edges.get(&index).into_iter().flatten().copied()
    }

    /// Number of incoming edges for `index`.
    pub fn in_degree(&self, index: u32) -> usize {
        self.in_edges.get(&index).map_or(0, BTreeSet::len)
    }

    /// Vertices with no incoming edges, ascending.
    pub fn roots(&self) -> Vec<u32> {
        self.step_indices()
            .filter(|&i| self.in_degree(i) == 0)
            .collect()
    }

    /// Kahn topological order with smallest-index tie-breaking.
    ///
    /// The graph is acyclic once built, so this always covers every vertex.
    pub fn topological_order(&self) -> Vec<u32> {
        let mut in_degree: BTreeMap<u32, usize> = self
            .step_indices()
            .map(|i| (i, self.in_degree(i)))
            .collect();

        // BTreeMap iteration seeds the queue in ascending index order.
        let mut queue: VecDeque<u32> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for next in self.out_neighbors(node) {
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }

        order
    }
}
