//! Dependency Orderer.
//!
//! Tables are ordered so every foreign key target precedes its referrers.
//! Ties are broken by document position, which keeps output stable and makes
//! the "no order known" path the same algorithm with no edges.

use crate::catalog::Database;
use crate::catalog::id::QualifiedName;
use crate::catalog::view::View;
use crate::constants::TABLE_DEPENDENCY_IGNORABLE_NAME;
use crate::error::{DiffError, Result};
use itertools::Itertools;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashSet};
use tracing::{debug, warn};

/// One position in the dependency order. Entries whose table is
/// [`TABLE_DEPENDENCY_IGNORABLE_NAME`] stand for a whole schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub schema: String,
    pub table: String,
}

impl OrderEntry {
    pub fn is_schema_marker(&self) -> bool {
        self.table == TABLE_DEPENDENCY_IGNORABLE_NAME
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.schema, &self.table)
    }
}

/// Schema markers first, then every table with foreign key targets ahead of referrers.
pub fn dependency_order(db: &Database) -> Vec<OrderEntry> {
    table_order(db, true)
}

/// Schema markers first, then tables as written in the document.
pub fn document_order(db: &Database) -> Vec<OrderEntry> {
    table_order(db, false)
}

fn table_order(db: &Database, follow_keys: bool) -> Vec<OrderEntry> {
    let tables: Vec<QualifiedName> = db.tables().map(|(_, t)| t.qualified_name()).collect();
    let position: BTreeMap<&QualifiedName, usize> =
        tables.iter().enumerate().map(|(i, t)| (t, i)).collect();

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..tables.len()).map(|i| graph.add_node(i)).collect();

    if follow_keys {
        for (_, table) in db.tables() {
            let Some(&referrer) = position.get(&table.qualified_name()) else {
                continue;
            };
            for target in table.referenced_tables() {
                match position.get(&target) {
                    Some(&t) if t != referrer => {
                        graph.update_edge(nodes[t], nodes[referrer], ());
                    }
                    Some(_) => {}
                    None => debug!("{} references {} outside the document", table.name, target),
                }
            }
        }
        break_cycles(&mut graph, &tables);
    }

    let sorted = match stable_topological_order(&graph) {
        Ok(sorted) => sorted,
        // cycles were removed above; fall back to document order regardless
        Err(_) => (0..tables.len()).collect(),
    };

    let mut out: Vec<OrderEntry> = db
        .schemas
        .iter()
        .map(|s| OrderEntry {
            schema: s.name.clone(),
            table: TABLE_DEPENDENCY_IGNORABLE_NAME.to_string(),
        })
        .collect();
    out.extend(sorted.into_iter().map(|i| OrderEntry {
        schema: tables[i].schema.clone(),
        table: tables[i].name.clone(),
    }));
    out
}

/// Remove edges inside every strongly connected component, warning once per cycle.
fn break_cycles(graph: &mut DiGraph<usize, ()>, tables: &[QualifiedName]) {
    for component in tarjan_scc(&*graph) {
        if component.len() < 2 {
            continue;
        }
        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        warn!(
            "Foreign key cycle among {}; ordering those tables by document position",
            component
                .iter()
                .map(|n| tables[graph[*n]].to_string())
                .sorted()
                .join(", ")
        );
        let inner: Vec<_> = graph
            .edge_indices()
            .filter(|e| {
                graph
                    .edge_endpoints(*e)
                    .is_some_and(|(a, b)| members.contains(&a) && members.contains(&b))
            })
            .collect();
        // remove from the back so earlier indices stay valid
        for edge in inner.into_iter().rev() {
            graph.remove_edge(edge);
        }
    }
}

/// Kahn's algorithm, always taking the ready node with the lowest weight.
/// On a cycle, returns the weights that could not be placed.
fn stable_topological_order(graph: &DiGraph<usize, ()>) -> std::result::Result<Vec<usize>, Vec<usize>> {
    let mut in_degree: BTreeMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|n| (n, graph.neighbors_directed(n, Direction::Incoming).count()))
        .collect();
    let mut ready: BinaryHeap<Reverse<(usize, NodeIndex)>> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(n, _)| Reverse((graph[*n], *n)))
        .collect();

    let mut out = Vec::with_capacity(graph.node_count());
    while let Some(Reverse((weight, node))) = ready.pop() {
        out.push(weight);
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            if let Some(d) = in_degree.get_mut(&next) {
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse((graph[next], next)));
                }
            }
        }
    }

    if out.len() == graph.node_count() {
        Ok(out)
    } else {
        let placed: HashSet<usize> = out.into_iter().collect();
        Err(graph
            .node_weights()
            .copied()
            .filter(|w| !placed.contains(w))
            .collect())
    }
}

/// Views ordered so each follows the views it depends on. A cycle is fatal.
pub fn view_order(db: &Database) -> Result<Vec<&View>> {
    let views: Vec<&View> = db.views().collect();
    let position: BTreeMap<QualifiedName, usize> = views
        .iter()
        .enumerate()
        .map(|(i, v)| (v.qualified_name(), i))
        .collect();

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..views.len()).map(|i| graph.add_node(i)).collect();
    for (i, view) in views.iter().enumerate() {
        for dependency in &view.depends_on {
            let target = position.get(dependency).ok_or_else(|| {
                DiffError::not_found(
                    "view",
                    format!("{dependency} (dependency of {})", view.qualified_name()),
                )
            })?;
            graph.update_edge(nodes[*target], nodes[i], ());
        }
    }

    stable_topological_order(&graph)
        .map(|sorted| sorted.into_iter().map(|i| views[i]).collect())
        .map_err(|stuck| {
            DiffError::DependencyCycle(
                stuck
                    .into_iter()
                    .map(|i| views[i].qualified_name().to_string())
                    .join(", "),
            )
        })
}
