//! Structural cohesion (k-component) analysis of undirected graphs.
//!
//! A k-component is a maximal node subset that stays mutually connected
//! after removing any k−1 nodes. The hierarchy reported here is what the
//! scission engine uses to decide how a molecule falls apart once a bond is
//! deleted: level 1 is the connected components (isolated nodes are not
//! cohesive and are excluded), level 2 is the biconnected components (a lone
//! edge does not count), and a biconnected component whose own vertex
//! connectivity κ exceeds 2 is additionally reported at level κ.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use bit_set::BitSet;
use petgraph::{
    graph::{Graph, NodeIndex},
    Undirected,
};
use thiserror::Error;

use crate::molecule::Index;

/// Maximal mutually-connected node subsets, keyed by cohesion level.
pub type CohesionLevels = BTreeMap<usize, Vec<BTreeSet<NodeIndex<Index>>>>;

/// Thrown when cohesion analysis is asked to decompose a graph it cannot
/// say anything about.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompositionError {
    #[error("cannot decompose an empty graph")]
    EmptyGraph,

    #[error("graph has no cohesive subsets to carve fragments from")]
    NoCohesiveSubsets,
}

/// Compute the structural-cohesion hierarchy of `g`.
///
/// Refining subsets *inside* a bicomponent beyond that bicomponent's own
/// connectivity would need the minimum-cut recursion of Moody & White
/// (2003); no chemically plausible scission candidate has such structure, so
/// the hierarchy stops at each bicomponent's own κ.
pub fn k_components<N, E>(g: &Graph<N, E, Undirected, Index>) -> CohesionLevels {
    let mut levels = CohesionLevels::new();

    // Level 1: connected components; isolated nodes are not cohesive.
    for comp in connected_components(g) {
        if comp.len() > 1 {
            levels.entry(1).or_default().push(comp);
        }
    }

    // Level 2: biconnected components; a lone edge is not a bicomponent.
    let bicomps = biconnected_components(g);
    for comp in &bicomps {
        if comp.len() > 2 {
            levels.entry(2).or_default().push(comp.clone());
        }
    }

    // Levels >= 3: a bicomponent may be better than 2-connected; its own
    // vertex connectivity is the level it really belongs to.
    for comp in &bicomps {
        if comp.len() > 3 {
            let k = node_connectivity(&adjacency_matrix(g, comp));
            if k > 2 {
                levels.entry(k).or_default().push(comp.clone());
            }
        }
    }

    levels
}

/// Connected components of `g` as node sets, singletons included.
fn connected_components<N, E>(
    g: &Graph<N, E, Undirected, Index>,
) -> Vec<BTreeSet<NodeIndex<Index>>> {
    let mut visited = BitSet::with_capacity(g.node_count());
    let mut comps = Vec::new();
    for start in g.node_indices() {
        if visited.contains(start.index()) {
            continue;
        }
        visited.insert(start.index());
        let mut comp = BTreeSet::new();
        let mut queue = vec![start];
        while let Some(u) = queue.pop() {
            comp.insert(u);
            for v in g.neighbors(u) {
                if visited.insert(v.index()) {
                    queue.push(v);
                }
            }
        }
        comps.push(comp);
    }
    comps
}

/// Biconnected components of `g` as node sets (Hopcroft–Tarjan lowpoints,
/// run iteratively with an explicit frame stack). Articulation points appear
/// in every component they join.
fn biconnected_components<N, E>(
    g: &Graph<N, E, Undirected, Index>,
) -> Vec<BTreeSet<NodeIndex<Index>>> {
    const UNVISITED: usize = usize::MAX;
    let n = g.node_count();
    let adj: Vec<Vec<usize>> = g
        .node_indices()
        .map(|u| g.neighbors(u).map(|v| v.index()).collect())
        .collect();

    let mut disc = vec![UNVISITED; n];
    let mut low = vec![0usize; n];
    let mut timer = 0usize;
    let mut edge_stack: Vec<(usize, usize)> = Vec::new();
    let mut comps = Vec::new();

    for root in 0..n {
        if disc[root] != UNVISITED {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;

        // DFS frames: (node, DFS parent, next unexplored neighbor offset).
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, UNVISITED, 0)];
        while let Some(&(u, parent, ci)) = stack.last() {
            if ci < adj[u].len() {
                stack.last_mut().unwrap().2 += 1;
                let v = adj[u][ci];
                if v == parent {
                    continue;
                }
                if disc[v] == UNVISITED {
                    edge_stack.push((u, v));
                    disc[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    stack.push((v, u, 0));
                } else if disc[v] < disc[u] {
                    // Back edge to an ancestor.
                    edge_stack.push((u, v));
                    low[u] = low[u].min(disc[v]);
                }
            } else {
                stack.pop();
                if let Some(&(p, _, _)) = stack.last() {
                    low[p] = low[p].min(low[u]);
                    if low[u] >= disc[p] {
                        // p separates the subtree at u; everything pushed
                        // since the tree edge (p, u) is one component.
                        let mut comp = BTreeSet::new();
                        while let Some((a, b)) = edge_stack.pop() {
                            comp.insert(NodeIndex::new(a));
                            comp.insert(NodeIndex::new(b));
                            if (a, b) == (p, u) {
                                break;
                            }
                        }
                        comps.push(comp);
                    }
                }
            }
        }
    }
    comps
}

/// Adjacency matrix of the subgraph induced on `nodes`, in the set's
/// iteration order.
fn adjacency_matrix<N, E>(
    g: &Graph<N, E, Undirected, Index>,
    nodes: &BTreeSet<NodeIndex<Index>>,
) -> Vec<Vec<bool>> {
    let index: Vec<_> = nodes.iter().copied().collect();
    let mut adj = vec![vec![false; index.len()]; index.len()];
    for (i, &u) in index.iter().enumerate() {
        for (j, &v) in index.iter().enumerate() {
            if i != j && g.find_edge(u, v).is_some() {
                adj[i][j] = true;
            }
        }
    }
    adj
}

/// Exact vertex connectivity of the graph described by the adjacency matrix
/// `adj`: the minimum over all non-adjacent pairs of the number of
/// vertex-disjoint paths between them, or n−1 for a complete graph.
fn node_connectivity(adj: &[Vec<bool>]) -> usize {
    let n = adj.len();
    let complete = (0..n).all(|u| (0..n).all(|v| u == v || adj[u][v]));
    if complete {
        return n - 1;
    }
    let mut kappa = n - 1;
    for s in 0..n {
        for t in (s + 1)..n {
            if !adj[s][t] {
                kappa = kappa.min(vertex_disjoint_paths(adj, s, t, kappa));
            }
        }
    }
    kappa
}

/// Maximum number of internally vertex-disjoint s–t paths, computed as
/// unit-capacity max flow on the node-split digraph (v becomes v_in → v_out
/// with capacity one, so each vertex carries at most one path). Stops early
/// once `cap` paths are found.
fn vertex_disjoint_paths(adj: &[Vec<bool>], s: usize, t: usize, cap: usize) -> usize {
    let n = adj.len();
    let size = 2 * n;
    // v_in = 2v, v_out = 2v + 1.
    let mut capacity = vec![vec![0u8; size]; size];
    for v in 0..n {
        capacity[2 * v][2 * v + 1] = 1;
    }
    for u in 0..n {
        for v in 0..n {
            if adj[u][v] {
                capacity[2 * u + 1][2 * v] = 1;
            }
        }
    }

    let (source, sink) = (2 * s + 1, 2 * t);
    let mut flow = 0;
    while flow < cap {
        // BFS for an augmenting path in the residual network.
        let mut prev = vec![usize::MAX; size];
        prev[source] = source;
        let mut queue = VecDeque::from([source]);
        'bfs: while let Some(u) = queue.pop_front() {
            for v in 0..size {
                if capacity[u][v] > 0 && prev[v] == usize::MAX {
                    prev[v] = u;
                    if v == sink {
                        break 'bfs;
                    }
                    queue.push_back(v);
                }
            }
        }
        if prev[sink] == usize::MAX {
            break;
        }
        let mut v = sink;
        while v != source {
            let u = prev[v];
            capacity[u][v] -= 1;
            capacity[v][u] += 1;
            v = u;
        }
        flow += 1;
    }
    flow
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestGraph = Graph<(), (), Undirected, Index>;

    fn graph(n: usize, edges: &[(usize, usize)]) -> TestGraph {
        let mut g = TestGraph::default();
        let nodes: Vec<_> = (0..n).map(|_| g.add_node(())).collect();
        for &(u, v) in edges {
            g.add_edge(nodes[u], nodes[v], ());
        }
        g
    }

    fn level(levels: &CohesionLevels, k: usize) -> Vec<Vec<usize>> {
        levels
            .get(&k)
            .map(|sets| {
                let mut v: Vec<Vec<usize>> = sets
                    .iter()
                    .map(|s| s.iter().map(|ix| ix.index()).collect())
                    .collect();
                v.sort();
                v
            })
            .unwrap_or_default()
    }

    #[test]
    fn path_is_one_component() {
        let levels = k_components(&graph(4, &[(0, 1), (1, 2), (2, 3)]));
        assert_eq!(level(&levels, 1), vec![vec![0, 1, 2, 3]]);
        assert!(levels.get(&2).is_none());
    }

    #[test]
    fn split_graph_has_two_components() {
        let levels = k_components(&graph(4, &[(0, 1), (2, 3)]));
        assert_eq!(level(&levels, 1), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn isolated_nodes_are_not_cohesive() {
        let levels = k_components(&graph(3, &[(0, 1)]));
        assert_eq!(level(&levels, 1), vec![vec![0, 1]]);

        let empty = k_components(&graph(2, &[]));
        assert!(empty.is_empty());
    }

    #[test]
    fn cycle_is_biconnected() {
        let levels = k_components(&graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]));
        assert_eq!(level(&levels, 1), vec![vec![0, 1, 2, 3]]);
        assert_eq!(level(&levels, 2), vec![vec![0, 1, 2, 3]]);
        assert!(levels.get(&3).is_none());
    }

    #[test]
    fn pendant_node_is_outside_the_bicomponent() {
        let levels = k_components(&graph(5, &[(0, 1), (1, 2), (2, 3), (3, 0), (2, 4)]));
        assert_eq!(level(&levels, 1), vec![vec![0, 1, 2, 3, 4]]);
        assert_eq!(level(&levels, 2), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn two_rings_sharing_a_cut_vertex() {
        let levels = k_components(&graph(
            5,
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)],
        ));
        assert_eq!(level(&levels, 1), vec![vec![0, 1, 2, 3, 4]]);
        assert_eq!(level(&levels, 2), vec![vec![0, 1, 2], vec![2, 3, 4]]);
    }

    #[test]
    fn complete_graph_is_triconnected() {
        let levels = k_components(&graph(
            4,
            &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
        ));
        assert_eq!(level(&levels, 2), vec![vec![0, 1, 2, 3]]);
        assert_eq!(level(&levels, 3), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn connectivity_of_a_cycle_is_two() {
        let g = graph(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let all: BTreeSet<_> = g.node_indices().collect();
        assert_eq!(node_connectivity(&adjacency_matrix(&g, &all)), 2);
    }

    #[test]
    fn biconnected_components_share_articulation_points() {
        // Two triangles joined at node 2; node 2 belongs to both.
        let g = graph(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)]);
        let mut comps: Vec<Vec<usize>> = biconnected_components(&g)
            .iter()
            .map(|s| s.iter().map(|ix| ix.index()).collect())
            .collect();
        comps.sort();
        assert_eq!(comps, vec![vec![0, 1, 2], vec![2, 3, 4]]);
    }
}
