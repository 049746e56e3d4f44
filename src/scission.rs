//! Single-bond scission enumeration and recursive network expansion.
//!
//! The hard bit: for one reactant, every bond deletion is a candidate
//! outcome; candidates that are isomorphic (symmetric bonds) collapse to
//! one; each survivor is resolved into product fragments by structural
//! cohesion; each resolved outcome becomes a one-reaction network, merged
//! into an accumulator with isomorphism dedup. The recursive driver then
//! feeds every newly discovered polyatomic product back in until nothing
//! new appears.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cohesion::{k_components, DecompositionError},
    dedup::unique_graphs,
    molecule::Molecule,
    reaction::{ReactionGraph, Role},
};

/// Thrown when one species of the frontier cannot be expanded. The rest of
/// the enumeration carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to expand species '{species}': {source}")]
pub struct FragmentationError {
    /// Display string of the offending species.
    pub species: String,
    #[source]
    pub source: DecompositionError,
}

/// The result of a recursive enumeration: the deduplicated network and any
/// species that failed to expand along the way.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub network: Vec<ReactionGraph>,
    pub failures: Vec<FragmentationError>,
}

/// Enumerate every structurally distinct single-bond scission of `reactant`.
///
/// Reactions are merged into `prior`, so feeding a previous result back in
/// is idempotent: re-running on the same reactant adds nothing new.
pub fn scissions(
    reactant: &Molecule,
    prior: Vec<ReactionGraph>,
) -> Result<Vec<ReactionGraph>, DecompositionError> {
    // One candidate per bond; symmetric bonds yield isomorphic candidates
    // and collapse to one.
    let candidates = unique_graphs(
        reactant
            .bonds()
            .map(|bond| reactant.with_bond_removed(bond)),
    );

    let mut network = prior;
    for candidate in &candidates {
        let products = fragment(candidate)?;
        let event = ReactionGraph::from_reaction_list(&[(vec![reactant.clone()], products)]);
        if !network.contains(&event) {
            network.push(event);
        }
    }
    Ok(network)
}

/// Resolve a post-scission candidate into its product fragments.
fn fragment(candidate: &Molecule) -> Result<Vec<Molecule>, DecompositionError> {
    if candidate.atom_count() == 0 {
        return Err(DecompositionError::EmptyGraph);
    }

    // A two-atom candidate just lost its only bond; cohesion analysis has
    // nothing to say about isolated atoms, so split it directly.
    if candidate.atom_count() == 2 {
        return Ok(candidate
            .atoms()
            .map(|ix| candidate.induced_subgraph(&BTreeSet::from([ix])))
            .collect());
    }

    // Carve the subsets of the deepest cohesion level; whatever they leave
    // uncovered becomes one final fragment, keeping the atom count balanced.
    let levels = k_components(candidate.graph());
    let (_, subsets) = levels
        .iter()
        .next_back()
        .ok_or(DecompositionError::NoCohesiveSubsets)?;

    let mut remaining: BTreeSet<_> = candidate.atoms().collect();
    let mut fragments = Vec::new();
    for subset in subsets {
        fragments.push(candidate.induced_subgraph(subset));
        for ix in subset {
            remaining.remove(ix);
        }
    }
    if !remaining.is_empty() {
        fragments.push(candidate.induced_subgraph(&remaining));
    }
    Ok(fragments)
}

/// Expand `seeds` to the full scission network: run [`scissions`] over a
/// frontier of species, collect every polyatomic product not yet expanded,
/// and repeat until the frontier is empty.
///
/// The frontier is an explicit work list rather than call recursion, so
/// deeply fragmenting molecules cannot exhaust the stack; the `network` and
/// `finished` accumulators are owned here and threaded by value. A species
/// that fails to expand is reported in [`Enumeration::failures`] and skipped
/// rather than aborting the whole enumeration.
pub fn recursive_scissions(seeds: &[Molecule]) -> Enumeration {
    let mut network: Vec<ReactionGraph> = Vec::new();
    let mut finished: Vec<Molecule> = Vec::new();
    let mut failures: Vec<FragmentationError> = Vec::new();

    let mut frontier = unique_graphs(seeds.to_vec());
    while !frontier.is_empty() {
        let mut discovered: Vec<Molecule> = Vec::new();

        for reactant in frontier {
            if finished.contains(&reactant) {
                continue;
            }
            finished.push(reactant.clone());

            let events = match scissions(&reactant, Vec::new()) {
                Ok(events) => events,
                Err(source) => {
                    let failure = FragmentationError {
                        species: reactant.to_string(),
                        source,
                    };
                    warn!("{failure}");
                    failures.push(failure);
                    continue;
                }
            };

            for event in events {
                discovered.extend(
                    event
                        .species_with_role(Role::Product)
                        .filter(|m| m.is_polyatomic())
                        .cloned(),
                );
                if !network.contains(&event) {
                    network.push(event);
                }
            }
        }

        frontier = unique_graphs(discovered)
            .into_iter()
            .filter(|species| !finished.contains(species))
            .collect();
        if !frontier.is_empty() {
            debug!(
                "recursing on: {:?}",
                frontier.iter().map(|m| m.to_string()).collect::<Vec<_>>()
            );
        }
    }

    Enumeration { network, failures }
}
