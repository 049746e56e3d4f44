//! Directed-graph representation of a reaction network.
//!
//! A [`ReactionGraph`] has two node kinds: reaction nodes, one per
//! transformation event, and species nodes wrapping one [`Molecule`] with a
//! reactant/product role tag. Edges run reactant → reaction → product.
//! Within one network, structurally equal molecules share a species node;
//! species identity is the node index itself, an opaque identifier. The
//! human-readable display strings are diagnostics only and are allowed to
//! collide.

use std::fmt::Display;

use petgraph::{
    algo::is_isomorphic_matching,
    graph::{Graph, NodeIndex},
    Directed,
    Direction::{Incoming, Outgoing},
};

use crate::molecule::{Index, Molecule};

type RGraph = Graph<NetworkNode, (), Directed, Index>;

/// The part a species plays in one reaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    Reactant,
    Product,
}

/// Whether species roles distinguish nodes when comparing reaction networks.
///
/// The default ignores roles: two networks are equal if the same molecules
/// sit in the same topology, whichever side of the arrow they are on.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RoleMode {
    /// Species nodes match on molecular structure alone.
    #[default]
    Ignore,
    /// Species nodes must also agree on their reactant/product role.
    Strict,
}

/// The nodes of a [`ReactionGraph`].
#[derive(Debug, Clone)]
pub enum NetworkNode {
    /// One transformation event, labeled with a human-readable name.
    Reaction { name: String },
    /// One chemical species together with its most recent role.
    Species { species: Molecule, role: Role },
}

/// A directed graph of reactions and the species they consume and produce.
///
/// Every reaction node has at least one incoming species edge and at least
/// one outgoing species edge by construction. Networks are compared by graph
/// isomorphism: reaction nodes match any reaction node, species nodes match
/// iff their molecules are equal (see [`RoleMode`] for role handling).
#[derive(Debug, Clone, Default)]
pub struct ReactionGraph {
    graph: RGraph,
}

impl ReactionGraph {
    /// Construct an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a network from (reactants, products) pairs.
    pub fn from_reaction_list(reactions: &[(Vec<Molecule>, Vec<Molecule>)]) -> Self {
        let mut network = Self::new();
        for (reactants, products) in reactions {
            network.add_reaction(reactants, products);
        }
        network
    }

    /// Add one reaction event, merging its species into any structurally
    /// equal species already present.
    pub fn add_reaction(&mut self, reactants: &[Molecule], products: &[Molecule]) {
        debug_assert!(
            !reactants.is_empty() && !products.is_empty(),
            "a reaction needs at least one reactant and one product"
        );
        let rnode = self.graph.add_node(NetworkNode::Reaction {
            name: self.reaction_name(reactants, products),
        });
        for reactant in reactants {
            let snode = self.find_or_add_species(reactant, Role::Reactant);
            self.graph.update_edge(snode, rnode, ());
        }
        for product in products {
            let snode = self.find_or_add_species(product, Role::Product);
            self.graph.update_edge(rnode, snode, ());
        }
    }

    /// The inverse of [`ReactionGraph::from_reaction_list`]: one
    /// (reactants, products) pair per reaction node.
    pub fn to_reaction_list(&self) -> Vec<(Vec<Molecule>, Vec<Molecule>)> {
        self.reaction_nodes()
            .map(|rnode| {
                let collect = |dir| {
                    self.graph
                        .neighbors_directed(rnode, dir)
                        .filter_map(|ix| match &self.graph[ix] {
                            NetworkNode::Species { species, .. } => Some(species.clone()),
                            NetworkNode::Reaction { .. } => None,
                        })
                        .collect::<Vec<_>>()
                };
                (collect(Incoming), collect(Outgoing))
            })
            .collect()
    }

    /// Return the number of reaction events in this network.
    pub fn reaction_count(&self) -> usize {
        self.reaction_nodes().count()
    }

    /// Return the molecules of every species node currently tagged with
    /// `role`.
    pub fn species_with_role(&self, role: Role) -> impl Iterator<Item = &Molecule> {
        self.graph.node_weights().filter_map(move |w| match w {
            NetworkNode::Species {
                species,
                role: tagged,
            } if *tagged == role => Some(species),
            _ => None,
        })
    }

    /// Isomorphism comparison under an explicit role-matching mode.
    pub fn isomorphic_with(&self, other: &Self, roles: RoleMode) -> bool {
        let node_match = |a: &NetworkNode, b: &NetworkNode| match (a, b) {
            (NetworkNode::Reaction { .. }, NetworkNode::Reaction { .. }) => true,
            (
                NetworkNode::Species {
                    species: sa,
                    role: ra,
                },
                NetworkNode::Species {
                    species: sb,
                    role: rb,
                },
            ) => (roles == RoleMode::Ignore || ra == rb) && sa == sb,
            _ => false,
        };
        is_isomorphic_matching(&self.graph, &other.graph, node_match, |_, _| true)
    }

    fn reaction_nodes(&self) -> impl Iterator<Item = NodeIndex<Index>> + '_ {
        self.graph
            .node_indices()
            .filter(|&ix| matches!(self.graph[ix], NetworkNode::Reaction { .. }))
    }

    /// Join reactant and product display strings, then disambiguate with an
    /// incrementing "(i)" suffix until the name is unused in this network.
    fn reaction_name(&self, reactants: &[Molecule], products: &[Molecule]) -> String {
        let join = |mols: &[Molecule]| {
            mols.iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join("+")
        };
        let base = format!("{}->{}", join(reactants), join(products));

        let mut name = base.clone();
        let mut i = 1;
        while self.reaction_nodes().any(|ix| match &self.graph[ix] {
            NetworkNode::Reaction { name: used } => *used == name,
            _ => false,
        }) {
            name = format!("{base}({i})");
            i += 1;
        }
        name
    }

    /// Reuse the species node holding a molecule equal to `molecule`, if one
    /// exists, retagging it with the latest role; otherwise add a new node.
    fn find_or_add_species(&mut self, molecule: &Molecule, role: Role) -> NodeIndex<Index> {
        let found = self.graph.node_indices().find(|&ix| {
            matches!(&self.graph[ix], NetworkNode::Species { species, .. } if species == molecule)
        });
        match found {
            Some(ix) => {
                if let NetworkNode::Species { role: tagged, .. } = &mut self.graph[ix] {
                    *tagged = role;
                }
                ix
            }
            None => self.graph.add_node(NetworkNode::Species {
                species: molecule.clone(),
                role,
            }),
        }
    }
}

/// Newline-joined reaction names; diagnostic only.
impl Display for ReactionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self
            .reaction_nodes()
            .filter_map(|ix| match &self.graph[ix] {
                NetworkNode::Reaction { name } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        write!(f, "{}", names.join("\n"))
    }
}

impl PartialEq for ReactionGraph {
    fn eq(&self, other: &Self) -> bool {
        self.isomorphic_with(other, RoleMode::Ignore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{tests::chain, Element};

    /// One-reaction networks for ONNO losing each of its atoms in turn,
    /// paired with a lone hydrogen product.
    fn onno_removal_networks() -> (ReactionGraph, ReactionGraph, ReactionGraph, ReactionGraph) {
        let onno = chain(&[Element::O, Element::N, Element::N, Element::O]);
        let h = chain(&[Element::H]);
        let atoms: Vec<_> = onno.atoms().collect();

        let build = |removed: usize| {
            ReactionGraph::from_reaction_list(&[(
                vec![onno.clone()],
                vec![onno.with_atom_removed(atoms[removed]), h.clone()],
            )])
        };
        (build(0), build(1), build(3), build(0))
    }

    #[test]
    fn eq_onno_isomers() {
        let (r_first_o, r_n, r_last_o, _) = onno_removal_networks();

        assert_ne!(r_first_o, r_n);
        assert_ne!(r_n, r_last_o);
        assert_eq!(r_first_o, r_last_o);
    }

    #[test]
    fn eq_ignores_node_labels() {
        let (r_first_o, _, _, rebuilt) = onno_removal_networks();
        assert_eq!(r_first_o, rebuilt);
    }

    #[test]
    fn reaction_list_round_trip() {
        let onno = chain(&[Element::O, Element::N, Element::N, Element::O]);
        let no = chain(&[Element::N, Element::O]);
        let network = ReactionGraph::from_reaction_list(&[(
            vec![onno.clone()],
            vec![no.clone(), no.clone()],
        )]);

        let list = network.to_reaction_list();
        assert_eq!(list.len(), 1);
        let (reactants, products) = &list[0];
        assert_eq!(reactants, &vec![onno]);
        // The two equal fragments were merged into a single species node.
        assert_eq!(products, &vec![no]);

        assert_eq!(network, ReactionGraph::from_reaction_list(&list));
    }

    #[test]
    fn colliding_names_get_suffixes() {
        let o2 = chain(&[Element::O, Element::O]);
        let o = chain(&[Element::O]);

        let mut network = ReactionGraph::new();
        network.add_reaction(&[o2.clone()], &[o.clone()]);
        network.add_reaction(&[o2.clone()], &[o.clone()]);
        network.add_reaction(&[o2], &[o]);

        let mut names = Vec::new();
        for ix in network.graph.node_indices() {
            if let NetworkNode::Reaction { name } = &network.graph[ix] {
                names.push(name.clone());
            }
        }
        names.sort();
        assert_eq!(names, vec!["OO->O", "OO->O(1)", "OO->O(2)"]);
    }

    #[test]
    fn every_reaction_has_both_sides() {
        let h2o = chain(&[Element::H, Element::O, Element::H]);
        let oh = chain(&[Element::O, Element::H]);
        let h = chain(&[Element::H]);
        let network = ReactionGraph::from_reaction_list(&[(vec![h2o], vec![oh, h])]);

        for rnode in network.reaction_nodes() {
            assert!(network
                .graph
                .neighbors_directed(rnode, Incoming)
                .next()
                .is_some());
            assert!(network
                .graph
                .neighbors_directed(rnode, Outgoing)
                .next()
                .is_some());
        }
    }

    #[test]
    fn role_mode_strict_sees_retagging_order() {
        // A species consumed by one reaction and produced by another keeps
        // whichever role was tagged last, so insertion order shows through
        // under strict matching while the topology stays identical.
        let no = chain(&[Element::N, Element::O]);
        let n = chain(&[Element::N]);
        let o = chain(&[Element::O]);
        let o2 = chain(&[Element::O, Element::O]);

        let mut chained = ReactionGraph::new();
        chained.add_reaction(&[no.clone()], &[n.clone(), o.clone()]);
        chained.add_reaction(&[o.clone()], &[o2.clone()]);

        let mut reversed = ReactionGraph::new();
        reversed.add_reaction(&[o.clone()], &[o2]);
        reversed.add_reaction(&[no], &[n, o]);

        assert!(chained.isomorphic_with(&reversed, RoleMode::Ignore));
        assert!(!chained.isomorphic_with(&reversed, RoleMode::Strict));
    }
}
