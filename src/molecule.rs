//! Graph-theoretic representation of a molecule.
//!
//! A [`Molecule`] is an attributed undirected graph: nodes are [`Atom`]s,
//! edges are bonds. Bonds carry no weight of their own; multiplicity is not a
//! structural feature here. Two molecules are the *same species* iff their
//! graphs are isomorphic under an atom matcher that compares element and
//! formal charge, so node identifiers never need to be canonical.

use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use petgraph::{
    algo::is_isomorphic_matching,
    dot::Dot,
    graph::{EdgeIndex, Graph, NodeIndex},
    visit::{DfsPostOrder, VisitMap},
    Undirected,
};

pub(crate) type Index = u32;
pub(crate) type MGraph = Graph<Atom, (), Undirected, Index>;

/// Thrown by [`Element::from_str`] if the string does not represent a valid
/// chemical element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseElementError;

macro_rules! periodic_table {
    ( $(($element:ident, $symbol:literal),)* ) => {
        /// Represents a chemical element.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Element {
            $( $element, )*
        }

        impl Display for Element {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match &self {
                    $( Element::$element => write!(f, "{}", $symbol), )*
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $symbol => Ok(Element::$element), )*
                    _ => Err(ParseElementError),
                }
            }
        }
    };
}

periodic_table!(
    (H, "H"),
    (He, "He"),
    (Li, "Li"),
    (Be, "Be"),
    (B, "B"),
    (C, "C"),
    (N, "N"),
    (O, "O"),
    (F, "F"),
    (Ne, "Ne"),
    (Na, "Na"),
    (Mg, "Mg"),
    (Al, "Al"),
    (Si, "Si"),
    (P, "P"),
    (S, "S"),
    (Cl, "Cl"),
    (Ar, "Ar"),
    (K, "K"),
    (Ca, "Ca"),
    (Sc, "Sc"),
    (Ti, "Ti"),
    (V, "V"),
    (Cr, "Cr"),
    (Mn, "Mn"),
    (Fe, "Fe"),
    (Co, "Co"),
    (Ni, "Ni"),
    (Cu, "Cu"),
    (Zn, "Zn"),
    (Ga, "Ga"),
    (Ge, "Ge"),
    (As, "As"),
    (Se, "Se"),
    (Br, "Br"),
    (Kr, "Kr"),
    (Rb, "Rb"),
    (Sr, "Sr"),
    (Y, "Y"),
    (Zr, "Zr"),
    (Nb, "Nb"),
    (Mo, "Mo"),
    (Tc, "Tc"),
    (Ru, "Ru"),
    (Rh, "Rh"),
    (Pd, "Pd"),
    (Ag, "Ag"),
    (Cd, "Cd"),
    (In, "In"),
    (Sn, "Sn"),
    (Sb, "Sb"),
    (Te, "Te"),
    (I, "I"),
    (Xe, "Xe"),
    (Cs, "Cs"),
    (Ba, "Ba"),
    (La, "La"),
    (Ce, "Ce"),
    (Pr, "Pr"),
    (Nd, "Nd"),
    (Pm, "Pm"),
    (Sm, "Sm"),
    (Eu, "Eu"),
    (Gd, "Gd"),
    (Tb, "Tb"),
    (Dy, "Dy"),
    (Ho, "Ho"),
    (Er, "Er"),
    (Tm, "Tm"),
    (Yb, "Yb"),
    (Lu, "Lu"),
    (Hf, "Hf"),
    (Ta, "Ta"),
    (W, "W"),
    (Re, "Re"),
    (Os, "Os"),
    (Ir, "Ir"),
    (Pt, "Pt"),
    (Au, "Au"),
    (Hg, "Hg"),
    (Tl, "Tl"),
    (Pb, "Pb"),
    (Bi, "Bi"),
    (Po, "Po"),
    (At, "At"),
    (Rn, "Rn"),
    (Fr, "Fr"),
    (Ra, "Ra"),
    (Ac, "Ac"),
    (Th, "Th"),
    (Pa, "Pa"),
    (U, "U"),
    (Np, "Np"),
    (Pu, "Pu"),
    (Am, "Am"),
    (Cm, "Cm"),
    (Bk, "Bk"),
    (Cf, "Cf"),
    (Es, "Es"),
    (Fm, "Fm"),
    (Md, "Md"),
    (No, "No"),
    (Lr, "Lr"),
    (Rf, "Rf"),
    (Db, "Db"),
    (Sg, "Sg"),
    (Bh, "Bh"),
    (Hs, "Hs"),
    (Mt, "Mt"),
    (Ds, "Ds"),
    (Rg, "Rg"),
    (Cn, "Cn"),
    (Nh, "Nh"),
    (Fl, "Fl"),
    (Mc, "Mc"),
    (Lv, "Lv"),
    (Ts, "Ts"),
    (Og, "Og"),
);

/// The nodes of a [`Molecule`] graph.
///
/// Structural identity is the `(element, charge)` pair; `location` and any
/// passthrough fields from the exchange format ride along for round trips
/// but never participate in equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    element: Element,
    charge: i32,
    location: Option<[f64; 3]>,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Atom {
    /// Construct an [`Atom`] of type `element` with formal charge `charge`.
    pub fn new(element: Element, charge: i32) -> Self {
        Self {
            element,
            charge,
            location: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Construct an [`Atom`] carrying a location and passthrough fields.
    pub fn with_details(
        element: Element,
        charge: i32,
        location: Option<[f64; 3]>,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            element,
            charge,
            location,
            extra,
        }
    }

    /// Return this [`Atom`]'s element.
    pub fn element(&self) -> Element {
        self.element
    }

    /// Return this [`Atom`]'s formal charge.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Return this [`Atom`]'s location, if one was supplied.
    pub fn location(&self) -> Option<[f64; 3]> {
        self.location
    }

    /// Return the passthrough fields this [`Atom`] was loaded with.
    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    /// Return `true` iff `self` and `other` are interchangeable under the
    /// isomorphism matcher, i.e., same element and same formal charge.
    pub fn equivalent(&self, other: &Atom) -> bool {
        self.element == other.element && self.charge == other.charge
    }
}

/// A simple, loopless, undirected graph with [`Atom`]s as nodes and
/// unattributed bonds as edges.
///
/// Node identifiers are unique within one instance but carry no meaning
/// across instances; all cross-instance comparison goes through isomorphism.
/// Derivation operations ([`Molecule::with_bond_removed`],
/// [`Molecule::with_atom_removed`]) return an independent copy, so prior
/// references stay valid for comparison.
#[derive(Debug, Clone)]
pub struct Molecule {
    graph: MGraph,
}

impl Molecule {
    /// Construct a [`Molecule`] from an existing `MGraph`.
    pub(crate) fn from_graph(g: MGraph) -> Self {
        Self { graph: g }
    }

    /// Return a representation of this molecule as an `MGraph`.
    pub(crate) fn graph(&self) -> &MGraph {
        &self.graph
    }

    /// Return the number of atoms in this molecule.
    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of bonds in this molecule.
    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Return `true` iff this molecule has more than one atom.
    pub fn is_polyatomic(&self) -> bool {
        self.graph.node_count() > 1
    }

    /// Return an iterator over this molecule's atom identifiers.
    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex<Index>> {
        self.graph.node_indices()
    }

    /// Return an iterator over this molecule's bond identifiers.
    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex<Index>> {
        self.graph.edge_indices()
    }

    /// Return a new molecule with the bond `bond` deleted. The atom set is
    /// unchanged; `self` is unaffected.
    pub fn with_bond_removed(&self, bond: EdgeIndex<Index>) -> Molecule {
        let mut g = self.graph.clone();
        g.remove_edge(bond);
        Molecule { graph: g }
    }

    /// Return a new molecule with the atom `atom` and its incident bonds
    /// deleted. `self` is unaffected.
    pub fn with_atom_removed(&self, atom: NodeIndex<Index>) -> Molecule {
        let mut g = self.graph.clone();
        g.remove_node(atom);
        Molecule { graph: g }
    }

    /// Return the subgraph induced on `atoms` as a new molecule.
    pub fn induced_subgraph(&self, atoms: &BTreeSet<NodeIndex<Index>>) -> Molecule {
        let g = self.graph.filter_map(
            |ix, atom| atoms.contains(&ix).then(|| atom.clone()),
            |_, _| Some(()),
        );
        Molecule { graph: g }
    }

    /// Return a pretty-printable representation of this molecule.
    pub fn info(&self) -> String {
        let dot = Dot::new(&self.graph);
        format!("{dot:?}")
    }
}

/// Shorthand linear text of the molecule: element symbols in depth-first
/// post-order, starting from an arbitrary atom of each component. Explicitly
/// non-canonical (it depends on traversal order), so it is used only for
/// human-readable naming and never for equality.
impl Display for Molecule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dfs = DfsPostOrder::empty(&self.graph);
        for start in self.graph.node_indices() {
            if dfs.finished.is_visited(&start) {
                continue;
            }
            dfs.move_to(start);
            while let Some(ix) = dfs.next(&self.graph) {
                write!(f, "{}", self.graph[ix].element())?;
            }
        }
        Ok(())
    }
}

/// Topological equivalence as defined by graph isomorphism: atoms match iff
/// element and formal charge agree; bonds carry no attributes to match.
impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        is_isomorphic_matching(&self.graph, &other.graph, Atom::equivalent, |_, _| true)
    }
}
