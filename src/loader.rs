//! Atoms/bonds exchange-format IO.
//!
//! The canonical interchange shape is a dictionary
//! `{"atoms": [{"element", "charge", "location", ...}], "bonds":
//! [{"atoms": [i, j], "order": 1}]}` where `i, j` index positionally into the
//! atom list. External line-notation converters (SMILES and friends) produce
//! this shape; this module only parses and emits it. Bond order is accepted
//! on input but is not a structural feature, so it is always written back as
//! the placeholder `1`.

use std::{fs, path::Path, str::FromStr};

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::molecule::{Atom, Element, MGraph, Molecule};

/// Thrown when an atoms/bonds dictionary cannot be turned into a
/// [`Molecule`].
#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("molecule data is not a valid atoms/bonds dictionary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read molecule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("atom {index} has unknown element symbol '{symbol}'")]
    UnknownElement { index: usize, symbol: String },

    #[error("bond {bond} references atom index {index}, but only {atom_count} atoms are defined")]
    BondIndexOutOfRange {
        bond: usize,
        index: usize,
        atom_count: usize,
    },

    #[error("bond {bond} joins atom {index} to itself")]
    SelfBond { bond: usize, index: usize },

    #[error("bond between atoms {0} and {1} appears more than once")]
    DuplicateBond(usize, usize),

    #[error("atoms {0} and {1} have identical element and location")]
    DuplicateAtom(usize, usize),
}

/// One atom entry of the exchange format. Unrecognized fields are captured
/// verbatim in `extra` and written back out on serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomRecord {
    pub element: String,
    #[serde(default)]
    pub charge: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<[f64; 3]>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One bond entry of the exchange format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondRecord {
    pub atoms: [usize; 2],
    #[serde(default = "default_bond_order")]
    pub order: u32,
}

fn default_bond_order() -> u32 {
    1
}

/// A whole molecule in the exchange format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeRecord {
    pub atoms: Vec<AtomRecord>,
    pub bonds: Vec<BondRecord>,
}

impl Molecule {
    /// Construct a [`Molecule`] from an exchange-format record, validating
    /// element symbols, bond endpoints, and atom uniqueness.
    pub fn from_record(record: &MoleculeRecord) -> Result<Molecule, MalformedInputError> {
        // Two atoms with the same element sitting at the same coordinates are
        // a corrupt input, not two atoms.
        for (i, a) in record.atoms.iter().enumerate() {
            for (j, b) in record.atoms.iter().enumerate().skip(i + 1) {
                if a.element == b.element && a.location == b.location && a.location.is_some() {
                    return Err(MalformedInputError::DuplicateAtom(i, j));
                }
            }
        }

        let mut graph = MGraph::with_capacity(record.atoms.len(), record.bonds.len());
        for (index, atom) in record.atoms.iter().enumerate() {
            let element = Element::from_str(&atom.element).map_err(|_| {
                MalformedInputError::UnknownElement {
                    index,
                    symbol: atom.element.clone(),
                }
            })?;
            graph.add_node(Atom::with_details(
                element,
                atom.charge,
                atom.location,
                atom.extra.clone(),
            ));
        }

        for (bond, entry) in record.bonds.iter().enumerate() {
            let [i, j] = entry.atoms;
            for index in [i, j] {
                if index >= record.atoms.len() {
                    return Err(MalformedInputError::BondIndexOutOfRange {
                        bond,
                        index,
                        atom_count: record.atoms.len(),
                    });
                }
            }
            if i == j {
                return Err(MalformedInputError::SelfBond { bond, index: i });
            }
            let (a, b) = (NodeIndex::new(i), NodeIndex::new(j));
            if graph.find_edge(a, b).is_some() {
                return Err(MalformedInputError::DuplicateBond(i, j));
            }
            graph.add_edge(a, b, ());
        }

        Ok(Molecule::from_graph(graph))
    }

    /// Emit this molecule as an exchange-format record. The inverse of
    /// [`Molecule::from_record`] up to isomorphism; bond order is emitted as
    /// the constant placeholder `1`.
    pub fn to_record(&self) -> MoleculeRecord {
        let nodes: Vec<_> = self.graph().node_indices().collect();
        let atoms = nodes
            .iter()
            .map(|&ix| {
                let atom = &self.graph()[ix];
                AtomRecord {
                    element: atom.element().to_string(),
                    charge: atom.charge(),
                    location: atom.location(),
                    extra: atom.extra().clone(),
                }
            })
            .collect();

        let bonds = self
            .graph()
            .edge_indices()
            .map(|e| {
                let (src, dst) = self
                    .graph()
                    .edge_endpoints(e)
                    .expect("edge index from this graph");
                let i = nodes.iter().position(|&n| n == src).unwrap();
                let j = nodes.iter().position(|&n| n == dst).unwrap();
                BondRecord {
                    atoms: [i, j],
                    order: default_bond_order(),
                }
            })
            .collect();

        MoleculeRecord { atoms, bonds }
    }
}

/// Parse a molecule from exchange-format JSON text.
pub fn parse_json_str(data: &str) -> Result<Molecule, MalformedInputError> {
    let record: MoleculeRecord = serde_json::from_str(data)?;
    Molecule::from_record(&record)
}

/// Parse a molecule from an exchange-format JSON file.
pub fn parse(path: &Path) -> Result<Molecule, MalformedInputError> {
    parse_json_str(&fs::read_to_string(path)?)
}
