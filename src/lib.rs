// Molecule definition, isomorphism equality
pub mod molecule;

// Atoms/bonds exchange-format IO
pub mod loader;

// Reaction network definition
pub mod reaction;

// Isomorphism-based deduplication
pub mod dedup;

// Structural cohesion (k-components) analysis
pub mod cohesion;

// The hard bit: enumerate scission reactions to a fixed point
pub mod scission;
