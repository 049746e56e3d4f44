//! Isomorphism-based deduplication of graph sequences.

/// Fold `graphs` into the subsequence in which no two elements compare
/// equal; the first occurrence of each equivalence class wins and input
/// order is preserved.
///
/// Equality here is whatever the element type defines; for molecules and
/// reaction networks that is graph isomorphism, so membership testing is a
/// linear scan of pairwise isomorphism checks. Quadratic in the number of
/// candidates, and each check is itself exponential in the worst case, but
/// entirely practical at molecular sizes.
pub fn unique_graphs<T: PartialEq>(graphs: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut uniques: Vec<T> = Vec::new();
    for g in graphs {
        if !uniques.contains(&g) {
            uniques.push(g);
        }
    }
    uniques
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{tests::chain, Element};

    #[test]
    fn first_occurrence_wins() {
        let oh = chain(&[Element::O, Element::H]);
        let ho = chain(&[Element::H, Element::O]);
        let nn = chain(&[Element::N, Element::N]);

        let uniques = unique_graphs([oh.clone(), nn.clone(), ho, nn.clone()]);
        assert_eq!(uniques.len(), 2);
        assert_eq!(uniques[0], oh);
        assert_eq!(uniques[1], nn);
    }

    #[test]
    fn empty_input() {
        let uniques = unique_graphs(Vec::<crate::molecule::Molecule>::new());
        assert!(uniques.is_empty());
    }
}
