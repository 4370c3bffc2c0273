// =============================================================================
// VALIDATE — Contrôle de complétude d'un ensemble d'étapes
// =============================================================================
//
// Le contrat : AUCUN champ n'est perdu silencieusement.
//
// Pour un sens donné (from → to) :
//   - chaque champ présent SEULEMENT sur `from` doit apparaître comme membre
//     SOURCE d'au moins une étape (quitte à être explicitement ignoré)
//   - chaque champ présent SEULEMENT sur `to` doit apparaître comme membre
//     DESTINATION d'au moins une étape
//
// Les champs communs sont l'affaire de l'inférence (automap.rs).
//
// La couverture est un ensemble DÉRIVÉ : on le recalcule à la construction,
// il n'est jamais stocké dans le Mapper.
//
// =============================================================================

use std::collections::BTreeSet;

use super::error::{MappingError, MissingCause, Result};
use super::mapping::MemberPair;
use super::schema::RecordType;

/// L'union des membres couverts par les étapes d'un sens.
///
/// `sources` sont des champs de `from`, `destinations` des champs de `to` ;
/// `pairs` garde les paires telles que déclarées, orientées from → to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    pub sources: BTreeSet<String>,
    pub destinations: BTreeSet<String>,
    pub pairs: BTreeSet<MemberPair>,
}

impl Coverage {
    pub fn new() -> Self {
        Coverage::default()
    }

    /// Ajoute des paires exprimées dans le sens from → to
    pub fn extend(&mut self, pairs: impl IntoIterator<Item = MemberPair>) -> &mut Self {
        for (source, destination) in pairs {
            self.sources.insert(source.clone());
            self.destinations.insert(destination.clone());
            self.pairs.insert((source, destination));
        }
        self
    }

    /// Ajoute des paires exprimées dans le sens to → from (étapes retour)
    pub fn extend_reversed(&mut self, pairs: impl IntoIterator<Item = MemberPair>) -> &mut Self {
        for (destination, source) in pairs {
            self.sources.insert(source.clone());
            self.destinations.insert(destination.clone());
            self.pairs.insert((source, destination));
        }
        self
    }

    /// Une même étape relie exactement `source` à `destination`
    pub fn covers_pair(&self, source: &str, destination: &str) -> bool {
        self.pairs.contains(&(source.to_string(), destination.to_string()))
    }
}

/// Les noms de `required` absents de `covered`
pub fn uncovered(required: &BTreeSet<String>, covered: &BTreeSet<String>) -> BTreeSet<String> {
    required.difference(covered).cloned().collect()
}

/// Vérifie qu'un sens couvre tous les champs présents d'un seul côté.
///
/// `source_only` : champs de `from` absents de `to` ;
/// `destination_only` : champs de `to` absents de `from`.
pub fn check_coverage(
    from: &RecordType,
    to: &RecordType,
    coverage: &Coverage,
    source_only: &BTreeSet<String>,
    destination_only: &BTreeSet<String>,
) -> Result<()> {
    let missing = uncovered(source_only, &coverage.sources);
    if !missing.is_empty() {
        return Err(MappingError::MissingMapping {
            from: from.name().to_string(),
            to: to.name().to_string(),
            members: missing,
            cause: MissingCause::Uncovered {
                owner: from.name().to_string(),
            },
        });
    }

    let missing = uncovered(destination_only, &coverage.destinations);
    if !missing.is_empty() {
        return Err(MappingError::MissingMapping {
            from: from.name().to_string(),
            to: to.name().to_string(),
            members: missing,
            cause: MissingCause::Uncovered {
                owner: to.name().to_string(),
            },
        });
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Describe;

    crate::record! {
        struct Src {
            x: i64,
            y: i64,
        }
    }

    crate::record! {
        struct Dst {
            x: i64,
            z: i64,
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn pair(a: &str, b: &str) -> MemberPair {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_full_coverage() {
        let mut coverage = Coverage::new();
        coverage.extend([pair("y", "z")]);
        assert!(coverage.covers_pair("y", "z"));
        let (src, dst) = (Src::describe(), Dst::describe());
        check_coverage(&src, &dst, &coverage, &set(&["y"]), &set(&["z"])).unwrap();
    }

    #[test]
    fn test_uncovered_source() {
        let err = check_coverage(
            &Src::describe(),
            &Dst::describe(),
            &Coverage::new(),
            &set(&["y"]),
            &set(&[]),
        )
        .unwrap_err();
        match err {
            MappingError::MissingMapping { members, cause, .. } => {
                assert_eq!(members, set(&["y"]));
                assert_eq!(cause, MissingCause::Uncovered { owner: "Src".into() });
            }
            other => panic!("erreur inattendue : {}", other),
        }
    }

    #[test]
    fn test_uncovered_destination_names_destination_type() {
        let mut coverage = Coverage::new();
        coverage.extend([pair("y", "x")]);
        let (src, dst) = (Src::describe(), Dst::describe());
        let err = check_coverage(&src, &dst, &coverage, &set(&["y"]), &set(&["z"])).unwrap_err();
        match err {
            MappingError::MissingMapping { members, cause, .. } => {
                assert_eq!(members, set(&["z"]));
                assert_eq!(cause, MissingCause::Uncovered { owner: "Dst".into() });
            }
            other => panic!("erreur inattendue : {}", other),
        }
    }

    #[test]
    fn test_reversed_pairs() {
        let mut coverage = Coverage::new();
        coverage.extend_reversed([pair("z", "y")]);
        assert_eq!(coverage.sources, set(&["y"]));
        assert_eq!(coverage.destinations, set(&["z"]));
        assert!(coverage.covers_pair("y", "z"));
        assert!(!coverage.covers_pair("z", "y"));
    }

    #[test]
    fn test_pair_needs_a_single_step() {
        // x est source d'une étape et destination d'une autre : (x, x) n'est pas couvert
        let mut coverage = Coverage::new();
        coverage.extend([pair("x", "q"), pair("p", "x")]);
        assert!(coverage.sources.contains("x"));
        assert!(coverage.destinations.contains("x"));
        assert!(!coverage.covers_pair("x", "x"));
        assert!(coverage.covers_pair("p", "x"));
    }
}
