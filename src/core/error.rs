// =============================================================================
// ERROR — Les erreurs du moteur de mapping
// =============================================================================
//
// Deux familles d'erreurs "métier" :
//   - MissingMapping   : levée à la CONSTRUCTION d'un map (jamais à l'exécution)
//   - MappingNotFound  : levée à l'EXÉCUTION quand aucune paire (from, to)
//                        n'est enregistrée dans le Mapper
//
// Et les erreurs de REPRÉSENTATION, propres aux valeurs dynamiques :
// une valeur qui ne rentre pas dans le champ typé, un champ inconnu,
// un updater qui reçoit un objet au lieu d'un dict...
//
// Aucune erreur n'est avalée : tout remonte par `?`.
//
// =============================================================================

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Pourquoi un champ n'a pas de mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingCause {
    /// Champ commun aux deux types, mais aucune règle de type ne s'applique
    NoPatternMatched { from_type: String, to_type: String },
    /// Champ présent d'un seul côté et couvert par aucune étape
    Uncovered { owner: String },
}

impl fmt::Display for MissingCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingCause::NoPatternMatched { from_type, to_type } => {
                write!(f, "aucune règle pour {} -> {}", from_type, to_type)
            }
            MissingCause::Uncovered { owner } => {
                write!(f, "membres non couverts du type {}", owner)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Mapping manquant {from} -> {to} pour {members:?} : {cause}")]
    MissingMapping {
        from: String,
        to: String,
        members: BTreeSet<String>,
        cause: MissingCause,
    },

    #[error("Aucun mapping enregistré de {from} vers {to}")]
    MappingNotFound { from: String, to: String },

    #[error("Champ '{field}' : attendu {expected}, reçu {found}")]
    InvalidValue {
        field: String,
        expected: String,
        found: String,
    },

    #[error("Le type {record} n'a pas de champ '{field}'")]
    UnknownField { record: String, field: String },

    #[error("L'updater {updater} attend une instance {expected}")]
    Representation {
        updater: &'static str,
        expected: &'static str,
    },

    #[error("Impossible de déterminer le type d'un dict non typé")]
    UntypedSource,
}

impl MappingError {
    /// Erreur levée à la construction d'un map ?
    pub fn is_missing_mapping(&self) -> bool {
        matches!(self, MappingError::MissingMapping { .. })
    }

    /// Les membres fautifs, si l'erreur en nomme
    pub fn members(&self) -> Option<&BTreeSet<String>> {
        match self {
            MappingError::MissingMapping { members, .. } => Some(members),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MappingError>;

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_mapping_display() {
        let err = MappingError::MissingMapping {
            from: "A".into(),
            to: "B".into(),
            members: BTreeSet::from(["y".to_string()]),
            cause: MissingCause::Uncovered { owner: "A".into() },
        };
        let msg = err.to_string();
        assert!(msg.contains("A -> B"));
        assert!(msg.contains("\"y\""));
        assert!(msg.contains("non couverts du type A"));
        assert!(err.is_missing_mapping());
        assert_eq!(err.members().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_not_found_is_not_missing_mapping() {
        let err = MappingError::MappingNotFound { from: "A".into(), to: "C".into() };
        assert!(!err.is_missing_mapping());
        assert!(err.members().is_none());
        assert_eq!(err.to_string(), "Aucun mapping enregistré de A vers C");
    }
}
