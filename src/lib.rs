// =============================================================================
// AUTOMAP — Mapping déclaratif entre enregistrements, en Rust
// =============================================================================
//
// Automap copie des données d'un type d'enregistrement vers un autre
// (objet → objet, objet → dict, dict → objet) à partir d'une description
// déclarative : on nomme seulement ce qui diffère, les champs identiques
// sont inférés, et aucun champ ne peut être oublié en silence.
//
// Architecture :
//   core/     → Le moteur : étapes, compilation, inférence, registre
//   updater/  → Les stratégies d'accès aux champs (objet ou dict)
//   config    → Configuration YAML du Mapper
//   cli       → Arguments du binaire de démonstration
//
// Concepts fondamentaux :
//   Étape    = une règle déclarative entre champs (Rename, BiMorph...)
//   Map      = les étapes d'une paire de types, compilées dans les deux sens
//   Updater  = comment lire la source et écrire la destination
//   Mapper   = le registre (from, to) → instructions
//
// =============================================================================

pub mod core;
pub mod updater;
pub mod config;
pub mod cli;

pub use crate::config::MapperConfig;
pub use crate::core::automap::{AutoMap, LambdaMatch, TypePattern};
pub use crate::core::error::{MappingError, MissingCause, Result};
pub use crate::core::instance::{Dict, Instance, Object};
pub use crate::core::mapper::Mapper;
pub use crate::core::mapping::{
    BiMorph, Ignore, MappingStep, Morph, NaturalCopy, NaturalCopyWithFilter, Rename,
    ReverseMappingStep, SubListMapping, SubMapping,
};
pub use crate::core::partial::{CompiledMap, MappingBuilder, PartialMap};
pub use crate::core::schema::{Describe, Record, RecordType};
pub use crate::core::typeside::{Field, FieldType, Value};
pub use crate::updater::{
    DictDictUpdater, DictObjectUpdater, ObjectDictUpdater, ObjectUpdater, Updater, UpdaterKind,
};
