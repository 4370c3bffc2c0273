// =============================================================================
// UPDATER — Couche d'accès aux champs (lecture source / écriture destination)
// =============================================================================
//
// Les étapes de mapping ne lisent et n'écrivent JAMAIS un champ directement :
// elles passent par un Updater. C'est lui qui sait si la source est un objet
// typé ou un dict, et si la destination doit être un objet typé ou un dict.
//
// Grâce au trait Updater, une même liste d'instructions compilée sert à :
//   - objet → objet  (ObjectUpdater)
//   - objet → dict   (ObjectDictUpdater, pour sérialiser)
//   - dict  → objet  (DictObjectUpdater, la passe retour)
//   - dict  → dict   (DictDictUpdater)
//
// Le cœur (module core) ne connaît que le trait ; les stratégies concrètes
// vivent ici.
//
// =============================================================================

pub mod dict;
pub mod object;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{MappingError, Result};
use crate::core::instance::{Dict, Instance, Object};
use crate::core::schema::RecordType;
use crate::core::typeside::Value;

pub use dict::{DictDictUpdater, DictObjectUpdater, ObjectDictUpdater};
pub use object::ObjectUpdater;

/// Stratégie de lecture/écriture des champs.
///
/// Choisie à chaque appel de `Mapper::map_with` ; elle fixe aussi la forme
/// de la destination fraîchement construite.
pub trait Updater: Send + Sync + fmt::Debug {
    /// Nom de la stratégie (messages d'erreur, traces)
    fn name(&self) -> &'static str;

    /// Une destination vierge pour le type cible
    fn create_destination(&self, ty: &RecordType) -> Instance;

    fn get_source_attr(&self, source: &Instance, name: &str) -> Result<Value>;

    fn set_destination_attr(
        &self,
        destination: &mut Instance,
        name: &str,
        value: Value,
    ) -> Result<()>;
}

/// Les stratégies fournies, désignables par configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UpdaterKind {
    #[default]
    Object,
    ObjectDict,
    DictObject,
    DictDict,
}

static OBJECT: ObjectUpdater = ObjectUpdater;
static OBJECT_DICT: ObjectDictUpdater = ObjectDictUpdater;
static DICT_OBJECT: DictObjectUpdater = DictObjectUpdater;
static DICT_DICT: DictDictUpdater = DictDictUpdater;

impl UpdaterKind {
    pub fn updater(self) -> &'static dyn Updater {
        match self {
            UpdaterKind::Object => &OBJECT,
            UpdaterKind::ObjectDict => &OBJECT_DICT,
            UpdaterKind::DictObject => &DICT_OBJECT,
            UpdaterKind::DictDict => &DICT_DICT,
        }
    }
}

impl fmt::Display for UpdaterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.updater().name())
    }
}

// ─── Accès par représentation ────────────────────────────────────────────────

fn expect_object<'a>(updater: &'static str, instance: &'a Instance) -> Result<&'a Object> {
    instance.as_object().ok_or(MappingError::Representation {
        updater,
        expected: "objet",
    })
}

fn expect_dict<'a>(updater: &'static str, instance: &'a Instance) -> Result<&'a Dict> {
    instance.as_dict().ok_or(MappingError::Representation {
        updater,
        expected: "dict",
    })
}

pub(crate) fn read_object(updater: &'static str, source: &Instance, name: &str) -> Result<Value> {
    expect_object(updater, source)?.get(name)
}

/// Une clé absente se lit comme Null
pub(crate) fn read_dict(updater: &'static str, source: &Instance, name: &str) -> Result<Value> {
    Ok(expect_dict(updater, source)?
        .get(name)
        .cloned()
        .unwrap_or(Value::Null))
}

pub(crate) fn write_object(
    updater: &'static str,
    destination: &mut Instance,
    name: &str,
    value: Value,
) -> Result<()> {
    match destination {
        Instance::Object(obj) => obj.set(name, value),
        Instance::Dict(_) => Err(MappingError::Representation {
            updater,
            expected: "objet",
        }),
    }
}

pub(crate) fn write_dict(
    updater: &'static str,
    destination: &mut Instance,
    name: &str,
    value: Value,
) -> Result<()> {
    match destination {
        Instance::Dict(dict) => {
            dict.insert(name, value);
            Ok(())
        }
        Instance::Object(_) => Err(MappingError::Representation {
            updater,
            expected: "dict",
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(UpdaterKind::Object.updater().name(), "object");
        assert_eq!(UpdaterKind::ObjectDict.to_string(), "object_dict");
        assert_eq!(UpdaterKind::default(), UpdaterKind::Object);
    }

    #[test]
    fn test_kind_from_yaml() {
        let kind: UpdaterKind = serde_yaml::from_str("dict_object").unwrap();
        assert_eq!(kind, UpdaterKind::DictObject);
    }

    #[test]
    fn test_read_missing_dict_key_is_null() {
        let source = Instance::Dict(Dict::new());
        assert_eq!(read_dict("t", &source, "absent").unwrap(), Value::Null);
    }

    #[test]
    fn test_wrong_representation() {
        let mut destination = Instance::Dict(Dict::new());
        let err = write_object("t", &mut destination, "x", Value::Null).unwrap_err();
        assert!(matches!(err, MappingError::Representation { expected: "objet", .. }));
    }
}
