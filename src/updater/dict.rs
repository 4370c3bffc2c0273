// =============================================================================
// UPDATERS DICT — Quand l'un des côtés est un dictionnaire générique
// =============================================================================
//
// La destination dict est créée VIDE mais étiquetée par le type cible :
// seuls les champs effectivement écrits par les étapes y apparaissent.
//
// =============================================================================

use crate::core::error::Result;
use crate::core::instance::{Dict, Instance, Object};
use crate::core::schema::RecordType;
use crate::core::typeside::Value;

use super::{read_dict, read_object, write_dict, write_object, Updater};

// ─── Objet → Dict ────────────────────────────────────────────────────────────

/// Lecture typée, écriture dans un dict (matérialisation "lâche").
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectDictUpdater;

impl Updater for ObjectDictUpdater {
    fn name(&self) -> &'static str {
        "object_dict"
    }

    fn create_destination(&self, ty: &RecordType) -> Instance {
        Instance::Dict(Dict::typed(*ty))
    }

    fn get_source_attr(&self, source: &Instance, name: &str) -> Result<Value> {
        read_object(self.name(), source, name)
    }

    fn set_destination_attr(
        &self,
        destination: &mut Instance,
        name: &str,
        value: Value,
    ) -> Result<()> {
        write_dict(self.name(), destination, name, value)
    }
}

// ─── Dict → Objet ────────────────────────────────────────────────────────────

/// Le miroir d'ObjectDictUpdater : relit un dict vers un objet typé.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictObjectUpdater;

impl Updater for DictObjectUpdater {
    fn name(&self) -> &'static str {
        "dict_object"
    }

    fn create_destination(&self, ty: &RecordType) -> Instance {
        Instance::Object(Object::from_box(ty.instantiate()))
    }

    fn get_source_attr(&self, source: &Instance, name: &str) -> Result<Value> {
        read_dict(self.name(), source, name)
    }

    fn set_destination_attr(
        &self,
        destination: &mut Instance,
        name: &str,
        value: Value,
    ) -> Result<()> {
        write_object(self.name(), destination, name, value)
    }
}

// ─── Dict → Dict ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct DictDictUpdater;

impl Updater for DictDictUpdater {
    fn name(&self) -> &'static str {
        "dict_dict"
    }

    fn create_destination(&self, ty: &RecordType) -> Instance {
        Instance::Dict(Dict::typed(*ty))
    }

    fn get_source_attr(&self, source: &Instance, name: &str) -> Result<Value> {
        read_dict(self.name(), source, name)
    }

    fn set_destination_attr(
        &self,
        destination: &mut Instance,
        name: &str,
        value: Value,
    ) -> Result<()> {
        write_dict(self.name(), destination, name, value)
    }
}
