// =============================================================================
// UPDATER OBJET — Objet typé vers objet typé
// =============================================================================

use crate::core::error::Result;
use crate::core::instance::{Instance, Object};
use crate::core::schema::RecordType;
use crate::core::typeside::Value;

use super::{read_object, write_object, Updater};

/// Lecture et écriture typées des deux côtés.
///
/// C'est la stratégie par défaut du Mapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectUpdater;

impl Updater for ObjectUpdater {
    fn name(&self) -> &'static str {
        "object"
    }

    fn create_destination(&self, ty: &RecordType) -> Instance {
        Instance::Object(Object::from_box(ty.instantiate()))
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
        write_object(self.name(), destination, name, value)
    }
}
