// =============================================================================
// MAPPING — Les étapes de mapping (les briques déclaratives)
// =============================================================================
//
// Une ÉTAPE décrit comment un ou plusieurs champs passent d'un type
// d'enregistrement à l'autre. Chaque étape déclare :
//
//   - les paires (champ source, champ destination) qu'elle COUVRE
//     (c'est l'unité de comptabilité du contrôle de complétude)
//   - son application ALLER (map_forward)
//   - et, si elle est réversible, son application RETOUR (map_backward)
//
// Les étapes :
//
//   Rename(a, b)               a → b            | b → a
//   BiMorph(a, b, f, g)        f(a) → b         | g(b) → a
//   NaturalCopy([n...])        n → n            | n → n
//   NaturalCopy::all_fields    tous les champs d'un type, copiés à l'identique
//   NaturalCopyWithFilter      copie, sauf valeurs filtrées (aller seulement)
//   SubMapping                 sous-objet mappé récursivement via le Mapper
//   SubListMapping             liste de sous-objets, idem élément par élément
//   Morph(b, producteur)       valeur calculée → b (aller seulement, ne couvre rien)
//   Ignore(a, b)               rien (aller seulement)
//
// Une étape est immuable : construite une fois, lue à la compilation,
// elle ne garde aucune référence vers une instance mappée.
//
// =============================================================================

use std::sync::Arc;

use super::error::Result;
use super::instance::Instance;
use super::mapper::Mapper;
use super::schema::{Describe, RecordType};
use super::typeside::Value;
use crate::updater::Updater;

/// (champ source, champ destination)
pub type MemberPair = (String, String);

/// Transformation de valeur d'une BiMorph
pub type ValueFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Producteur de valeur d'un Morph
pub type ValueProducer = Arc<dyn Fn(&Instance, &dyn Updater) -> Result<Value> + Send + Sync>;

/// Une étape applicable dans un seul sens.
pub trait MappingStep: Send + Sync {
    /// Les paires de champs dont cette étape répond
    fn supported_members(&self) -> Vec<MemberPair>;

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<()>;
}

/// Une étape applicable dans les deux sens.
pub trait ReverseMappingStep: MappingStep {
    fn map_backward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<()>;
}

fn copy(
    source: &Instance,
    destination: &mut Instance,
    updater: &dyn Updater,
    from: &str,
    to: &str,
) -> Result<()> {
    let value = updater.get_source_attr(source, from)?;
    updater.set_destination_attr(destination, to, value)
}

// ─── Rename ──────────────────────────────────────────────────────────────────

/// Même valeur, nom différent.
#[derive(Debug, Clone)]
pub struct Rename {
    from: String,
    to: String,
}

impl Rename {
    pub fn new(from: &str, to: &str) -> Self {
        Rename {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl MappingStep for Rename {
    fn supported_members(&self) -> Vec<MemberPair> {
        vec![(self.from.clone(), self.to.clone())]
    }

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        copy(source, destination, updater, &self.from, &self.to)
    }
}

impl ReverseMappingStep for Rename {
    fn map_backward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        copy(source, destination, updater, &self.to, &self.from)
    }
}

// ─── BiMorph ─────────────────────────────────────────────────────────────────

/// Transformation bidirectionnelle : `forward` à l'aller, `backward` au retour.
///
/// Rien ne vérifie que `backward` est l'inverse de `forward` ; l'aller-retour
/// n'est garanti que si l'appelant fournit une vraie bijection.
#[derive(Clone)]
pub struct BiMorph {
    from: String,
    to: String,
    forward: ValueFn,
    backward: ValueFn,
}

impl BiMorph {
    pub fn new(
        from: &str,
        to: &str,
        forward: impl Fn(Value) -> Value + Send + Sync + 'static,
        backward: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        BiMorph {
            from: from.to_string(),
            to: to.to_string(),
            forward: Arc::new(forward),
            backward: Arc::new(backward),
        }
    }
}

impl MappingStep for BiMorph {
    fn supported_members(&self) -> Vec<MemberPair> {
        vec![(self.from.clone(), self.to.clone())]
    }

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        let value = updater.get_source_attr(source, &self.from)?;
        updater.set_destination_attr(destination, &self.to, (self.forward)(value))
    }
}

impl ReverseMappingStep for BiMorph {
    fn map_backward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        let value = updater.get_source_attr(source, &self.to)?;
        updater.set_destination_attr(destination, &self.from, (self.backward)(value))
    }
}

// ─── NaturalCopy ─────────────────────────────────────────────────────────────

/// Copie à l'identique de champs de même nom. Son propre inverse.
#[derive(Debug, Clone)]
pub struct NaturalCopy {
    members: Vec<String>,
}

impl NaturalCopy {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NaturalCopy {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Tous les champs déclarés du type
    pub fn all_fields(ty: &RecordType) -> Self {
        NaturalCopy::new(ty.field_names())
    }

    pub fn all_fields_of<T: Describe>() -> Self {
        NaturalCopy::all_fields(&T::describe())
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }
}

impl MappingStep for NaturalCopy {
    fn supported_members(&self) -> Vec<MemberPair> {
        self.members
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect()
    }

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        for name in &self.members {
            copy(source, destination, updater, name, name)?;
        }
        Ok(())
    }
}

impl ReverseMappingStep for NaturalCopy {
    fn map_backward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<()> {
        self.map_forward(source, destination, updater, mapper)
    }
}

// ─── NaturalCopyWithFilter ───────────────────────────────────────────────────

/// Copie naturelle de tous les champs d'un type, en sautant l'écriture
/// quand `should_ignore(valeur)` est vrai. Aller seulement.
///
/// Typiquement : appliquer un "patch" partiel sans écraser par des Null.
#[derive(Clone)]
pub struct NaturalCopyWithFilter {
    members: Vec<String>,
    should_ignore: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl NaturalCopyWithFilter {
    pub fn new(
        ty: &RecordType,
        should_ignore: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        NaturalCopyWithFilter {
            members: ty.field_names().into_iter().map(String::from).collect(),
            should_ignore: Arc::new(should_ignore),
        }
    }

    pub fn skip_nulls(ty: &RecordType) -> Self {
        NaturalCopyWithFilter::new(ty, Value::is_null)
    }
}

impl MappingStep for NaturalCopyWithFilter {
    fn supported_members(&self) -> Vec<MemberPair> {
        self.members
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect()
    }

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        for name in &self.members {
            let value = updater.get_source_attr(source, name)?;
            if (self.should_ignore)(&value) {
                continue;
            }
            updater.set_destination_attr(destination, name, value)?;
        }
        Ok(())
    }
}

// ─── SubMapping / SubListMapping ─────────────────────────────────────────────

/// Les deux côtés d'un champ imbriqué, communs aux deux étapes récursives.
#[derive(Clone)]
struct Nested {
    from: String,
    source_type: RecordType,
    to: String,
    destination_type: RecordType,
    updater: Option<Arc<dyn Updater>>,
}

impl Nested {
    fn members(&self) -> Vec<MemberPair> {
        vec![(self.from.clone(), self.to.clone())]
    }

    /// Mappe une valeur imbriquée ; Null reste Null
    fn map_value(
        &self,
        value: Value,
        field: &str,
        from: &RecordType,
        to: &RecordType,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let nested_updater: &dyn Updater = match &self.updater {
            Some(pinned) => pinned.as_ref(),
            None => updater,
        };
        let instance = Instance::from_value(field, value)?;
        let mapped = mapper.map_as(&instance, from, to, nested_updater)?;
        Ok(mapped.into_value())
    }
}

/// Sous-objet : le champ est lui-même mappé par le Mapper.
///
/// Par défaut l'appel imbriqué réutilise l'updater de l'appel englobant ;
/// `with_updater` en fixe un autre.
#[derive(Clone)]
pub struct SubMapping(Nested);

impl SubMapping {
    pub fn new(
        from: &str,
        source_type: RecordType,
        to: &str,
        destination_type: RecordType,
    ) -> Self {
        SubMapping(Nested {
            from: from.to_string(),
            source_type,
            to: to.to_string(),
            destination_type,
            updater: None,
        })
    }

    pub fn with_updater(mut self, updater: Arc<dyn Updater>) -> Self {
        self.0.updater = Some(updater);
        self
    }
}

impl MappingStep for SubMapping {
    fn supported_members(&self) -> Vec<MemberPair> {
        self.0.members()
    }

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<()> {
        let n = &self.0;
        let value = updater.get_source_attr(source, &n.from)?;
        let mapped = n.map_value(
            value,
            &n.from,
            &n.source_type,
            &n.destination_type,
            updater,
            mapper,
        )?;
        updater.set_destination_attr(destination, &n.to, mapped)
    }
}

impl ReverseMappingStep for SubMapping {
    fn map_backward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<()> {
        let n = &self.0;
        let value = updater.get_source_attr(source, &n.to)?;
        let mapped = n.map_value(
            value,
            &n.to,
            &n.destination_type,
            &n.source_type,
            updater,
            mapper,
        )?;
        updater.set_destination_attr(destination, &n.from, mapped)
    }
}

/// Liste de sous-objets, mappés un par un.
#[derive(Clone)]
pub struct SubListMapping(Nested);

impl SubListMapping {
    pub fn new(
        from: &str,
        source_type: RecordType,
        to: &str,
        destination_type: RecordType,
    ) -> Self {
        SubListMapping(Nested {
            from: from.to_string(),
            source_type,
            to: to.to_string(),
            destination_type,
            updater: None,
        })
    }

    pub fn with_updater(mut self, updater: Arc<dyn Updater>) -> Self {
        self.0.updater = Some(updater);
        self
    }

    fn map_list(
        &self,
        value: Value,
        field: &str,
        from: &RecordType,
        to: &RecordType,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::List(items) => items
                .into_iter()
                .map(|item| self.0.map_value(item, field, from, to, updater, mapper))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(super::typeside::invalid(field, "List", &other)),
        }
    }
}

impl MappingStep for SubListMapping {
    fn supported_members(&self) -> Vec<MemberPair> {
        self.0.members()
    }

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<()> {
        let n = &self.0;
        let value = updater.get_source_attr(source, &n.from)?;
        let mapped = self.map_list(
            value,
            &n.from,
            &n.source_type,
            &n.destination_type,
            updater,
            mapper,
        )?;
        updater.set_destination_attr(destination, &n.to, mapped)
    }
}

impl ReverseMappingStep for SubListMapping {
    fn map_backward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        mapper: &Mapper,
    ) -> Result<()> {
        let n = &self.0;
        let value = updater.get_source_attr(source, &n.to)?;
        let mapped = self.map_list(
            value,
            &n.to,
            &n.destination_type,
            &n.source_type,
            updater,
            mapper,
        )?;
        updater.set_destination_attr(destination, &n.from, mapped)
    }
}

// ─── Morph ───────────────────────────────────────────────────────────────────

/// Champ calculé à partir de la source entière. Aller seulement.
///
/// Ne couvre AUCUNE paire : l'appelant prend la responsabilité du champ,
/// le contrôle de complétude ne le voit pas.
#[derive(Clone)]
pub struct Morph {
    to: String,
    producer: ValueProducer,
}

impl Morph {
    pub fn new(
        to: &str,
        producer: impl Fn(&Instance, &dyn Updater) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Morph {
            to: to.to_string(),
            producer: Arc::new(producer),
        }
    }
}

impl MappingStep for Morph {
    fn supported_members(&self) -> Vec<MemberPair> {
        Vec::new()
    }

    fn map_forward(
        &self,
        source: &Instance,
        destination: &mut Instance,
        updater: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        let value = (self.producer)(source, updater)?;
        updater.set_destination_attr(destination, &self.to, value)
    }
}

// ─── Ignore ──────────────────────────────────────────────────────────────────

/// Déclare une paire couverte sans rien écrire. Aller seulement.
#[derive(Debug, Clone)]
pub struct Ignore {
    from: String,
    to: String,
}

impl Ignore {
    pub fn new(from: &str, to: &str) -> Self {
        Ignore {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl MappingStep for Ignore {
    fn supported_members(&self) -> Vec<MemberPair> {
        vec![(self.from.clone(), self.to.clone())]
    }

    fn map_forward(
        &self,
        _: &Instance,
        _: &mut Instance,
        _: &dyn Updater,
        _: &Mapper,
    ) -> Result<()> {
        Ok(())
    }
}
