// =============================================================================
// INSTANCE — Les deux représentations d'un enregistrement
// =============================================================================
//
// Un même enregistrement peut exister sous deux formes :
//
//   - OBJET  : une instance typée (Box<dyn Record>), champs vérifiés
//   - DICT   : un dictionnaire générique nom → Value, ordonné,
//              éventuellement étiqueté par le type qu'il représente
//
// Le dict sert à matérialiser une destination "lâchement typée"
// (typiquement pour la sérialiser en JSON) au lieu d'une instance forte.
// L'étiquette de type permet de re-mapper un dict produit par A → B vers A
// sans que l'appelant ait à redire "ce dict est un B".
//
// EXEMPLE :
//
//   Objet : B { b_name: "Gabriel", number_b: 30 }
//   Dict  : {"b_name": "Gabriel", "number_b": 30}   (étiquette : B)
//
// =============================================================================

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};

use super::error::{MappingError, Result};
use super::schema::{Describe, Record, RecordType};
use super::typeside::Value;

/// Un enregistrement typé, derrière une boîte.
pub struct Object(Box<dyn Record>);

impl Object {
    pub fn new<T: Record>(record: T) -> Self {
        Object(Box::new(record))
    }

    pub fn from_box(record: Box<dyn Record>) -> Self {
        Object(record)
    }

    pub fn record_type(&self) -> RecordType {
        self.0.record_type()
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.0.get_field(name)
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.0.set_field(name, value)
    }

    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Récupère l'enregistrement concret, ou rend l'objet si le type diffère
    pub fn downcast<T: Record>(self) -> std::result::Result<T, Object> {
        if self.0.as_any().is::<T>() {
            match self.0.into_any().downcast::<T>() {
                Ok(record) => Ok(*record),
                // is::<T>() vient d'être vérifié
                Err(_) => unreachable!(),
            }
        } else {
            Err(self)
        }
    }

    /// Copie les champs vers un dict étiqueté du même type
    pub fn to_dict(&self) -> Result<Dict> {
        let ty = self.record_type();
        let mut dict = Dict::typed(ty);
        for name in ty.field_names() {
            dict.insert(name, self.get(name)?);
        }
        Ok(dict)
    }
}

impl Clone for Object {
    fn clone(&self) -> Self {
        Object(self.0.clone_record())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_record(other.0.as_ref())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let names = self.record_type().field_names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            let value = self.get(name).map_err(S::Error::custom)?;
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Un enregistrement générique : nom de champ → valeur, dans l'ordre d'insertion.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    record_type: Option<RecordType>,
    entries: IndexMap<String, Value>,
}

impl Dict {
    pub fn new() -> Self {
        Dict::default()
    }

    /// Dict vide qui représente un enregistrement du type donné
    pub fn typed(ty: RecordType) -> Self {
        Dict {
            record_type: Some(ty),
            entries: IndexMap::new(),
        }
    }

    pub fn record_type(&self) -> Option<RecordType> {
        self.record_type
    }

    pub fn with_record_type(mut self, ty: RecordType) -> Self {
        self.record_type = Some(ty);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Dict non typé construit depuis un objet JSON
    pub fn from_json(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Dict {
            record_type: None,
            entries: map
                .into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Construit un enregistrement typé à partir des entrées.
    ///
    /// Les champs absents du dict gardent leur valeur par défaut ;
    /// une clé inconnue du type est une erreur.
    pub fn materialize<T: Describe>(&self) -> Result<T> {
        let mut record = T::default();
        for (name, value) in &self.entries {
            record.set_field(name, value.clone())?;
        }
        Ok(record)
    }
}

impl PartialEq for Dict {
    // l'étiquette de type est une métadonnée : seules les entrées comptent
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl From<IndexMap<String, Value>> for Dict {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Dict {
            record_type: None,
            entries,
        }
    }
}

impl FromIterator<(String, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Dict {
            record_type: None,
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Dict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Une source ou une destination de mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    Object(Object),
    Dict(Dict),
}

impl Instance {
    pub fn object<T: Record>(record: T) -> Self {
        Instance::Object(Object::new(record))
    }

    /// Le type représenté : celui de l'objet, ou l'étiquette du dict
    pub fn record_type(&self) -> Option<RecordType> {
        match self {
            Instance::Object(obj) => Some(obj.record_type()),
            Instance::Dict(dict) => dict.record_type(),
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Instance::Object(obj) => Some(obj),
            Instance::Dict(_) => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Instance::Dict(dict) => Some(dict),
            Instance::Object(_) => None,
        }
    }

    /// Sous-enregistrement lu dans un champ → instance mappable
    pub fn from_value(field: &str, value: Value) -> Result<Instance> {
        match value {
            Value::Object(obj) => Ok(Instance::Object(obj)),
            Value::Dict(dict) => Ok(Instance::Dict(dict)),
            other => Err(MappingError::InvalidValue {
                field: field.to_string(),
                expected: "Object ou Dict".into(),
                found: other.kind().to_string(),
            }),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Instance::Object(obj) => Value::Object(obj),
            Instance::Dict(dict) => Value::Dict(dict),
        }
    }

    /// Récupère l'enregistrement typé ; un dict est matérialisé au passage
    pub fn into_record<T: Describe>(self) -> Result<T> {
        match self {
            Instance::Object(obj) => obj.downcast::<T>().map_err(|obj| MappingError::InvalidValue {
                field: String::new(),
                expected: T::describe().name().to_string(),
                found: obj.record_type().name().to_string(),
            }),
            Instance::Dict(dict) => dict.materialize::<T>(),
        }
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Instance::Object(obj) => obj.serialize(serializer),
            Instance::Dict(dict) => dict.serialize(serializer),
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instance::Object(obj) => write!(f, "{:?}", obj),
            Instance::Dict(dict) => {
                if let Some(ty) = dict.record_type() {
                    write!(f, "{} ", ty.name())?;
                }
                write!(f, "{}", dict)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    crate::record! {
        struct Point {
            x: i64,
            y: i64,
            label: Option<String>,
        }
    }

    crate::record! {
        struct Other {
            x: i64,
        }
    }

    fn point() -> Point {
        Point { x: 1, y: 2, label: Some("origine".into()) }
    }

    #[test]
    fn test_object_downcast() {
        let obj = Object::new(point());
        assert_eq!(obj.downcast_ref::<Point>(), Some(&point()));
        let obj = obj.downcast::<Other>().unwrap_err();
        assert_eq!(obj.downcast::<Point>().unwrap(), point());
    }

    #[test]
    fn test_object_equality_across_types() {
        assert_eq!(Object::new(point()), Object::new(point()));
        assert_ne!(Object::new(Other { x: 1 }), Object::new(point()));
    }

    #[test]
    fn test_object_to_dict_keeps_order() {
        let dict = Object::new(point()).to_dict().unwrap();
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["x", "y", "label"]);
        assert_eq!(dict.record_type(), Some(Point::describe()));
    }

    #[test]
    fn test_dict_materialize() {
        let mut dict = Dict::new();
        dict.insert("x", 5i64);
        dict.insert("label", "a");
        let p: Point = dict.materialize().unwrap();
        assert_eq!(p, Point { x: 5, y: 0, label: Some("a".into()) });

        dict.insert("z", 1i64);
        assert!(matches!(
            dict.materialize::<Point>(),
            Err(MappingError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_dict_equality_ignores_tag() {
        let mut a = Dict::typed(Point::describe());
        a.insert("x", 1i64);
        let mut b = Dict::new();
        b.insert("x", 1i64);
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_object_and_dict() {
        let json = serde_json::to_value(Instance::object(point())).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1, "y": 2, "label": "origine"}));

        let dict = Dict::from_json(json.as_object().cloned().unwrap());
        assert_eq!(dict.to_json().unwrap(), json);
    }

    #[test]
    fn test_instance_from_value() {
        assert!(Instance::from_value("f", Value::Integer(1)).is_err());
        let inst = Instance::from_value("f", Value::Dict(Dict::new())).unwrap();
        assert!(inst.as_dict().is_some());
        assert!(inst.record_type().is_none());
    }

    #[test]
    fn test_into_record_from_dict() {
        let inst = Instance::Dict(Object::new(point()).to_dict().unwrap());
        assert_eq!(inst.into_record::<Point>().unwrap(), point());
    }
}
