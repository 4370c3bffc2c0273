// =============================================================================
// TYPESIDE — Les types déclarés des champs et les valeurs dynamiques
// =============================================================================
//
// Un mapping lit un champ d'un côté et l'écrit de l'autre, sans connaître
// statiquement le type des deux enregistrements. Il faut donc :
//
//   - un TYPE DÉCLARÉ par champ (FieldType) : c'est lui que l'AutoMap compare
//     pour décider qu'une copie naturelle suffit ("même nom, même type")
//   - une VALEUR DYNAMIQUE (Value) qui transite entre l'updater de lecture
//     et l'updater d'écriture
//   - une CONVERSION entre les types Rust des champs et Value (trait Field)
//
// ANALOGIE : FieldType est la colonne d'une table, Value est le contenu
// d'une cellule, Field est le "driver" qui sait lire/écrire la cellule.
//
// =============================================================================

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::error::{MappingError, Result};
use super::instance::{Dict, Object};
use super::schema::RecordType;

/// Le type déclaré d'un champ d'enregistrement.
///
/// Deux champs de même nom sont "compatibles" pour l'inférence automatique
/// si et seulement si leurs FieldType sont égaux.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    /// Champ optionnel (Option<T>)
    Optional(Box<FieldType>),
    /// Séquence homogène (Vec<T>)
    List(Box<FieldType>),
    /// Sous-enregistrement typé
    Record(RecordType),
    /// Type opaque nommé par l'utilisateur
    Custom(String),
}

impl FieldType {
    /// Le type d'enregistrement porté par ce champ, à travers Option et Vec
    pub fn record(&self) -> Option<&RecordType> {
        match self {
            FieldType::Record(ty) => Some(ty),
            FieldType::Optional(inner) => inner.record(),
            _ => None,
        }
    }

    /// Le type d'enregistrement des éléments d'une liste
    pub fn list_record(&self) -> Option<&RecordType> {
        match self {
            FieldType::List(inner) => inner.record(),
            FieldType::Optional(inner) => inner.list_record(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Integer => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Boolean => write!(f, "Bool"),
            FieldType::Optional(inner) => write!(f, "Option<{}>", inner),
            FieldType::List(inner) => write!(f, "List<{}>", inner),
            FieldType::Record(ty) => write!(f, "{}", ty.name()),
            FieldType::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Une valeur de champ, indépendante de la représentation.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// Sous-enregistrement typé
    Object(Object),
    /// Sous-enregistrement générique (clé → valeur)
    Dict(Dict),
}

impl Value {
    /// Nom court de la variante (pour les messages d'erreur)
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Bool",
            Value::Integer(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Object(_) => "Object",
            Value::Dict(_) => "Dict",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Construit une valeur générique à partir de JSON.
    /// Les objets JSON deviennent des Dict non typés.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Dict(Dict::from_json(map)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(obj) => write!(f, "{:?}", obj),
            Value::Dict(dict) => write!(f, "{}", dict),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(fl) => serializer.serialize_f64(*fl),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(obj) => obj.serialize(serializer),
            Value::Dict(dict) => dict.serialize(serializer),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(fl: f64) -> Self {
        Value::Float(fl)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Conversion entre un type Rust de champ et une Value.
///
/// Implémenté pour les scalaires, Option, Vec, et pour chaque
/// enregistrement déclaré avec `record!`.
pub trait Field: Sized {
    fn field_type() -> FieldType;

    fn to_value(&self) -> Value;

    /// `field` ne sert qu'aux messages d'erreur
    fn from_value(field: &str, value: Value) -> Result<Self>;
}

pub(crate) fn invalid(field: &str, expected: impl fmt::Display, found: &Value) -> MappingError {
    MappingError::InvalidValue {
        field: field.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

impl Field for String {
    fn field_type() -> FieldType {
        FieldType::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(invalid(field, FieldType::String, &other)),
        }
    }
}

impl Field for i64 {
    fn field_type() -> FieldType {
        FieldType::Integer
    }

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(invalid(field, FieldType::Integer, &other)),
        }
    }
}

impl Field for i32 {
    fn field_type() -> FieldType {
        FieldType::Integer
    }

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => i32::try_from(i).map_err(|_| MappingError::InvalidValue {
                field: field.to_string(),
                expected: "i32".into(),
                found: format!("Int({})", i),
            }),
            other => Err(invalid(field, FieldType::Integer, &other)),
        }
    }
}

impl Field for f64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Float(fl) => Ok(fl),
            // JSON ne distingue pas 1 de 1.0
            Value::Integer(i) => Ok(i as f64),
            other => Err(invalid(field, FieldType::Float, &other)),
        }
    }
}

impl Field for bool {
    fn field_type() -> FieldType {
        FieldType::Boolean
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(invalid(field, FieldType::Boolean, &other)),
        }
    }
}

impl<T: Field> Field for Option<T> {
    fn field_type() -> FieldType {
        FieldType::Optional(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(field, other).map(Some),
        }
    }
}

impl<T: Field> Field for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::List(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Field::to_value).collect())
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| T::from_value(field, item))
                .collect(),
            // un champ non renseigné côté source reste une liste vide
            Value::Null => Ok(Vec::new()),
            other => Err(invalid(field, Self::field_type(), &other)),
        }
    }
}
