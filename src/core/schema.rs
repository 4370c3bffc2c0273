// =============================================================================
// SCHEMA — Les types d'enregistrement et leur introspection
// =============================================================================
//
// Un "type d'enregistrement" est une structure à champs nommés et typés.
// Le moteur a besoin de trois choses à son sujet :
//
//   1. L'IDENTITÉ du type (pour indexer les maps par paire (from, to))
//   2. La LISTE ORDONNÉE de ses champs déclarés, avec leur type
//      (c'est ce que l'AutoMap inspecte pour inférer les copies triviales)
//   3. Un CONSTRUCTEUR par défaut (la destination part toujours d'une
//      instance vierge, tous champs à leur valeur par défaut)
//
// Rust n'a pas de réflexion à l'exécution : la macro `record!` génère ce
// descripteur (RecordType) et l'accès dynamique aux champs (trait Record).
//
// EXEMPLE :
//
// ```ignore
// record! {
//     pub struct Person {
//         pub name: String,
//         pub age: i64,
//     }
// }
//
// let ty = Person::describe();
// assert_eq!(ty.field_names(), vec!["name", "age"]);
// ```
//
// =============================================================================

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

use super::error::Result;
use super::typeside::{FieldType, Value};

/// Un champ déclaré : son nom et son type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        FieldDescriptor { name, ty }
    }
}

/// Descripteur d'un type d'enregistrement.
///
/// Les champs sont calculés à la demande : un type récursif
/// (un arbre dont les nœuds contiennent des nœuds) se décrit donc
/// sans boucler.
#[derive(Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    id: TypeId,
    fields: fn() -> Vec<FieldDescriptor>,
    construct: fn() -> Box<dyn Record>,
}

fn construct<T: Record + Default>() -> Box<dyn Record> {
    Box::new(T::default())
}

impl RecordType {
    pub fn new<T: Record + Default>(
        name: &'static str,
        fields: fn() -> Vec<FieldDescriptor>,
    ) -> Self {
        RecordType {
            name,
            id: TypeId::of::<T>(),
            fields,
            construct: construct::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Les champs déclarés, dans l'ordre de déclaration
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        (self.fields)()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields().into_iter().map(|f| f.name).collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields().iter().any(|f| f.name == name)
    }

    /// Une instance neuve, tous champs à leur valeur par défaut
    pub fn instantiate(&self) -> Box<dyn Record> {
        (self.construct)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordType({})", self.name)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "record {} {{", self.name)?;
        for field in self.fields() {
            writeln!(f, "    {} : {}", field.name, field.ty)?;
        }
        write!(f, "}}")
    }
}

/// Un enregistrement typé, manipulable champ par champ via des Value.
///
/// Normalement implémenté par la macro `record!`.
pub trait Record: Any + Send + Sync + fmt::Debug {
    fn record_type(&self) -> RecordType;

    fn get_field(&self, name: &str) -> Result<Value>;

    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    fn clone_record(&self) -> Box<dyn Record>;

    fn eq_record(&self, other: &dyn Record) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Accès statique au descripteur d'un type d'enregistrement.
pub trait Describe: Record + Default + Clone {
    fn describe() -> RecordType;
}

/// Inspecteur de membres : type → (nom de champ → type déclaré), ordonné.
pub type MemberInspector = Arc<dyn Fn(&RecordType) -> IndexMap<String, FieldType> + Send + Sync>;

/// L'inspecteur par défaut : exactement les champs déclarés du type.
pub fn declared_members(ty: &RecordType) -> IndexMap<String, FieldType> {
    ty.fields()
        .into_iter()
        .map(|f| (f.name.to_string(), f.ty))
        .collect()
}

pub fn default_inspector() -> MemberInspector {
    Arc::new(declared_members)
}

/// Déclare un type d'enregistrement.
///
/// Génère la structure (avec `Debug, Clone, Default, PartialEq`), puis
/// les implémentations de `Record`, `Describe` et `Field` : le type peut
/// ainsi être mappé, inspecté, et servir de champ d'un autre enregistrement.
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $fty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field : $fty ),*
        }

        impl $crate::core::schema::Record for $name {
            fn record_type(&self) -> $crate::core::schema::RecordType {
                <$name as $crate::core::schema::Describe>::describe()
            }

            fn get_field(
                &self,
                name: &str,
            ) -> $crate::core::error::Result<$crate::core::typeside::Value> {
                match name {
                    $( stringify!($field) => {
                        Ok($crate::core::typeside::Field::to_value(&self.$field))
                    } )*
                    _ => Err($crate::core::error::MappingError::UnknownField {
                        record: stringify!($name).to_string(),
                        field: name.to_string(),
                    }),
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: $crate::core::typeside::Value,
            ) -> $crate::core::error::Result<()> {
                match name {
                    $( stringify!($field) => {
                        self.$field =
                            <$fty as $crate::core::typeside::Field>::from_value(name, value)?;
                        Ok(())
                    } )*
                    _ => Err($crate::core::error::MappingError::UnknownField {
                        record: stringify!($name).to_string(),
                        field: name.to_string(),
                    }),
                }
            }

            fn clone_record(&self) -> ::std::boxed::Box<dyn $crate::core::schema::Record> {
                ::std::boxed::Box::new(self.clone())
            }

            fn eq_record(&self, other: &dyn $crate::core::schema::Record) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$name>()
                    .is_some_and(|other| other == self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::core::schema::Describe for $name {
            fn describe() -> $crate::core::schema::RecordType {
                $crate::core::schema::RecordType::new::<$name>(stringify!($name), || {
                    vec![
                        $( $crate::core::schema::FieldDescriptor::new(
                            stringify!($field),
                            <$fty as $crate::core::typeside::Field>::field_type(),
                        ), )*
                    ]
                })
            }
        }

        impl $crate::core::typeside::Field for $name {
            fn field_type() -> $crate::core::typeside::FieldType {
                $crate::core::typeside::FieldType::Record(
                    <$name as $crate::core::schema::Describe>::describe(),
                )
            }

            fn to_value(&self) -> $crate::core::typeside::Value {
                $crate::core::typeside::Value::Object(
                    $crate::core::instance::Object::new(self.clone()),
                )
            }

            fn from_value(
                field: &str,
                value: $crate::core::typeside::Value,
            ) -> $crate::core::error::Result<Self> {
                match value {
                    $crate::core::typeside::Value::Object(obj) => obj
                        .downcast::<$name>()
                        .map_err(|obj| $crate::core::error::MappingError::InvalidValue {
                            field: field.to_string(),
                            expected: stringify!($name).to_string(),
                            found: obj.record_type().name().to_string(),
                        }),
                    $crate::core::typeside::Value::Dict(dict) => dict.materialize::<$name>(),
                    other => Err($crate::core::error::MappingError::InvalidValue {
                        field: field.to_string(),
                        expected: stringify!($name).to_string(),
                        found: other.kind().to_string(),
                    }),
                }
            }
        }
    };
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::MappingError;
    use crate::core::typeside::Field;

    crate::record! {
        struct Department {
            label: String,
        }
    }

    crate::record! {
        struct Employee {
            name: String,
            age: i64,
            nickname: Option<String>,
            department: Option<Department>,
        }
    }

    crate::record! {
        struct TreeNode {
            label: String,
            children: Vec<TreeNode>,
        }
    }

    #[test]
    fn test_declared_members_keep_order() {
        let members = declared_members(&Employee::describe());
        let names: Vec<_> = members.keys().cloned().collect();
        assert_eq!(names, vec!["name", "age", "nickname", "department"]);
        assert_eq!(members["age"], FieldType::Integer);
        assert_eq!(
            members["department"],
            FieldType::Optional(Box::new(FieldType::Record(Department::describe())))
        );
    }

    #[test]
    fn test_record_type_identity() {
        assert_eq!(Employee::describe(), Employee::default().record_type());
        assert_ne!(Employee::describe(), Department::describe());
        assert_eq!(Employee::describe().name(), "Employee");
    }

    #[test]
    fn test_recursive_type_describes_lazily() {
        let ty = TreeNode::describe();
        assert_eq!(
            ty.fields()[1].ty,
            FieldType::List(Box::new(FieldType::Record(TreeNode::describe())))
        );
        assert_eq!(ty.fields()[1].ty.list_record(), Some(&ty));
    }

    #[test]
    fn test_get_and_set_field() {
        let mut e = Employee::default();
        e.set_field("name", Value::String("Alice".into())).unwrap();
        e.set_field("age", Value::Integer(30)).unwrap();
        assert_eq!(e.get_field("name").unwrap(), Value::String("Alice".into()));
        assert_eq!(e.age, 30);
        assert_eq!(e.get_field("nickname").unwrap(), Value::Null);
    }

    #[test]
    fn test_unknown_field() {
        let e = Employee::default();
        assert!(matches!(
            e.get_field("salary"),
            Err(MappingError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_nested_record_field() {
        let mut e = Employee::default();
        let dept = Department { label: "R&D".into() };
        e.set_field("department", dept.to_value()).unwrap();
        assert_eq!(e.department, Some(dept));
    }

    #[test]
    fn test_instantiate_is_default() {
        let boxed = Employee::describe().instantiate();
        assert!(boxed.eq_record(&Employee::default()));
    }

    #[test]
    fn test_record_type_display() {
        let display = format!("{}", Employee::describe());
        assert!(display.contains("record Employee"));
        assert!(display.contains("age : Int"));
        assert!(display.contains("department : Option<Department>"));
    }
}
