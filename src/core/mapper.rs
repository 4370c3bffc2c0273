// =============================================================================
// MAPPER — Le registre des maps compilés et le point d'entrée du mapping
// =============================================================================
//
// Le Mapper associe à chaque paire ordonnée (type source, type destination)
// UNE liste d'instructions compilée. Enregistrer un builder ajoute toujours
// les DEUX sens d'un coup.
//
// Mapper une instance :
//
//   1. Déterminer le type source (type de l'objet, ou étiquette du dict)
//   2. Chercher l'entrée (source, destination) → sinon MappingNotFound
//   3. L'updater fabrique une destination vierge
//   4. Appliquer les instructions DANS L'ORDRE
//
// Les étapes imbriquées (SubMapping, SubListMapping) rappellent le Mapper
// pour le sous-enregistrement : la récursion n'a pas de garde, un cycle
// dans les données est à la charge de l'appelant.
//
// Le registre se remplit à l'initialisation puis ne fait plus que des
// lectures : on peut le partager entre threads derrière un Arc.
//
// =============================================================================

use std::collections::HashMap;

use log::{debug, trace, warn};

use super::automap::AutoMap;
use super::error::{MappingError, Result};
use super::instance::{Dict, Instance};
use super::partial::{CompiledMap, MappingBuilder};
use super::schema::{Describe, RecordType};
use crate::config::MapperConfig;
use crate::updater::{ObjectDictUpdater, ObjectUpdater, Updater};

/// Le registre : (from, to) → instructions.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    maps: HashMap<(RecordType, RecordType), CompiledMap>,
    config: MapperConfig,
}

impl Mapper {
    pub fn new() -> Self {
        Mapper::default()
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Mapper {
            maps: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Un AutoMap préréglé selon la configuration (mode strict)
    pub fn auto_map(&self, from: RecordType, to: RecordType) -> AutoMap {
        let mut map = AutoMap::new(from, to);
        map.strict(self.config.strict);
        map
    }

    /// Construit le builder et enregistre les deux sens.
    ///
    /// Une erreur de construction (MissingMapping) laisse le registre intact.
    pub fn add_mapper(&mut self, builder: &dyn MappingBuilder) -> Result<&mut Self> {
        let (forward, backward) = builder.build()?;
        self.register(forward, backward);
        Ok(self)
    }

    /// Enregistre deux entrées déjà compilées ; la dernière gagne
    pub fn register(&mut self, forward: CompiledMap, backward: CompiledMap) -> &mut Self {
        for entry in [forward, backward] {
            let key = (entry.from, entry.to);
            debug!(
                "enregistrement {} -> {} ({} instructions)",
                entry.from.name(),
                entry.to.name(),
                entry.len()
            );
            if self.maps.insert(key, entry).is_some() && self.config.warn_on_overwrite {
                warn!(
                    "map {} -> {} remplacé par un nouvel enregistrement",
                    key.0.name(),
                    key.1.name()
                );
            }
        }
        self
    }

    pub fn contains(&self, from: &RecordType, to: &RecordType) -> bool {
        self.maps.contains_key(&(*from, *to))
    }

    pub fn get(&self, from: &RecordType, to: &RecordType) -> Option<&CompiledMap> {
        self.maps.get(&(*from, *to))
    }

    /// Nombre d'entrées dirigées (deux par builder)
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Mappe avec l'updater par défaut de la configuration.
    pub fn map(&self, source: &Instance, to: &RecordType) -> Result<Instance> {
        self.map_with(source, to, self.config.default_updater.updater())
    }

    /// Mappe avec un updater explicite ; le type source est déduit de l'instance.
    pub fn map_with(
        &self,
        source: &Instance,
        to: &RecordType,
        updater: &dyn Updater,
    ) -> Result<Instance> {
        let from = source.record_type().ok_or(MappingError::UntypedSource)?;
        self.map_as(source, &from, to, updater)
    }

    /// Mappe en imposant le type source (dict non étiqueté, par exemple).
    pub fn map_as(
        &self,
        source: &Instance,
        from: &RecordType,
        to: &RecordType,
        updater: &dyn Updater,
    ) -> Result<Instance> {
        let entry = self.get(from, to).ok_or_else(|| MappingError::MappingNotFound {
            from: from.name().to_string(),
            to: to.name().to_string(),
        })?;

        trace!("mapping {} -> {} via {}", from.name(), to.name(), updater.name());

        let mut destination = updater.create_destination(to);
        for instruction in &entry.instructions {
            instruction(source, &mut destination, updater, self)?;
        }
        Ok(destination)
    }

    /// Raccourci typé objet → objet.
    pub fn map_object<S: Describe, T: Describe>(&self, source: &S) -> Result<T> {
        let source = Instance::object(source.clone());
        self.map_with(&source, &T::describe(), &ObjectUpdater)?
            .into_record::<T>()
    }

    /// Raccourci objet → dict étiqueté (prêt à sérialiser)
    pub fn map_to_dict<S: Describe>(&self, source: &S, to: &RecordType) -> Result<Dict> {
        let source = Instance::object(source.clone());
        match self.map_with(&source, to, &ObjectDictUpdater)? {
            Instance::Dict(dict) => Ok(dict),
            Instance::Object(_) => Err(MappingError::Representation {
                updater: "object_dict",
                expected: "dict",
            }),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapping::{BiMorph, NaturalCopy, Rename, SubListMapping, SubMapping};
    use crate::core::partial::PartialMap;
    use crate::core::typeside::Value;
    use crate::updater::{DictDictUpdater, DictObjectUpdater, UpdaterKind};

    crate::record! {
        struct A {
            a_name: String,
            number_a: i64,
            a: String,
            b: String,
        }
    }

    crate::record! {
        struct B {
            b_name: String,
            number_b: i64,
            a: String,
            b: String,
        }
    }

    crate::record! {
        struct TeamA {
            lead: Option<A>,
            members: Vec<A>,
        }
    }

    crate::record! {
        struct TeamB {
            lead: Option<B>,
            members: Vec<B>,
        }
    }

    fn plus(n: i64) -> impl Fn(Value) -> Value + Send + Sync {
        move |v| match v {
            Value::Integer(i) => Value::Integer(i + n),
            other => other,
        }
    }

    fn gabriel() -> A {
        A {
            a_name: "Gabriel".into(),
            number_a: 26,
            a: "a".into(),
            b: "b".into(),
        }
    }

    fn a_to_b() -> AutoMap {
        let mut map = AutoMap::between::<A, B>();
        map.common(Rename::new("a_name", "b_name"))
            .common(BiMorph::new("number_a", "number_b", plus(4), plus(-4)));
        map
    }

    fn mapper() -> Mapper {
        let mut mapper = Mapper::new();
        mapper.add_mapper(&a_to_b()).unwrap();
        mapper
    }

    #[test]
    fn test_registration_adds_both_directions() {
        let mapper = mapper();
        assert_eq!(mapper.len(), 2);
        assert!(mapper.contains(&A::describe(), &B::describe()));
        assert!(mapper.contains(&B::describe(), &A::describe()));
    }

    #[test]
    fn test_failed_build_leaves_registry_untouched() {
        let mut mapper = Mapper::new();
        let err = mapper.add_mapper(&AutoMap::between::<A, B>()).unwrap_err();
        assert!(err.is_missing_mapping());
        assert!(mapper.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mapper = mapper();
        let b: B = mapper.map_object(&gabriel()).unwrap();
        assert_eq!(
            b,
            B {
                b_name: "Gabriel".into(),
                number_b: 30,
                a: "a".into(),
                b: "b".into(),
            }
        );
        let back: A = mapper.map_object(&b).unwrap();
        assert_eq!(back, gabriel());
    }

    #[test]
    fn test_mapping_not_found() {
        let mapper = Mapper::new();
        let err = mapper
            .map(&Instance::object(gabriel()), &B::describe())
            .unwrap_err();
        match err {
            MappingError::MappingNotFound { from, to } => {
                assert_eq!((from.as_str(), to.as_str()), ("A", "B"));
            }
            other => panic!("erreur inattendue : {}", other),
        }
    }

    #[test]
    fn test_last_registration_wins() {
        let mut mapper = mapper();
        let mut map = PartialMap::between::<A, B>();
        map.common(NaturalCopy::new(["a"]));
        mapper.add_mapper(&map).unwrap();
        assert_eq!(mapper.len(), 2);

        let b: B = mapper.map_object(&gabriel()).unwrap();
        assert_eq!(b, B { a: "a".into(), ..B::default() });
    }

    #[test]
    fn test_dict_destination_is_tagged_and_maps_back() {
        let mapper = mapper();
        let dict = mapper.map_to_dict(&gabriel(), &B::describe()).unwrap();
        assert_eq!(dict.record_type(), Some(B::describe()));
        assert_eq!(dict.get("number_b"), Some(&Value::Integer(30)));

        let back = mapper
            .map_with(&Instance::Dict(dict), &A::describe(), &DictObjectUpdater)
            .unwrap();
        assert_eq!(back.into_record::<A>().unwrap(), gabriel());
    }

    #[test]
    fn test_untyped_dict_needs_explicit_source_type() {
        let mapper = mapper();
        let mut dict = Dict::new();
        dict.insert("b_name", "Zoé");
        dict.insert("number_b", 10_i64);
        dict.insert("a", "x");
        dict.insert("b", "y");
        let source = Instance::Dict(dict);

        let err = mapper
            .map_with(&source, &A::describe(), &DictDictUpdater)
            .unwrap_err();
        assert!(matches!(err, MappingError::UntypedSource));

        let mapped = mapper
            .map_as(&source, &B::describe(), &A::describe(), &DictDictUpdater)
            .unwrap();
        let dict = mapped.as_dict().unwrap();
        assert_eq!(dict.get("a_name"), Some(&Value::String("Zoé".into())));
        assert_eq!(dict.get("number_a"), Some(&Value::Integer(6)));
    }

    #[test]
    fn test_default_updater_from_config() {
        let config = MapperConfig {
            default_updater: UpdaterKind::ObjectDict,
            ..MapperConfig::default()
        };
        let mut mapper = Mapper::with_config(config);
        mapper.add_mapper(&a_to_b()).unwrap();
        let mapped = mapper.map(&Instance::object(gabriel()), &B::describe()).unwrap();
        assert!(mapped.as_dict().is_some());
    }

    #[test]
    fn test_auto_map_takes_strict_from_config() {
        let config = MapperConfig {
            strict: false,
            ..MapperConfig::default()
        };
        let mapper = Mapper::with_config(config);
        assert!(!mapper.auto_map(A::describe(), B::describe()).is_strict());
    }

    #[test]
    fn test_nested_records_and_lists() {
        let mut mapper = mapper();
        let mut map = AutoMap::between::<TeamA, TeamB>();
        map.common(SubMapping::new("lead", A::describe(), "lead", B::describe()))
            .common(SubListMapping::new("members", A::describe(), "members", B::describe()));
        mapper.add_mapper(&map).unwrap();

        let team = TeamA {
            lead: Some(gabriel()),
            members: vec![gabriel(), A { number_a: 1, ..A::default() }],
        };
        let mapped: TeamB = mapper.map_object(&team).unwrap();
        assert_eq!(mapped.lead.as_ref().map(|b| b.number_b), Some(30));
        assert_eq!(
            mapped.members.iter().map(|b| b.number_b).collect::<Vec<_>>(),
            vec![30, 5]
        );

        let back: TeamA = mapper.map_object(&mapped).unwrap();
        assert_eq!(back, team);
    }

    #[test]
    fn test_nested_null_stays_null() {
        let mut mapper = mapper();
        let mut map = AutoMap::between::<TeamA, TeamB>();
        map.common(SubMapping::new("lead", A::describe(), "lead", B::describe()))
            .common(SubListMapping::new("members", A::describe(), "members", B::describe()));
        mapper.add_mapper(&map).unwrap();

        let mapped: TeamB = mapper.map_object(&TeamA::default()).unwrap();
        assert_eq!(mapped, TeamB::default());
    }

    #[test]
    fn test_nested_mapping_into_dicts() {
        let mut mapper = mapper();
        let mut map = AutoMap::between::<TeamA, TeamB>();
        map.common(SubMapping::new("lead", A::describe(), "lead", B::describe()))
            .common(SubListMapping::new("members", A::describe(), "members", B::describe()));
        mapper.add_mapper(&map).unwrap();

        let team = TeamA {
            lead: Some(gabriel()),
            members: vec![gabriel()],
        };
        let dict = mapper.map_to_dict(&team, &TeamB::describe()).unwrap();
        match dict.get("lead") {
            Some(Value::Dict(lead)) => {
                assert_eq!(lead.record_type(), Some(B::describe()));
                assert_eq!(lead.get("b_name"), Some(&Value::String("Gabriel".into())));
            }
            other => panic!("sous-dict attendu : {:?}", other),
        }

        let back = mapper
            .map_with(&Instance::Dict(dict), &TeamA::describe(), &DictObjectUpdater)
            .unwrap();
        assert_eq!(back.into_record::<TeamA>().unwrap(), team);
    }

    #[test]
    fn test_object_updater_on_dict_source_fails() {
        let mapper = mapper();
        let dict = mapper.map_to_dict(&gabriel(), &B::describe()).unwrap();
        let err = mapper
            .map_with(&Instance::Dict(dict), &A::describe(), &ObjectUpdater)
            .unwrap_err();
        assert!(matches!(err, MappingError::Representation { .. }));
    }
}
