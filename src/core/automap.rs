// =============================================================================
// AUTOMAP — Inférence des copies triviales + contrôle de complétude
// =============================================================================
//
// L'AutoMap évite d'écrire les étapes évidentes. Pour deux types from/to :
//
//   1. On inspecte les deux types : nom de champ → type déclaré
//   2. Champs COMMUNS (même nom des deux côtés) :
//        - déjà couverts par une étape commune explicite → rien à faire
//        - sinon on essaie les RÈGLES DE TYPE dans l'ordre ; la première
//          qui s'applique fabrique l'étape (par défaut : "même type
//          déclaré ⇒ NaturalCopy")
//        - aucune règle ⇒ MissingMapping immédiat
//   3. Champs présents d'UN SEUL côté : ils doivent être couverts par les
//      étapes explicites, séparément pour l'aller et pour le retour
//   4. On délègue la compilation au PartialMap
//
// Les règles de type forment une liste ouverte, enregistrable à l'exécution :
// on ajoute une stratégie d'appariement sans toucher à l'algorithme.
//
// EXEMPLE :
//   A { a_name, number_a, a, b }  →  B { b_name, number_b, a, b }
//   étapes explicites : Rename(a_name, b_name), BiMorph(number_a, number_b)
//   inféré : NaturalCopy([a]), NaturalCopy([b])
//
// =============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};

use super::error::{MappingError, MissingCause, Result};
use super::mapping::{MappingStep, NaturalCopy, ReverseMappingStep, SubListMapping, SubMapping};
use super::partial::{CompiledMap, MappingBuilder, PartialMap};
use super::schema::{default_inspector, Describe, MemberInspector, RecordType};
use super::typeside::FieldType;
use super::validate::{check_coverage, Coverage};

/// Une règle d'appariement entre deux types déclarés.
pub trait TypePattern: Send + Sync {
    fn is_matching(&self, from_type: &FieldType, to_type: &FieldType) -> bool;

    /// Appelée après un `is_matching` positif ; les règles fournies retombent
    /// sur une copie naturelle si on l'appelle hors de ce cas.
    fn create(
        &self,
        from_name: &str,
        to_name: &str,
        from_type: &FieldType,
        to_type: &FieldType,
    ) -> Arc<dyn ReverseMappingStep>;
}

type Matcher = Arc<dyn Fn(&FieldType, &FieldType) -> bool + Send + Sync>;
type StepFactory =
    Arc<dyn Fn(&str, &str, &FieldType, &FieldType) -> Arc<dyn ReverseMappingStep> + Send + Sync>;

/// Règle faite de deux closures : le prédicat et la fabrique d'étape.
#[derive(Clone)]
pub struct LambdaMatch {
    matcher: Matcher,
    factory: StepFactory,
}

impl LambdaMatch {
    pub fn new(
        matcher: impl Fn(&FieldType, &FieldType) -> bool + Send + Sync + 'static,
        factory: impl Fn(&str, &str, &FieldType, &FieldType) -> Arc<dyn ReverseMappingStep>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        LambdaMatch {
            matcher: Arc::new(matcher),
            factory: Arc::new(factory),
        }
    }
}

impl TypePattern for LambdaMatch {
    fn is_matching(&self, from_type: &FieldType, to_type: &FieldType) -> bool {
        (self.matcher)(from_type, to_type)
    }

    fn create(
        &self,
        from_name: &str,
        to_name: &str,
        from_type: &FieldType,
        to_type: &FieldType,
    ) -> Arc<dyn ReverseMappingStep> {
        (self.factory)(from_name, to_name, from_type, to_type)
    }
}

/// Les règles fournies par la crate.
pub mod patterns {
    use super::*;

    /// Même type déclaré ⇒ copie naturelle (la seule règle active par défaut)
    pub fn identical_types() -> LambdaMatch {
        LambdaMatch::new(
            |from_type, to_type| from_type == to_type,
            |from_name, _, _, _| Arc::new(NaturalCopy::new([from_name])),
        )
    }

    /// Deux sous-enregistrements de types différents ⇒ SubMapping.
    ///
    /// Le Mapper devra connaître la paire imbriquée au moment du mapping.
    pub fn nested_records() -> LambdaMatch {
        LambdaMatch::new(
            |from_type, to_type| from_type.record().is_some() && to_type.record().is_some(),
            |from_name, to_name, from_type, to_type| {
                let sides = (from_type.record(), to_type.record());
                let step: Arc<dyn ReverseMappingStep> = match sides {
                    (Some(source), Some(destination)) => {
                        Arc::new(SubMapping::new(from_name, *source, to_name, *destination))
                    }
                    _ => Arc::new(NaturalCopy::new([from_name])),
                };
                step
            },
        )
    }

    /// Deux listes de sous-enregistrements ⇒ SubListMapping
    pub fn nested_record_lists() -> LambdaMatch {
        LambdaMatch::new(
            |from_type, to_type| {
                from_type.list_record().is_some() && to_type.list_record().is_some()
            },
            |from_name, to_name, from_type, to_type| {
                let sides = (from_type.list_record(), to_type.list_record());
                let step: Arc<dyn ReverseMappingStep> = match sides {
                    (Some(source), Some(destination)) => {
                        Arc::new(SubListMapping::new(from_name, *source, to_name, *destination))
                    }
                    _ => Arc::new(NaturalCopy::new([from_name])),
                };
                step
            },
        )
    }

    pub fn defaults() -> Vec<Arc<dyn TypePattern>> {
        vec![Arc::new(identical_types())]
    }
}

/// Map inféré et contrôlé.
#[derive(Clone)]
pub struct AutoMap {
    from: RecordType,
    to: RecordType,
    common_steps: Vec<Arc<dyn ReverseMappingStep>>,
    forward_steps: Vec<Arc<dyn MappingStep>>,
    backward_steps: Vec<Arc<dyn MappingStep>>,
    inspector: MemberInspector,
    patterns: Vec<Arc<dyn TypePattern>>,
    strict: bool,
}

impl AutoMap {
    pub fn new(from: RecordType, to: RecordType) -> Self {
        AutoMap {
            from,
            to,
            common_steps: Vec::new(),
            forward_steps: Vec::new(),
            backward_steps: Vec::new(),
            inspector: default_inspector(),
            patterns: patterns::defaults(),
            strict: true,
        }
    }

    pub fn between<A: Describe, B: Describe>() -> Self {
        AutoMap::new(A::describe(), B::describe())
    }

    pub fn common(&mut self, step: impl ReverseMappingStep + 'static) -> &mut Self {
        self.common_steps.push(Arc::new(step));
        self
    }

    pub fn forward(&mut self, step: impl MappingStep + 'static) -> &mut Self {
        self.forward_steps.push(Arc::new(step));
        self
    }

    /// Étape retour ; membres exprimés dans son sens (champ de `to`, champ de `from`)
    pub fn backward(&mut self, step: impl MappingStep + 'static) -> &mut Self {
        self.backward_steps.push(Arc::new(step));
        self
    }

    pub fn inspector(&mut self, inspector: MemberInspector) -> &mut Self {
        self.inspector = inspector;
        self
    }

    /// Ajoute une règle de type, essayée après celles déjà présentes
    pub fn pattern(&mut self, pattern: impl TypePattern + 'static) -> &mut Self {
        self.patterns.push(Arc::new(pattern));
        self
    }

    /// Accepté mais sans effet : la couverture est toujours exigée en entier
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Fabrique les étapes des champs communs non couverts explicitement.
    fn build_common_steps(
        &self,
        common_names: &[String],
        from_members: &IndexMap<String, FieldType>,
        to_members: &IndexMap<String, FieldType>,
    ) -> Result<Vec<Arc<dyn ReverseMappingStep>>> {
        let mut explicit = Coverage::new();
        for step in &self.common_steps {
            explicit.extend(step.supported_members());
        }

        let mut steps = Vec::new();
        for name in common_names {
            if explicit.covers_pair(name, name) {
                continue;
            }

            let from_type = &from_members[name];
            let to_type = &to_members[name];

            let pattern = self
                .patterns
                .iter()
                .find(|pattern| pattern.is_matching(from_type, to_type))
                .ok_or_else(|| MappingError::MissingMapping {
                    from: self.from.name().to_string(),
                    to: self.to.name().to_string(),
                    members: BTreeSet::from([name.clone()]),
                    cause: MissingCause::NoPatternMatched {
                        from_type: from_type.to_string(),
                        to_type: to_type.to_string(),
                    },
                })?;

            steps.push(pattern.create(name, name, from_type, to_type));
        }

        Ok(steps)
    }
}

impl MappingBuilder for AutoMap {
    fn build(&self) -> Result<(CompiledMap, CompiledMap)> {
        if !self.strict {
            info!(
                "automap {} -> {} : mode non strict sans effet, couverture complète exigée",
                self.from.name(),
                self.to.name()
            );
        }

        let from_members = (self.inspector)(&self.from);
        let to_members = (self.inspector)(&self.to);

        let common_names: Vec<String> = from_members
            .keys()
            .filter(|name| to_members.contains_key(*name))
            .cloned()
            .collect();
        let source_only: BTreeSet<String> = from_members
            .keys()
            .filter(|name| !to_members.contains_key(*name))
            .cloned()
            .collect();
        let destination_only: BTreeSet<String> = to_members
            .keys()
            .filter(|name| !from_members.contains_key(*name))
            .cloned()
            .collect();

        let synthesized = self.build_common_steps(&common_names, &from_members, &to_members)?;
        debug!(
            "automap {} -> {} : {} champs communs, {} étapes inférées",
            self.from.name(),
            self.to.name(),
            common_names.len(),
            synthesized.len()
        );

        let mut forward = Coverage::new();
        let mut backward = Coverage::new();
        for step in &self.common_steps {
            forward.extend(step.supported_members());
            backward.extend(step.supported_members());
        }
        for step in &self.forward_steps {
            forward.extend(step.supported_members());
        }
        for step in &self.backward_steps {
            backward.extend_reversed(step.supported_members());
        }

        check_coverage(&self.from, &self.to, &forward, &source_only, &destination_only)?;
        check_coverage(&self.from, &self.to, &backward, &source_only, &destination_only)?;

        let common_steps = synthesized
            .into_iter()
            .chain(self.common_steps.iter().cloned())
            .collect();

        PartialMap::with_steps(
            self.from,
            self.to,
            common_steps,
            self.forward_steps.clone(),
            self.backward_steps.clone(),
        )
        .build()
    }
}
