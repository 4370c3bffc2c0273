// =============================================================================
// PARTIAL — Compilation d'une liste d'étapes en deux listes d'instructions
// =============================================================================
//
// Un PartialMap prend :
//   - des étapes COMMUNES (réversibles), appliquées dans les deux sens
//   - des étapes ALLER seulement
//   - des étapes RETOUR seulement
//
// et produit exactement deux entrées compilées :
//
//   from → to : [commune.aller..., aller.aller...]
//   to → from : [commune.retour..., retour.aller...]
//
// Aucune validation ici : un champ oublié reste simplement à sa valeur
// par défaut dans la destination. Le contrôle de complétude est le
// travail de l'AutoMap.
//
// =============================================================================

use std::fmt;
use std::sync::Arc;

use log::debug;

use super::error::Result;
use super::instance::Instance;
use super::mapper::Mapper;
use super::mapping::{MappingStep, ReverseMappingStep};
use super::schema::{Describe, RecordType};
use crate::updater::Updater;

/// Une opération compilée : applique une étape dans un sens donné.
pub type Instruction =
    Arc<dyn Fn(&Instance, &mut Instance, &dyn Updater, &Mapper) -> Result<()> + Send + Sync>;

/// Une entrée dirigée du Mapper : (from, to, instructions ordonnées).
#[derive(Clone)]
pub struct CompiledMap {
    pub from: RecordType,
    pub to: RecordType,
    pub instructions: Vec<Instruction>,
}

impl CompiledMap {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl fmt::Debug for CompiledMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompiledMap({} -> {}, {} instructions)",
            self.from.name(),
            self.to.name(),
            self.instructions.len()
        )
    }
}

/// Tout ce qui sait produire la paire d'entrées aller/retour.
pub trait MappingBuilder {
    fn build(&self) -> Result<(CompiledMap, CompiledMap)>;
}

pub(crate) fn forward_of(step: Arc<dyn MappingStep>) -> Instruction {
    Arc::new(
        move |source: &Instance,
              destination: &mut Instance,
              updater: &dyn Updater,
              mapper: &Mapper| {
            step.map_forward(source, destination, updater, mapper)
        },
    )
}

pub(crate) fn common_forward_of(step: Arc<dyn ReverseMappingStep>) -> Instruction {
    Arc::new(
        move |source: &Instance,
              destination: &mut Instance,
              updater: &dyn Updater,
              mapper: &Mapper| {
            step.map_forward(source, destination, updater, mapper)
        },
    )
}

pub(crate) fn common_backward_of(step: Arc<dyn ReverseMappingStep>) -> Instruction {
    Arc::new(
        move |source: &Instance,
              destination: &mut Instance,
              updater: &dyn Updater,
              mapper: &Mapper| {
            step.map_backward(source, destination, updater, mapper)
        },
    )
}

/// Map explicite, sans inférence ni contrôle de complétude.
#[derive(Clone)]
pub struct PartialMap {
    from: RecordType,
    to: RecordType,
    common_steps: Vec<Arc<dyn ReverseMappingStep>>,
    forward_steps: Vec<Arc<dyn MappingStep>>,
    backward_steps: Vec<Arc<dyn MappingStep>>,
}

impl PartialMap {
    pub fn new(from: RecordType, to: RecordType) -> Self {
        PartialMap {
            from,
            to,
            common_steps: Vec::new(),
            forward_steps: Vec::new(),
            backward_steps: Vec::new(),
        }
    }

    pub fn between<A: Describe, B: Describe>() -> Self {
        PartialMap::new(A::describe(), B::describe())
    }

    /// Ajoute une étape réversible, appliquée dans les deux sens
    pub fn common(&mut self, step: impl ReverseMappingStep + 'static) -> &mut Self {
        self.common_steps.push(Arc::new(step));
        self
    }

    /// Ajoute une étape appliquée seulement de `from` vers `to`
    pub fn forward(&mut self, step: impl MappingStep + 'static) -> &mut Self {
        self.forward_steps.push(Arc::new(step));
        self
    }

    /// Ajoute une étape appliquée seulement de `to` vers `from`.
    /// Ses membres se lisent dans ce sens : (champ de `to`, champ de `from`).
    pub fn backward(&mut self, step: impl MappingStep + 'static) -> &mut Self {
        self.backward_steps.push(Arc::new(step));
        self
    }

    pub(crate) fn with_steps(
        from: RecordType,
        to: RecordType,
        common_steps: Vec<Arc<dyn ReverseMappingStep>>,
        forward_steps: Vec<Arc<dyn MappingStep>>,
        backward_steps: Vec<Arc<dyn MappingStep>>,
    ) -> Self {
        PartialMap {
            from,
            to,
            common_steps,
            forward_steps,
            backward_steps,
        }
    }
}

impl MappingBuilder for PartialMap {
    fn build(&self) -> Result<(CompiledMap, CompiledMap)> {
        let forward: Vec<Instruction> = self
            .common_steps
            .iter()
            .cloned()
            .map(common_forward_of)
            .chain(self.forward_steps.iter().cloned().map(forward_of))
            .collect();

        let backward: Vec<Instruction> = self
            .common_steps
            .iter()
            .cloned()
            .map(common_backward_of)
            .chain(self.backward_steps.iter().cloned().map(forward_of))
            .collect();

        debug!(
            "map {} <-> {} compilé : {} instructions aller, {} retour",
            self.from.name(),
            self.to.name(),
            forward.len(),
            backward.len()
        );

        Ok((
            CompiledMap {
                from: self.from,
                to: self.to,
                instructions: forward,
            },
            CompiledMap {
                from: self.to,
                to: self.from,
                instructions: backward,
            },
        ))
    }
}
