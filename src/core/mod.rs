// =============================================================================
// CORE — Le moteur de mapping, indépendant de la représentation
// =============================================================================
//
// Ce module regroupe la logique pure du mapping : pas de fichier, pas de
// JSON à la main, pas de choix objet/dict (c'est le travail des updaters).
//
// Architecture :
//   typeside  → les valeurs dynamiques et les types de champs
//   schema    → les types d'enregistrement (= le "moule") et la macro record!
//   instance  → les deux représentations : objet typé ou dict
//   error     → MissingMapping, MappingNotFound et les erreurs de valeur
//   mapping   → les étapes déclaratives (Rename, BiMorph, NaturalCopy...)
//   partial   → compilation des étapes en instructions (PartialMap)
//   validate  → contrôle de complétude (aucun champ perdu en silence)
//   automap   → inférence des copies triviales + règles de type
//   mapper    → le registre (from, to) → instructions, et le mapping lui-même
//
// =============================================================================

pub mod typeside;
pub mod schema;
pub mod instance;
pub mod error;
pub mod mapping;
pub mod partial;
pub mod validate;
pub mod automap;
pub mod mapper;
