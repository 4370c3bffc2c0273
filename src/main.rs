// =============================================================================
// AUTOMAP — Point d'entrée : démonstration du moteur de mapping
// =============================================================================
//
// Ce main.rs déroule un exemple complet :
//   1. Déclarer deux types d'enregistrement A et B
//   2. Décrire le map A ↔ B (étapes explicites + inférence)
//   3. L'enregistrer dans le Mapper (les deux sens)
//   4. Mapper A → B, puis B → A, et vérifier l'aller-retour
//   5. Matérialiser la destination en dict (JSON)
//
// =============================================================================

use clap::Parser;
use eyre::{Context, Result};
use log::info;

use automap::cli::{Cli, Command};
use automap::config::MapperConfig;
use automap::core::automap::AutoMap;
use automap::core::instance::{Instance, Object};
use automap::core::mapper::Mapper;
use automap::core::mapping::{BiMorph, Rename};
use automap::core::schema::{Describe, RecordType};
use automap::core::typeside::Value;
use automap::updater::UpdaterKind;

automap::record! {
    pub struct A {
        pub a_name: String,
        pub number_a: i64,
        pub a: String,
        pub b: String,
    }
}

automap::record! {
    pub struct B {
        pub b_name: String,
        pub number_b: i64,
        pub a: String,
        pub b: String,
    }
}

fn shift(delta: i64) -> impl Fn(Value) -> Value + Send + Sync {
    move |value| match value {
        Value::Integer(n) => Value::Integer(n + delta),
        other => other,
    }
}

/// `A { a_name: String, number_a: Int, ... }` sur une ligne
fn signature(ty: &RecordType) -> String {
    let fields: Vec<String> = ty
        .fields()
        .iter()
        .map(|field| format!("{}: {}", field.name, field.ty))
        .collect();
    format!("{} {{ {} }}", ty.name(), fields.join(", "))
}

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

/// A ↔ B : a_name ↔ b_name, number_b = number_a + 4, a et b inférés
fn build_mapper(config: MapperConfig) -> Result<Mapper> {
    let mut mapper = Mapper::with_config(config);
    let mut map: AutoMap = mapper.auto_map(A::describe(), B::describe());
    map.common(Rename::new("a_name", "b_name"))
        .common(BiMorph::new("number_a", "number_b", shift(4), shift(-4)));
    mapper.add_mapper(&map).context("Construction du map A <-> B")?;
    Ok(mapper)
}

fn demo(mapper: &Mapper, updater: Option<UpdaterKind>) -> Result<()> {
    println!("╔══════════════════════════════════════════════════╗");
    println!("║      AUTOMAP — Mapping déclaratif                ║");
    println!("║      objet ↔ objet, objet ↔ dict                 ║");
    println!("╚══════════════════════════════════════════════════╝\n");

    // ═══════════════════════════════════════════════════════════
    // ÉTAPE 1 : Les deux types
    // ═══════════════════════════════════════════════════════════
    println!("═══ ÉTAPE 1 : Types d'enregistrement ═══\n");
    for ty in [A::describe(), B::describe()] {
        println!("  {}", signature(&ty));
    }
    println!();

    // ═══════════════════════════════════════════════════════════
    // ÉTAPE 2 : Le registre
    // ═══════════════════════════════════════════════════════════
    println!("═══ ÉTAPE 2 : Mapper ({} entrées) ═══\n", mapper.len());
    for (from, to) in [(A::describe(), B::describe()), (B::describe(), A::describe())] {
        if let Some(entry) = mapper.get(&from, &to) {
            println!("  {:?}", entry);
        }
    }
    println!();

    // ═══════════════════════════════════════════════════════════
    // ÉTAPE 3 : Aller A → B
    // ═══════════════════════════════════════════════════════════
    let kind = updater.unwrap_or(mapper.config().default_updater);
    println!("═══ ÉTAPE 3 : A → B (updater {}) ═══\n", kind);

    let original = A {
        a_name: "Gabriel".into(),
        number_a: 26,
        a: "a".into(),
        b: "b".into(),
    };
    let object = Object::new(original.clone());
    let source = match kind {
        UpdaterKind::DictObject | UpdaterKind::DictDict => Instance::Dict(object.to_dict()?),
        UpdaterKind::Object | UpdaterKind::ObjectDict => Instance::Object(object),
    };
    println!("  source      : {}", source);
    let forward = mapper.map_with(&source, &B::describe(), kind.updater())?;
    println!("  destination : {}\n", forward);

    // ═══════════════════════════════════════════════════════════
    // ÉTAPE 4 : Retour B → A
    // ═══════════════════════════════════════════════════════════
    println!("═══ ÉTAPE 4 : B → A ═══\n");
    let back = match &forward {
        Instance::Dict(_) => UpdaterKind::DictObject,
        Instance::Object(_) => UpdaterKind::Object,
    };
    let backward = mapper.map_with(&forward, &A::describe(), back.updater())?;
    println!("  retour      : {}", backward);

    if backward.into_record::<A>()? == original {
        println!("  ✓ Aller-retour identique\n");
    } else {
        println!("  ✗ L'aller-retour diffère de la source\n");
    }

    info!("démonstration terminée");
    Ok(())
}

fn json(mapper: &Mapper, name: String, number: i64, pretty: bool) -> Result<()> {
    let source = A {
        a_name: name,
        number_a: number,
        a: "a".into(),
        b: "b".into(),
    };
    let dict = mapper.map_to_dict(&source, &B::describe())?;
    let output = if pretty {
        serde_json::to_string_pretty(&dict)?
    } else {
        serde_json::to_string(&dict)?
    };
    println!("{}", output);
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Initialisation des logs")?;

    let cli = Cli::parse();
    let config = MapperConfig::load(cli.config.as_ref()).context("Chargement de la configuration")?;
    let mapper = build_mapper(config)?;

    match cli.command {
        Command::Demo { updater } => demo(&mapper, updater)?,
        Command::Json { name, number, pretty } => json(&mapper, name, number, pretty)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_a_single_line() {
        assert_eq!(
            signature(&A::describe()),
            "A { a_name: String, number_a: Int, a: String, b: String }"
        );
    }
}
