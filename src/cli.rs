//! Arguments de la ligne de commande du binaire de démonstration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::updater::UpdaterKind;

#[derive(Parser, Debug)]
#[command(name = "automap")]
#[command(author, version, long_about = None)]
#[command(about = "Mapping déclaratif objet ↔ objet / objet ↔ dict")]
pub struct Cli {
    /// Chemin du fichier de configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Déroule le scénario A ↔ B pas à pas, dans les deux sens
    Demo {
        /// Stratégie de l'aller (défaut : celle de la configuration)
        #[arg(short, long, value_enum)]
        updater: Option<UpdaterKind>,
    },

    /// Affiche l'aller matérialisé en dict JSON
    Json {
        /// Nom de la source
        #[arg(long, default_value = "Gabriel")]
        name: String,

        /// Nombre de la source
        #[arg(short = 'n', long, default_value = "26")]
        number: i64,

        /// JSON indenté
        #[arg(short, long)]
        pretty: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_demo() {
        let cli = Cli::parse_from(["automap", "demo", "--updater", "object-dict"]);
        match cli.command {
            Command::Demo { updater } => assert_eq!(updater, Some(UpdaterKind::ObjectDict)),
            other => panic!("commande inattendue : {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_with_config() {
        let cli = Cli::parse_from(["automap", "--config", "x.yml", "json", "-n", "3", "--pretty"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
        match cli.command {
            Command::Json { name, number, pretty } => {
                assert_eq!((name.as_str(), number, pretty), ("Gabriel", 3, true));
            }
            other => panic!("commande inattendue : {:?}", other),
        }
    }
}
