use anyhow::Context;
use clap::{Parser, Subcommand};
use stagehand_assets::ResourceDir;
use stagehand_ecs::{ComponentCatalog, ComponentRecord};
use stagehand_kernel::{Registry, Tick};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stagehand", about = "Headless runner for stagehand content")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Resources directory holding game.config, scenes and templates
    #[arg(short, long, default_value = "resources")]
    resources: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the game config, scenes and component types
    Info,
    /// Load every scene once and report the first configuration error
    Validate,
    /// Boot the initial scene and run frames without a native backend
    Run {
        /// Number of frames to run
        #[arg(short, long, default_value = "1")]
        frames: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let resources = ResourceDir::open(&cli.resources)
        .with_context(|| format!("opening {}", cli.resources.display()))?;

    match cli.command {
        Commands::Info => {
            let config = resources.config();
            println!("stagehand v{}", env!("CARGO_PKG_VERSION"));
            println!("title: {}", config.game_title);
            println!(
                "initial scene: {}",
                config.initial_scene().unwrap_or("<none>")
            );
            println!("scenes: {}", resources.scene_names()?.join(", "));
            let types: Vec<String> = resources
                .component_types()?
                .into_iter()
                .map(|t| t.name)
                .collect();
            println!("component types: {}", types.join(", "));
        }
        Commands::Validate => {
            let scenes = resources.scene_names()?;
            for scene in &scenes {
                let mut registry = Registry::headless(resources.clone(), catalog(&resources)?);
                registry
                    .load_scene(scene, true)
                    .with_context(|| format!("loading scene {scene}"))?;
                println!("{scene}: {} actors", registry.actor_count());
            }
            println!("Validated {} scenes", scenes.len());
        }
        Commands::Run { frames } => {
            let config = resources.config().clone();
            let mut registry = Registry::headless(resources.clone(), catalog(&resources)?);
            registry.boot(&config)?;
            for _ in 0..frames {
                if registry.tick()? == Tick::Quit {
                    tracing::info!(frame = registry.frame(), "quit by script");
                    break;
                }
            }
            println!(
                "Ran {} frames: scene={}, actors={}",
                registry.frame(),
                registry.current_scene(),
                registry.actor_count()
            );
        }
    }

    Ok(())
}

/// One hookless prototype per declared component type, carrying its defaults.
fn catalog(resources: &ResourceDir) -> anyhow::Result<ComponentCatalog> {
    let mut catalog = ComponentCatalog::new();
    for def in resources.component_types()? {
        let mut record = ComponentRecord::prototype(def.name);
        for (field, value) in def.fields {
            record = record.with_field(field, value);
        }
        catalog.register(record);
    }
    tracing::debug!(types = catalog.len(), "component catalog built");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_common::Value;
    use std::fs;

    #[test]
    fn catalog_carries_declared_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("game.config"), r#"{ "initial_scene": "main" }"#).unwrap();
        fs::create_dir(dir.path().join("component_types")).unwrap();
        fs::write(dir.path().join("component_types/Health.json"), r#"{ "hp": 3 }"#).unwrap();
        fs::write(dir.path().join("component_types/Spin.lua"), "Spin = {}").unwrap();

        let resources = ResourceDir::open(dir.path()).unwrap();
        let catalog = catalog(&resources).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Health", "Spin"]);
        let health = catalog.get("Health").unwrap();
        assert_eq!(health.get("hp"), Some(Value::Number(3.0)));
    }

    #[test]
    fn run_boots_and_ticks_headless() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("game.config"), r#"{ "initial_scene": "main" }"#).unwrap();
        fs::create_dir(dir.path().join("scenes")).unwrap();
        fs::write(
            dir.path().join("scenes/main.scene"),
            r#"{ "actors": [ { "name": "Ship", "components": { "rb": { "type": "Rigidbody" } } } ] }"#,
        )
        .unwrap();

        let resources = ResourceDir::open(dir.path()).unwrap();
        let config = resources.config().clone();
        let mut registry = Registry::headless(resources.clone(), catalog(&resources).unwrap());
        registry.boot(&config).unwrap();
        assert_eq!(registry.tick().unwrap(), Tick::Continue);
        assert_eq!(registry.frame(), 1);
        assert_eq!(registry.actor_count(), 1);
    }
}
