//! clem-run
//!
//! Plays one grid-navigation instance with scripted players and writes the
//! episode record as JSON. Each `--responses` file holds one response per
//! line and becomes one player, in turn order.

use anyhow::{Context, Result, bail};
use clap::Parser;
use clem_backend::{Model, ScriptedModel};
use clem_master::{CallbackList, GameMaster, play_episode};
use grid_navigation::NavigationRules;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "clem-run", version, about = "Play a clem game instance with scripted players")]
struct Args {
    /// Instance file: `{ "config": {...}, "goal": [row, col] }`
    #[arg(short, long)]
    instance: PathBuf,

    /// Response script for one player; repeat for more players
    #[arg(short, long = "responses", required = true)]
    responses: Vec<PathBuf>,

    /// Stop after this many turns
    #[arg(long)]
    max_turns: Option<usize>,

    /// Write the episode record here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

async fn load_script(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading responses from {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

async fn build_models(paths: &[PathBuf]) -> Result<Vec<Arc<dyn Model>>> {
    let mut models: Vec<Arc<dyn Model>> = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        let script = load_script(path).await?;
        models.push(Arc::new(ScriptedModel::new(format!("scripted-{}", i + 1), script)));
    }
    Ok(models)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let raw = tokio::fs::read_to_string(&args.instance)
        .await
        .with_context(|| format!("reading instance {}", args.instance.display()))?;
    let instance: serde_json::Value =
        serde_json::from_str(&raw).context("instance is not valid JSON")?;

    let models = build_models(&args.responses).await?;
    if models.is_empty() {
        bail!("at least one response script is required");
    }
    info!(players = models.len(), "starting episode");

    let mut master = GameMaster::new(NavigationRules::new(), models);
    let mut callbacks = CallbackList::new();
    let scores = play_episode(&mut master, &instance, &mut callbacks, args.max_turns).await?;

    match scores {
        Some(scores) => info!(?scores, rounds = master.current_round() + 1, "episode scored"),
        None => warn!("episode stopped before it ended"),
    }
    if let Some(env) = master.environment() {
        info!(state_hash = %env.state_hash(), "final state");
    }

    let record = serde_json::to_string_pretty(master.recorder())?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, record)
                .await
                .with_context(|| format!("writing record to {}", path.display()))?;
            info!(path = %path.display(), "episode record written");
        }
        None => println!("{record}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_require_responses() {
        assert!(Args::try_parse_from(["clem-run", "-i", "game.json"]).is_err());

        let args = Args::try_parse_from([
            "clem-run", "-i", "game.json", "-r", "a.txt", "-r", "b.txt", "--max-turns", "9",
        ])
        .unwrap();
        assert_eq!(args.responses.len(), 2);
        assert_eq!(args.max_turns, Some(9));
        assert!(args.output.is_none());
    }

    #[tokio::test]
    async fn test_bundled_corridor_instance() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("instances");
        let models = build_models(&[dir.join("navigator-1.txt"), dir.join("navigator-2.txt")])
            .await
            .unwrap();
        let raw = std::fs::read_to_string(dir.join("corridor.json")).unwrap();
        let instance: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let mut master = GameMaster::new(NavigationRules::new(), models);
        let scores = play_episode(&mut master, &instance, &mut CallbackList::new(), None)
            .await
            .unwrap()
            .unwrap();
        assert!(scores.success);
        assert_eq!(master.recorder().violated_request_counts.iter().sum::<u32>(), 2);
    }
}
