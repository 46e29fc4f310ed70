//! pathway: inspect progression decisions over a curriculum graph
//!
//! Loads a graph snapshot and a learner's completion record from JSON files
//! and prints unlock states, jump classifications, recovery targets and
//! next steps as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use pathway_core::{
    CurriculumConfig, GraphPayload, InMemoryProgressStore, ProgressPayload, ProgressSources, ProgressionSession,
};

#[derive(Parser, Debug)]
#[command(name = "pathway")]
#[command(about = "Inspect curriculum progression decisions", version = pathway_core::VERSION)]
struct Cli {
    /// Graph snapshot (`nodes`, `edges`, `dependent_edges`)
    #[arg(short, long, env = "PATHWAY_GRAPH")]
    graph: PathBuf,

    /// Remote completion record (`completed_topics`)
    #[arg(short, long, env = "PATHWAY_PROGRESS")]
    progress: Option<PathBuf>,

    /// Locally cached learned ids
    #[arg(long = "local-learned", value_delimiter = ',')]
    local_learned: Vec<String>,

    /// Locally flagged completed chapters
    #[arg(long = "local-chapters", value_delimiter = ',')]
    local_chapters: Vec<String>,

    /// Progression configuration
    #[arg(short, long, env = "PATHWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Unlock state of every knowledge node, or the decision for one node
    Status {
        #[arg(long)]
        id: Option<String>,
    },

    /// Classify an attempt on `to` reached from `from`
    Jump {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Nearest learnable node at or before `current`
    Nearest {
        #[arg(long)]
        current: String,
    },

    /// Apply a pass of `topic` in memory and print the next step
    Next {
        #[arg(long)]
        topic: String,
    },
}

#[derive(Serialize)]
struct JumpReport<'a> {
    from: &'a str,
    to: &'a str,
    is_jump: bool,
    #[serde(flatten)]
    decision: pathway_core::JumpDecision,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn open_session(cli: &Cli) -> anyhow::Result<ProgressionSession<InMemoryProgressStore>> {
    let config = match &cli.config {
        Some(path) => {
            CurriculumConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => CurriculumConfig::default(),
    };

    let payload: GraphPayload = read_json(&cli.graph)?;
    let remote = match &cli.progress {
        Some(path) => read_json::<ProgressPayload>(path)?,
        None => ProgressPayload::default(),
    };
    let mut sources = ProgressSources::from_remote(remote);
    sources.local_learned.extend(cli.local_learned.iter().cloned());
    sources.local_completed_chapters.extend(cli.local_chapters.iter().cloned());
    debug!(
        "Loaded {} remote and {} local progress entries",
        sources.remote.len(),
        sources.local_learned.len()
    );

    let session = ProgressionSession::from_payload(payload, &config, InMemoryProgressStore::new(sources))?;
    Ok(session)
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let mut session = open_session(&cli)?;
    info!("Running {:?}", cli.command);

    let output = match &cli.command {
        Command::Status { id: Some(id) } => serde_json::to_string_pretty(&session.can_jump_to_knowledge(id))?,
        Command::Status { id: None } => serde_json::to_string_pretty(&session.status_map())?,
        Command::Jump { from, to } => {
            let report = JumpReport {
                from,
                to,
                is_jump: pathway_core::is_jump_attempt(to, from),
                decision: session.classify_jump(from, to),
            };
            serde_json::to_string_pretty(&report)?
        }
        Command::Nearest { current } => {
            let target = session.nearest().find_nearest_learnable_node(current);
            serde_json::to_string_pretty(&serde_json::json!({ "current": current, "target": target.to_string() }))?
        }
        Command::Next { topic } => {
            let next = session.complete_topic(topic)?;
            serde_json::to_string_pretty(&next)?
        }
    };
    Ok(output)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let output = run(cli)?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jump_with_local_progress() {
        let cli = Cli::try_parse_from([
            "pathway",
            "--graph",
            "graph.json",
            "--local-learned",
            "1_1,1_2",
            "--local-chapters",
            "chapter1",
            "jump",
            "--from",
            "1_2",
            "--to",
            "2_2",
        ])
        .unwrap();

        assert_eq!(cli.graph, PathBuf::from("graph.json"));
        assert_eq!(cli.local_learned, vec!["1_1".to_string(), "1_2".to_string()]);
        assert_eq!(cli.local_chapters, vec!["chapter1".to_string()]);
        assert_eq!(
            cli.command,
            Command::Jump {
                from: "1_2".to_string(),
                to: "2_2".to_string(),
            }
        );
    }

    #[test]
    fn test_status_id_is_optional() {
        let cli = Cli::try_parse_from(["pathway", "-g", "g.json", "status"]).unwrap();
        assert_eq!(cli.command, Command::Status { id: None });
        assert!(cli.progress.is_none());
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["pathway", "--graph", "g.json"]).is_err());
        assert!(Cli::try_parse_from(["pathway", "--graph", "g.json", "nearest"]).is_err());
    }

    #[test]
    fn test_run_reports_nearest_target() {
        let dir = std::env::temp_dir().join(format!("pathway-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let graph = dir.join("graph.json");
        fs::write(
            &graph,
            r#"{ "nodes": [ { "data": { "id": "1_1" } }, { "data": { "id": "1_2" } } ] }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "pathway",
            "--graph",
            graph.to_str().unwrap(),
            "--local-learned",
            "1_1",
            "nearest",
            "--current",
            "1_3",
        ])
        .unwrap();
        let output: serde_json::Value = serde_json::from_str(&run(cli).unwrap()).unwrap();
        assert_eq!(output["target"], "1_2");

        fs::remove_dir_all(&dir).ok();
    }
}
