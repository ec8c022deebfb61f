//! CLI entry point for the metagraph writer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use metagraph_core::config::load_config;
use metagraph_core::Urn;
use metagraph_graph::{GraphWriter, Neo4jStore, TracingMetricListener, TypeRegistry};

use metagraph_cli::RecordBatch;

#[derive(Parser)]
#[command(name = "metagraph")]
#[command(about = "Write entity and relationship records to the metadata graph")]
struct Cli {
    /// Config file prefix (default: metagraph).
    #[arg(short, long, default_value = "metagraph")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a JSON batch of entities and relationships.
    Apply { file: PathBuf },

    /// Delete entities together with all their edges.
    RemoveEntities {
        #[arg(required = true)]
        urns: Vec<Urn>,
    },

    /// Print a node's properties as JSON.
    Inspect {
        urn: Urn,

        /// Also print the outgoing edges with this label.
        #[arg(long)]
        outgoing: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let registry = TypeRegistry::global_or_init(config.entity_types.iter().cloned())?;
    if registry.is_empty() {
        tracing::warn!("No entity types configured, every node will be labeled UNKNOWN");
    }

    let store = Neo4jStore::connect(&config.neo4j).await?;
    let writer = GraphWriter::with_config(store, registry, &config.writer);
    writer.add_metric_listener(Arc::new(TracingMetricListener));

    match cli.command {
        Command::Apply { file } => {
            let batch = RecordBatch::from_path(&file)?;
            batch.apply(&writer).await?;
        }
        Command::RemoveEntities { urns } => {
            writer.remove_entities(&urns).await?;
        }
        Command::Inspect { urn, outgoing } => {
            let Some(node) = writer.get_node(&urn).await? else {
                anyhow::bail!("No node found for {urn}");
            };
            println!("{}", serde_json::to_string_pretty(&node)?);

            if let Some(label) = outgoing {
                let edges = writer.get_edges_from_source(&urn, &label).await?;
                println!("{}", serde_json::to_string_pretty(&edges)?);
            }
        }
    }

    Ok(())
}
