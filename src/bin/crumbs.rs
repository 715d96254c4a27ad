//! crumbs CLI tool
//!
//! Command-line interface for building a note graph with crumbs-core and querying it.
//!
//! ## Commands
//!
//! - `edges`: Rebuild the graph and print every edge
//! - `trail <note>`: Print the breadcrumb trails of a note
//! - `list-index <note>`: Print the nested list of everything below a note
//! - `freeze <note>`: Print a note's implied edges as field text
//!
//! Every command reads the settings file (`--config`, defaults when missing) and an input file
//! listing notes and field edges (`--input`).

use clap::{Parser, Subcommand, ValueEnum};
use crumbs_core::{
    codec::stringify_edges,
    config::{ConfigProvider, Settings, TomlConfigProvider},
    freeze::{freeze_implied_edges, FreezeDestination},
    graph::{CrumbGraph, Edge},
    list_index::build_list_index,
    rebuild::{rebuild, ExplicitInput},
    trail::{build_trail, TrailSelection},
    CrumbsError,
};
use std::{fs::read_to_string, path::PathBuf};

#[derive(Parser)]
#[command(name = "crumbs")]
#[command(author, version, about = "A tool for building and querying note hierarchies", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true, default_value = "crumbs.toml")]
    config: PathBuf,

    /// Notes and field edges (TOML)
    #[arg(short, long, global = true, default_value = "notes.toml")]
    input: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Destination {
    Frontmatter,
    DataviewInline,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the graph and print every edge
    Edges {
        /// Print edges as JSON instead of their text encoding
        #[arg(long)]
        json: bool,
    },

    /// Print the breadcrumb trails of a note
    Trail {
        note: String,

        /// Only the shortest trail
        #[arg(long)]
        shortest: bool,

        /// Separator between trail entries
        #[arg(long, default_value = " > ")]
        separator: String,
    },

    /// Print the nested list of everything below a note
    ListIndex { note: String },

    /// Print a note's implied edges as field text
    Freeze {
        note: String,

        /// Overrides the destination from the settings file
        #[arg(long, value_enum)]
        destination: Option<Destination>,
    },
}

fn load(cli: &Cli) -> Result<(Settings, CrumbGraph), CrumbsError> {
    let settings = TomlConfigProvider::new(cli.config.clone()).get_settings()?;
    let input = ExplicitInput::from_toml_str(&read_to_string(&cli.input)?)?;
    let edges = input.resolve(&settings)?;
    let (graph, report) = rebuild(&settings, input.notes, edges)?;
    for failure in report.implied.failures.iter() {
        tracing::warn!(
            "hierarchy {}: rule {} skipped: {}",
            failure.hierarchy,
            failure.rule,
            failure.reason
        );
    }
    Ok((settings, graph))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (mut settings, graph) = load(&cli)?;

    match cli.command {
        Commands::Edges { json } => {
            if json {
                let edges = graph.edges().map(|e| e.to_edge()).collect::<Vec<Edge>>();
                println!("{}", serde_json::to_string_pretty(&edges)?);
            } else {
                for line in stringify_edges(&graph) {
                    println!("{line}");
                }
            }
        }
        Commands::Trail {
            note,
            shortest,
            separator,
        } => {
            if shortest {
                settings.trail.selection = TrailSelection::Shortest;
            }
            let trail = build_trail(&graph, &note, &settings.trail);
            if trail.is_empty() {
                tracing::info!("No trail for '{note}'");
            }
            for line in trail.render(&separator) {
                println!("{line}");
            }
        }
        Commands::ListIndex { note } => {
            print!("{}", build_list_index(&graph, &note, &settings.list_index));
        }
        Commands::Freeze { note, destination } => {
            let destination = match destination {
                Some(Destination::Frontmatter) => FreezeDestination::Frontmatter,
                Some(Destination::DataviewInline) => FreezeDestination::DataviewInline,
                None => settings.freeze_destination,
            };
            print!("{}", freeze_implied_edges(&graph, &note, destination)?);
        }
    }

    Ok(())
}
