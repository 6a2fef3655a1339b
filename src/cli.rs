//! Command-line surface: argument definitions plus the handler functions
//! `main` dispatches to.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::fs::reader::DirectoryClassSource;
use crate::app::engine::AnalysisEngine;
use crate::classfile::DecodeOptions;
use crate::domain::graph::GraphView;
use crate::domain::metrics::MetricsConfig;
use crate::domain::ports::{ClassFileBuffer, ClassFileSource};

#[derive(Debug, Parser)]
#[command(name = "classdep")]
#[command(about = "Decode JVM class files and analyze their dependency structure")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode class files and print their metadata.
    Classes {
        /// `.class` files or directories to scan recursively.
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(long)]
        include_private: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Build a dependency graph over the decoded classes.
    Graph {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = View::Class)]
        view: View,

        #[arg(long)]
        include_private: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Report dependency cycles in the chosen graph view.
    Cycles {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = View::Class)]
        view: View,

        #[arg(long)]
        include_private: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Compute connectivity metrics for the chosen graph view.
    Metrics {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(long, value_enum, default_value_t = View::Class)]
        view: View,

        /// Minimum degree for the highly-connected report.
        #[arg(long, value_name = "N", default_value_t = 3)]
        hub_floor: usize,

        #[arg(long)]
        include_private: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum View {
    Class,
    Package,
    Inheritance,
    CallGraph,
}

impl From<View> for GraphView {
    fn from(view: View) -> Self {
        match view {
            View::Class => GraphView::Class,
            View::Package => GraphView::Package,
            View::Inheritance => GraphView::Inheritance,
            View::CallGraph => GraphView::CallGraph,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum Format {
    Json,
    Text,
}

fn load_buffers(paths: &[PathBuf]) -> Result<Vec<ClassFileBuffer>> {
    let source = DirectoryClassSource::new(paths.to_vec());
    let buffers = source.load().context("Failed to collect class files")?;
    if buffers.is_empty() {
        anyhow::bail!("No .class files found under the given paths");
    }
    Ok(buffers)
}

fn engine_for(include_private: bool) -> AnalysisEngine {
    AnalysisEngine::new(DecodeOptions { include_private })
}

fn print_failures(failures: &[crate::app::dto::DecodeFailure]) {
    for failure in failures {
        eprintln!("warning: {}: {}", failure.source, failure.message);
    }
}

pub fn run_classes(paths: &[PathBuf], include_private: bool, format: Format) -> Result<()> {
    let buffers = load_buffers(paths)?;
    let engine = engine_for(include_private);
    let outcome = engine.decode_batch(&buffers);
    print_failures(&outcome.failures);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        Format::Text => {
            for class in &outcome.classes {
                println!(
                    "{} [{}] version {} ({} fields, {} methods)",
                    class.name,
                    class.category.as_str(),
                    class.version.label,
                    class.fields.len(),
                    class.methods.len()
                );
            }
            println!(
                "\n{} decoded, {} failed",
                outcome.decoded_count(),
                outcome.failure_count()
            );
        }
    }
    Ok(())
}

pub fn run_graph(paths: &[PathBuf], view: View, include_private: bool, format: Format) -> Result<()> {
    let buffers = load_buffers(paths)?;
    let engine = engine_for(include_private);
    let outcome = engine.decode_batch(&buffers);
    print_failures(&outcome.failures);

    let graph = engine.build_graph(&outcome.classes, view.into());
    let report = engine.graph_report(&graph);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => {
            println!(
                "{} nodes, {} edges",
                report.stats.node_count, report.stats.edge_count
            );
            for (kind, count) in &report.stats.nodes_by_kind {
                println!("  {kind}: {count}");
            }
            for (kind, count) in &report.stats.edges_by_kind {
                println!("  {kind}: {count}");
            }
            for edge in &report.edges {
                println!(
                    "  {} -> {} [{}] x{}",
                    edge.source,
                    edge.target,
                    edge.kind.as_str(),
                    edge.weight
                );
            }
        }
    }
    Ok(())
}

pub fn run_cycles(paths: &[PathBuf], view: View, include_private: bool, format: Format) -> Result<()> {
    let buffers = load_buffers(paths)?;
    let engine = engine_for(include_private);
    let outcome = engine.decode_batch(&buffers);
    print_failures(&outcome.failures);

    let graph = engine.build_graph(&outcome.classes, view.into());
    let report = engine.find_cycles(&graph);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => {
            if report.cycles.is_empty() {
                println!("No cycles found");
            } else {
                println!("{} cycle(s):", report.cycle_count);
                for cycle in &report.cycles {
                    println!("  {}", cycle.nodes.join(" -> "));
                }
            }
        }
    }
    Ok(())
}

pub fn run_metrics(
    paths: &[PathBuf],
    view: View,
    hub_floor: usize,
    include_private: bool,
    format: Format,
) -> Result<()> {
    let buffers = load_buffers(paths)?;
    let engine = engine_for(include_private).with_metrics_config(MetricsConfig { hub_floor });
    let outcome = engine.decode_batch(&buffers);
    print_failures(&outcome.failures);

    let graph = engine.build_graph(&outcome.classes, view.into());
    let report = engine.metrics_report(&graph);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => {
            let metrics = &report.metrics;
            println!("Nodes:   {}", metrics.node_count);
            println!("Edges:   {}", metrics.edge_count);
            println!("Density: {:.4}", metrics.density);
            println!("Hubs:    {}", metrics.highly_connected.join(", "));
            println!("Orphans: {}", metrics.orphans.join(", "));
            println!("Cycles:  {}", metrics.cycles.len());
        }
    }
    Ok(())
}
