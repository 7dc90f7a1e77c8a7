//! gene-resolver CLI: resolve gene symbols and build feature filters.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use gene_resolver::config::ResolverConfig;
use gene_resolver::filter::render_filter;
use gene_resolver::gene::{Organism, StableId};
use gene_resolver::paths::GenePaths;
use gene_resolver::resolver::{
    accepted_ids, Candidate, DisambiguationPolicy, ResolutionResult, ResolutionStatus,
    ResolutionSummary,
};
use gene_resolver::store::var_table;

#[derive(Parser)]
#[command(name = "gene-resolver", version, about = "Gene symbol to stable identifier resolver")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/gene-resolver/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot directory, overriding the config.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Census version, overriding the config.
    #[arg(long, global = true)]
    census_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve gene symbols or stable IDs.
    Resolve {
        /// Gene symbols or IDs (space- or comma-separated, e.g. "TP53,BRCA1").
        #[arg(required = true)]
        genes: Vec<String>,

        /// Organism (defaults to the configured one).
        #[arg(long)]
        organism: Option<String>,

        /// Never auto-resolve ambiguous symbols.
        #[arg(long)]
        no_prefer: bool,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Render a filter fragment from stable IDs.
    Filter {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Build a snapshot from a tab-separated var table.
    Import {
        #[arg(long)]
        organism: String,

        /// TSV with feature_id, feature_name and feature_type columns.
        #[arg(long)]
        var_table: PathBuf,
    },

    /// Rebuild a snapshot from the configured var table directory.
    Refresh {
        #[arg(long)]
        organism: Option<String>,
    },

    /// Show snapshot statistics.
    Info {
        #[arg(long)]
        organism: Option<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = GenePaths::resolve()?;
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = ResolverConfig::load_or_default(&config_path)?;
    if let Some(version) = cli.census_version.clone() {
        config.census_version = version;
    }
    let cache_dir = cli
        .cache_dir
        .clone()
        .unwrap_or_else(|| config.cache_dir_or(&paths));

    let organism_or_default = |arg: Option<String>| -> Result<Organism> {
        match arg {
            Some(name) => Ok(name.parse::<Organism>()?),
            None => Ok(config.default_organism),
        }
    };

    match cli.command {
        Commands::Resolve {
            genes,
            organism,
            no_prefer,
            json,
        } => {
            let organism = organism_or_default(organism)?;
            let registry = Arc::new(config.registry(cache_dir));
            let resolver = config.resolver(registry);
            let policy = if no_prefer {
                DisambiguationPolicy::disabled()
            } else {
                resolver.policy().clone()
            };

            let tokens: Vec<&str> = genes
                .iter()
                .flat_map(|g| g.split(','))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            let results = resolver.resolve_with_policy(&tokens, organism, &policy)?;
            let summary = ResolutionSummary::from_results(&results);
            let accepted = accepted_ids(&results);
            let filter = render_filter(&accepted).ok();

            if json {
                let out = serde_json::json!({
                    "organism": organism,
                    "results": results,
                    "summary": summary,
                    "filter": filter,
                });
                println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
            } else {
                for r in &results {
                    println!("{}", describe(r));
                }
                match filter {
                    Some(f) => println!("\nfilter: {f}"),
                    None => println!("\nno identifiers accepted"),
                }
                if !summary.is_clean() {
                    println!(
                        "needs attention: {} ambiguous, {} not found",
                        summary.ambiguous.len(),
                        summary.not_found.len()
                    );
                }
            }
        }

        Commands::Filter { ids } => {
            let ids: Vec<StableId> = ids
                .iter()
                .flat_map(|s| s.split(','))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(StableId::new)
                .collect();
            println!("{}", render_filter(&ids)?);
        }

        Commands::Import {
            organism,
            var_table: table,
        } => {
            let organism: Organism = organism.parse()?;
            let records = var_table::read_path(&table)?;
            let registry = config.registry(cache_dir);
            let snap = registry.import(organism, records)?;
            println!(
                "Imported {} genes ({} symbols, {} ambiguous) into {}",
                snap.len(),
                snap.symbol_count(),
                snap.ambiguous_symbols().len(),
                registry.snapshot_path(organism).display()
            );
        }

        Commands::Refresh { organism } => {
            let organism = organism_or_default(organism)?;
            let registry = config.registry(cache_dir);
            let snap = registry.refresh(organism)?;
            println!(
                "Refreshed {organism}: {} genes, {} symbols",
                snap.len(),
                snap.symbol_count()
            );
        }

        Commands::Info { organism } => {
            let organism = organism_or_default(organism)?;
            let registry = config.registry(cache_dir);
            let snap = registry.load(organism)?;
            println!("gene dictionary: {}", organism.scientific_name());
            println!("  census version:    {}", snap.census_version());
            println!("  built at:          {}", snap.built_at());
            println!("  identifiers:       {}", snap.len());
            println!("  symbols:           {}", snap.symbol_count());
            println!("  ambiguous symbols: {}", snap.ambiguous_symbols().len());
            println!("  snapshot:          {}", registry.snapshot_path(organism).display());
        }
    }

    Ok(())
}

/// One-line human description of a resolution result.
fn describe(r: &ResolutionResult) -> String {
    let first = r
        .accepted
        .first()
        .map(ToString::to_string)
        .unwrap_or_default();

    match r.status {
        ResolutionStatus::Passthrough => format!("{} -> {first} [id]", r.query),
        ResolutionStatus::Unambiguous => format!(
            "{} -> {first} [{}]",
            r.query,
            r.canonical_name.as_deref().unwrap_or(&r.query)
        ),
        ResolutionStatus::AutoResolved => format!(
            "{} -> {first} [auto-resolved; skipped {}]",
            r.query,
            listed(r.skipped())
        ),
        ResolutionStatus::Ambiguous => {
            format!("{} -> ambiguous: {}", r.query, listed(r.candidates.iter()))
        }
        ResolutionStatus::NotFound => format!("{} -> not found", r.query),
    }
}

fn listed<'a>(cands: impl Iterator<Item = &'a Candidate>) -> String {
    cands
        .map(|c| format!("{} ({})", c.id, c.feature_type))
        .collect::<Vec<_>>()
        .join(", ")
}
