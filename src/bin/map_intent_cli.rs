//! map-intent CLI
//!
//! Reads utterances line by line from stdin, interprets each one and prints
//! the outcome. The map is the in-memory surface, so this is a way to watch
//! the engine's decisions without a renderer.
//!
//! Usage:
//!   cargo run --features cli --bin map-intent -- \
//!     --catalog config/layer_config.json \
//!     --gazetteer config/locations_data.json \
//!     --ner-url http://localhost:8000/ner
//!
//! Lines starting with `:` are layer-list commands:
//!   :layers                  list active layers
//!   :catalog                 list catalog layers with indices
//!   :activate <idx> [var]    activate a catalog layer (variant index for regional layers)
//!   :toggle <title>          flip visibility
//!   :remove <title>          remove by title
//!   :mode auto|interactive   switch disambiguation mode
//!
//! Appending a layer to the catalog:
//!   cargo run --features cli --bin map-intent -- \
//!     --catalog config/layer_config.json --append-layer new_layer.json

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use colored::Colorize;
use reqwest::Client;

use map_intent::config::{append_layer, load_catalog, load_gazetteer};
use map_intent::location::NominatimClient;
use map_intent::matcher::HttpSimilarityClient;
use map_intent::router::SequenceReport;
use map_intent::surface::AcceptAllDialog;
use map_intent::{
    Activation, Collaborators, CommandRouter, DisambiguationMode, DispatchOutcome, EngineConfig,
    HttpNerClient, InMemorySurface, LexicalSimilarity, MatchCandidate, SelectionDialog,
    SimilarityScorer,
};

/// Natural-language map command interpreter
#[derive(Parser, Debug)]
#[command(name = "map-intent")]
#[command(about = "Interpret map commands against a layer catalog")]
struct Args {
    /// Layer catalog JSON (`{"layers": [...]}`)
    #[arg(long, short = 'c', env = "MAP_INTENT_CATALOG")]
    catalog: PathBuf,

    /// Gazetteer JSON (`{"locations": [...]}`)
    #[arg(long, short = 'g', env = "MAP_INTENT_GAZETTEER")]
    gazetteer: Option<PathBuf>,

    /// Engine configuration YAML
    #[arg(long, env = "MAP_INTENT_CONFIG")]
    config: Option<PathBuf>,

    /// Token-classification endpoint (overrides config)
    #[arg(long)]
    ner_url: Option<String>,

    /// Similarity endpoint (overrides config); lexical scoring when absent
    #[arg(long)]
    similarity_url: Option<String>,

    /// Ask before activating layers
    #[arg(long, short = 'i')]
    interactive: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Append the layer in this JSON file to the catalog and exit
    #[arg(long)]
    append_layer: Option<PathBuf>,
}

/// Numbered prompt on stdout, answer read from stdin
struct PromptDialog;

#[async_trait]
impl SelectionDialog for PromptDialog {
    async fn present_choices(&self, candidates: &[MatchCandidate]) -> Vec<usize> {
        println!("{}", "Select layers (comma-separated numbers, empty to cancel):".cyan());
        for (i, candidate) in candidates.iter().enumerate() {
            println!("  [{}] {}", i + 1, candidate.label());
        }
        print!("> ");
        if let Err(e) = std::io::stdout().flush() {
            tracing::warn!(error = %e, "Could not flush selection prompt");
        }

        let read = tokio::task::spawn_blocking(|| {
            let mut answer = String::new();
            std::io::stdin().lock().read_line(&mut answer).map(|_| answer)
        })
        .await;
        let answer = match read {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Could not read selection");
                return vec![];
            }
            Err(e) => {
                tracing::warn!(error = %e, "Selection reader panicked");
                return vec![];
            }
        };
        answer
            .split(',')
            .filter_map(|part| part.trim().parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n - 1)
            .collect()
    }
}

fn print_outcome(outcome: &DispatchOutcome) {
    let line = outcome.summary();
    match outcome {
        DispatchOutcome::Removed { .. }
        | DispatchOutcome::LayersActivated { .. }
        | DispatchOutcome::Navigated { .. } => println!("{} {}", "✓".green(), line),
        DispatchOutcome::NerFailed { .. }
        | DispatchOutcome::NavigationFailed { .. }
        | DispatchOutcome::SurfaceFailed { .. } => println!("{} {}", "✗".red(), line),
        _ => println!("{} {}", "•".yellow(), line),
    }
}

fn print_actions(actions: &SequenceReport) {
    if actions.executed.is_empty() && actions.failed.is_empty() {
        return;
    }
    println!(
        "  actions: {} executed, {} failed{}",
        actions.executed.len(),
        actions.failed.len(),
        if actions.superseded { " (superseded)" } else { "" }
    );
}

async fn run_meta(router: &CommandRouter, line: &str) {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        ":layers" => {
            for layer in router.list_active() {
                let state = if layer.visible { "visible" } else { "hidden" };
                println!("  {} [{}]", layer.title, state.dimmed());
            }
        }
        ":catalog" => {
            for (i, layer) in router.catalog().iter().enumerate() {
                println!("  {} {}", i.to_string().bold(), layer.name);
                for (v, variant) in layer.variants().iter().enumerate() {
                    println!("      {} {}", v, variant.name.dimmed());
                }
            }
        }
        ":activate" => {
            let mut parts = rest.split_whitespace().map(str::parse::<usize>);
            let Some(Ok(index)) = parts.next() else {
                println!("{} usage: :activate <index> [variant]", "✗".red());
                return;
            };
            let variant = parts.next().and_then(Result::ok);
            match router.activate_layer(index, variant).await {
                Ok(Activation::Activated(title)) => {
                    println!("{} Activated: {}", "✓".green(), title)
                }
                Ok(Activation::AlreadyActive(title)) => {
                    println!("{} Already active: {}", "•".yellow(), title)
                }
                Ok(other) => println!("{} {:?}", "✗".red(), other),
                Err(e) => println!("{} {}", "✗".red(), e),
            }
        }
        ":toggle" => match router.toggle_visibility(rest).await {
            Ok(visible) => {
                let state = if visible { "visible" } else { "hidden" };
                println!("{} {} is now {}", "✓".green(), rest, state)
            }
            Err(e) => println!("{} {}", "✗".red(), e),
        },
        ":remove" => match router.remove_by_title(rest).await {
            Ok(()) => println!("{} Removed layer: {}", "✓".green(), rest),
            Err(e) => println!("{} {}", "✗".red(), e),
        },
        ":mode" => match rest.parse::<DisambiguationMode>() {
            Ok(mode) => router.set_disambiguation_mode(mode),
            Err(e) => println!("{} {}", "✗".red(), e),
        },
        other => println!("{} unknown command {}", "✗".red(), other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.append_layer {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        let layer = append_layer(&args.catalog, value)?;
        println!("{} Added layer: {}", "✓".green(), layer.name);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(url) = args.ner_url {
        config.services.ner_url = Some(url);
    }
    if let Some(url) = args.similarity_url {
        config.services.similarity_url = Some(url);
    }
    if args.interactive {
        config.disambiguation = DisambiguationMode::Interactive;
    }

    let catalog = load_catalog(&args.catalog)?;
    let gazetteer = match &args.gazetteer {
        Some(path) => load_gazetteer(path)?,
        None => Vec::new(),
    };

    let client = Client::builder()
        .timeout(config.services.request_timeout())
        .build()
        .context("building HTTP client")?;

    let ner_url = config
        .services
        .ner_url
        .clone()
        .context("no NER endpoint configured (set --ner-url or MAP_INTENT_NER_URL)")?;
    let scorer: Arc<dyn SimilarityScorer> = match &config.services.similarity_url {
        Some(url) => Arc::new(HttpSimilarityClient::new(client.clone(), url.clone())),
        None => Arc::new(LexicalSimilarity),
    };
    let dialog: Arc<dyn SelectionDialog> = match config.disambiguation {
        DisambiguationMode::Interactive => Arc::new(PromptDialog),
        DisambiguationMode::Automatic => Arc::new(AcceptAllDialog),
    };
    let surface = Arc::new(InMemorySurface::new());

    let router = CommandRouter::new(
        &config,
        catalog,
        gazetteer,
        Collaborators {
            ner: Arc::new(HttpNerClient::new(client.clone(), ner_url)),
            scorer,
            geocoder: Arc::new(NominatimClient::new(
                client,
                &config.services.geocoder_url,
                config.services.user_agent.clone(),
            )?),
            surface: surface.clone(),
            dialog,
        },
    );

    println!("{}", "map-intent ready. Type a command, Ctrl-D to quit.".bold());
    let stdin = std::io::stdin();
    loop {
        print!("{} ", ">".cyan());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(':') {
            run_meta(&router, line).await;
            continue;
        }

        let report = router.interpret(line).await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_outcome(&report.outcome);
            print_actions(&report.actions);
            if let Some(center) = surface.center() {
                println!(
                    "  view: {:.4}, {:.4} @ zoom {}",
                    center.lat,
                    center.lon,
                    surface.zoom()
                );
            }
        }
    }

    Ok(())
}
