//! Interactive workbench entry point.
//!
//! This binary provides a command-line shell for the search-and-refine
//! workflow: vector-search journal articles, search subject terms, refine
//! the selection through the interactive term tree, filter and rank the
//! candidate articles, and summarize the survivors with an LLM.
//!
//! # Examples
//!
//! Start the shell against a local dataset:
//! ```bash
//! medgraph --weaviate-url https://my-cluster.weaviate.network --dataset articles.json
//! ```
//!
//! Download the dataset from a hosted workspace first:
//! ```bash
//! medgraph --weaviate-url https://my-cluster.weaviate.network \
//!     --dataset articles.json \
//!     --workspace-host my-workspace.cloud.databricks.com \
//!     --workspace-path /Shared/articles.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use medgraph_rag::{
    app::Workbench,
    graph::{download::WorkspaceExport, memory::MemoryGraphStore, RankedArticle},
    llm::openai::OpenAiChat,
    models::ArticlePreview,
    render::RenderLine,
    search::weaviate::WeaviateClient,
    thesaurus::mesh::MeshSparqlClient,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type CliWorkbench = Workbench<WeaviateClient, MeshSparqlClient, MemoryGraphStore, OpenAiChat>;

/// Interactive article search and refinement shell
#[derive(Parser, Debug)]
#[command(
    name = "medgraph",
    version,
    about = "Search medical articles, refine by subject term, and summarize",
    long_about = "Interactive shell for the search-and-refine workflow. Vector search runs \
                  against a Weaviate cluster, subject-term expansion against the MeSH SPARQL \
                  endpoint, filtering against a local article dataset, and summarization \
                  against the OpenAI chat API.

Requires the WEAVIATE_API_KEY and OPENAI_API_KEY environment variables.

EXAMPLES:
  Local dataset:
    medgraph --weaviate-url https://my-cluster.weaviate.network --dataset articles.json

  Download the dataset from a hosted workspace first:
    medgraph --weaviate-url https://my-cluster.weaviate.network --dataset articles.json \\
        --workspace-host my-workspace.cloud.databricks.com --workspace-path /Shared/articles.json"
)]
struct Args {
    /// Weaviate cluster URL
    #[arg(long, value_name = "URL")]
    weaviate_url: String,

    /// Local path of the article dataset (JSON rows)
    #[arg(long, value_name = "PATH")]
    dataset: PathBuf,

    /// Workspace host to download the dataset from, if it is not local yet
    #[arg(long, value_name = "HOST", requires = "workspace_path")]
    workspace_host: Option<String>,

    /// Workspace path of the dataset on the host
    #[arg(long, value_name = "PATH", requires = "workspace_host")]
    workspace_path: Option<String>,

    /// Chat model used for summarization
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Logging verbosity level
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    log_level: String,
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();
}

fn print_help() {
    println!("Commands:");
    println!("  search <query>    - Vector-search articles");
    println!("  terms <query>     - Search subject terms and rebuild the term tree");
    println!("  tree              - Show the term tree");
    println!("  select <term>     - Toggle a term's selection");
    println!("  expand <id>       - Toggle a tree node's expansion");
    println!("  selected          - List selected terms");
    println!("  filter            - Filter candidate articles by the selected terms");
    println!("  instruct <text>   - Replace the summarization instruction");
    println!("  summarize         - Summarize the filtered articles");
    println!("  help              - Show this help");
    println!("  Ctrl+D or Ctrl+C  - Exit");
}

/// Format article search previews as a table
fn format_previews_table(previews: &[ArticlePreview]) -> String {
    if previews.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Abstract").add_attribute(Attribute::Bold),
        Cell::new("Subject Terms").add_attribute(Attribute::Bold),
        Cell::new("Distance").add_attribute(Attribute::Bold),
    ]);

    for (idx, preview) in previews.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("{}", idx + 1)),
            Cell::new(&preview.title),
            Cell::new(&preview.abstract_preview),
            Cell::new(preview.mesh_terms.join(", ")),
            Cell::new(format!("{:.4}", preview.distance)),
        ]);
    }

    table.to_string()
}

/// Format filtered, ranked articles as a table
fn format_ranked_table(ranked: &[RankedArticle]) -> String {
    if ranked.is_empty() {
        return "No articles matched the selected terms.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Published").add_attribute(Attribute::Bold),
        Cell::new("Access").add_attribute(Attribute::Bold),
        Cell::new("Matched Terms").add_attribute(Attribute::Bold),
    ]);

    for (idx, article) in ranked.iter().enumerate() {
        table.add_row(vec![
            Cell::new(format!("{}", idx + 1)),
            Cell::new(&article.title),
            Cell::new(&article.date_published),
            Cell::new(&article.access),
            Cell::new(format!("{}", article.matched_terms.len())),
        ]);
    }

    table.to_string()
}

/// Print the term tree with indentation, selection markers, and node ids.
fn print_tree(lines: &[RenderLine]) {
    if lines.is_empty() {
        println!("The term tree is empty. Run `terms <query>` first.");
        return;
    }
    for line in lines {
        match line {
            RenderLine::Term {
                id,
                term,
                level,
                selected,
                expanded,
            } => {
                let indent = "  ".repeat(*level);
                let check = if *selected { "[x]" } else { "[ ]" };
                let toggle = if *expanded { "(-)" } else { "(+)" };
                println!("{indent}{check} {toggle} {term}  #{id}");
            }
            RenderLine::AltName {
                id,
                name,
                level,
                selected,
            } => {
                let indent = "  ".repeat(*level + 1);
                let check = if *selected { "[x]" } else { "[ ]" };
                println!("{indent}{check}     {name}  #{id}");
            }
            RenderLine::NarrowerHeading { concept, level } => {
                let indent = "  ".repeat(*level + 1);
                println!("{indent}narrower under {concept}:");
            }
            RenderLine::Cycle { id, term, level } => {
                let indent = "  ".repeat(*level);
                println!("{indent}    {term} (already shown as #{id})");
            }
        }
    }
}

async fn handle_line(bench: &mut CliWorkbench, line: &str) {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "help" => print_help(),
        "search" => {
            if rest.is_empty() {
                eprintln!("Usage: search <query>");
                return;
            }
            match bench.search_articles(rest).await {
                Ok(previews) => {
                    println!("{}", format_previews_table(previews));
                    println!(
                        "\nCaptured {} candidate articles for filtering",
                        bench.candidate_uris().len()
                    );
                }
                Err(e) => eprintln!("Article search failed: {e}"),
            }
        }
        "terms" => {
            if rest.is_empty() {
                eprintln!("Usage: terms <query>");
                return;
            }
            match bench.search_terms(rest).await {
                Ok(roots) => {
                    println!("Found {} root terms:", roots.len());
                    let lines = bench.render_forest();
                    print_tree(&lines);
                }
                Err(e) => eprintln!("Term search failed: {e}"),
            }
        }
        "tree" => {
            let lines = bench.render_forest();
            print_tree(&lines);
        }
        "select" => {
            if rest.is_empty() {
                eprintln!("Usage: select <term>");
                return;
            }
            let now_selected = bench.toggle_selection(rest);
            if now_selected {
                println!("Selected: {rest}");
            } else {
                println!("Deselected: {rest}");
            }
        }
        "expand" => {
            let id = match rest.parse::<u64>() {
                Ok(id) => id,
                Err(_) => {
                    eprintln!("Usage: expand <id>   (ids are the #N markers in the tree)");
                    return;
                }
            };
            match bench.toggle_expansion(id).await {
                Ok(true) => {
                    let lines = bench.render_forest();
                    print_tree(&lines);
                }
                Ok(false) => println!("Collapsed #{id}"),
                Err(e) => eprintln!("Expansion failed: {e}"),
            }
        }
        "selected" => {
            let selected = bench.selected_terms();
            if selected.is_empty() {
                println!("No terms selected.");
            } else {
                for term in selected {
                    println!("  {term}");
                }
            }
        }
        "filter" => match bench.filter_articles().await {
            Ok(ranked) => println!("{}", format_ranked_table(ranked)),
            Err(e) => eprintln!("Filtering failed: {e}"),
        },
        "instruct" => {
            if rest.is_empty() {
                println!("Current instruction: {}", bench.instruction());
                return;
            }
            bench.set_instruction(rest.to_string());
            println!("Instruction updated.");
        }
        "summarize" => match bench.summarize().await {
            Ok(summary) => println!("\n{summary}\n"),
            Err(e) => eprintln!("Summarization failed: {e}"),
        },
        other => eprintln!("Unknown command: {other}. Type `help` for available commands."),
    }
}

async fn run_shell(mut bench: CliWorkbench) -> Result<()> {
    println!("Medical article search and refinement shell");
    print_help();
    println!();

    let mut rl = DefaultEditor::new().with_context(|| "Failed to create readline editor")?;

    loop {
        match rl.readline("medgraph> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line).ok();
                handle_line(&mut bench, line).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                error!("Error reading input: {}", err);
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level);

    let weaviate_key = std::env::var("WEAVIATE_API_KEY").with_context(|| {
        "WEAVIATE_API_KEY environment variable required for vector search.\n\
         Set it with: export WEAVIATE_API_KEY=your-api-key"
    })?;
    let openai_key = std::env::var("OPENAI_API_KEY").with_context(|| {
        "OPENAI_API_KEY environment variable required for vectorization and summarization.\n\
         Set it with: export OPENAI_API_KEY=your-api-key"
    })?;

    // Fetch the dataset from the workspace if it is not already local.
    if let (Some(host), Some(path)) = (&args.workspace_host, &args.workspace_path) {
        let token = std::env::var("WORKSPACE_TOKEN").with_context(|| {
            "WORKSPACE_TOKEN environment variable required to download the dataset.\n\
             Set it with: export WORKSPACE_TOKEN=your-token"
        })?;
        let export = WorkspaceExport::new(host.clone(), token)
            .with_context(|| "Failed to create workspace client")?;
        let downloaded = export
            .download(path, &args.dataset)
            .await
            .with_context(|| format!("Failed to download dataset from {host}"))?;
        if downloaded {
            info!("Downloaded dataset to {}", args.dataset.display());
        } else {
            info!("Dataset already present at {}", args.dataset.display());
        }
    }

    if !args.dataset.exists() {
        anyhow::bail!(
            "Dataset file not found: {}\n\
             Provide --workspace-host/--workspace-path to download it.",
            args.dataset.display()
        );
    }

    let graph = MemoryGraphStore::from_json_file(&args.dataset)
        .await
        .with_context(|| format!("Failed to load dataset from {}", args.dataset.display()))?;
    info!("Loaded {} dataset rows", graph.len());

    let vector = WeaviateClient::new(args.weaviate_url, weaviate_key, openai_key.clone())
        .with_context(|| "Failed to create vector search client")?;
    let thesaurus = MeshSparqlClient::new().with_context(|| "Failed to create MeSH client")?;
    let summarizer =
        OpenAiChat::new(openai_key, args.model).with_context(|| "Failed to create chat client")?;

    let bench = Workbench::new(vector, thesaurus, graph, summarizer);
    run_shell(bench).await
}
