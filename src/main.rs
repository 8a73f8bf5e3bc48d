use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use commitgraph_core::{
    AuthenticationContext, Config, FsRepositoryService, GraphPage, GraphPageService, RepositoryKey,
    User,
};
use graph::{LabelIndex, PageRequest};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "commitgraph")]
#[command(about = "Paged commit graph with branch and tag labels", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./commitgraph.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding <project>/<slug> repositories, overrides the config
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the commit graph
    Page {
        /// Repository as PROJECT/slug
        repository: String,
        /// Page number, 1-indexed; missing, invalid or below 1 means page 1
        #[arg(short, long, allow_hyphen_values = true)]
        page: Option<String>,
        /// Commits per page (defaults to the configured page size)
        #[arg(short, long)]
        size: Option<usize>,
        /// Acting user (defaults to $USER)
        #[arg(short, long)]
        user: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show which branches and tags point at which commits
    Labels {
        /// Repository as PROJECT/slug
        repository: String,
        /// Acting user (defaults to $USER)
        #[arg(short, long)]
        user: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List repositories under the root
    Repos,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        Config::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(root) = cli.root {
        config.repositories_root = root;
    }
    init_logging(cli.verbose, &config.log_level);

    let auth = AuthenticationContext::new(config.users.iter().cloned());
    let repositories = FsRepositoryService::new(&config.repositories_root);
    let service = GraphPageService::new(repositories, &config);

    match cli.command {
        Commands::Page { repository, page, size, user, json } => {
            let key = parse_key(&repository)?;
            let user = acting_user(&auth, user);
            let page = PageRequest::parse_page_number(page.as_deref());
            let graph_page = service
                .graph_page(&key, user.as_ref(), page, size)
                .with_context(|| format!("Failed to load commit graph of {key}"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&graph_page)?);
            } else {
                print_page(&graph_page);
            }
        }
        Commands::Labels { repository, user, json } => {
            let key = parse_key(&repository)?;
            let user = acting_user(&auth, user);
            let labels = service
                .labels(&key, user.as_ref())
                .with_context(|| format!("Failed to load labels of {key}"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&labels)?);
            } else {
                print_labels(&labels);
            }
        }
        Commands::Repos => {
            for key in service.repositories().list()? {
                println!("{key}");
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured.parse().unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_key(repository: &str) -> Result<RepositoryKey> {
    RepositoryKey::parse(repository)
        .with_context(|| format!("Expected PROJECT/slug, got '{repository}'"))
}

fn acting_user(auth: &AuthenticationContext, name: Option<String>) -> Option<User> {
    let name = name.or_else(|| std::env::var("USER").ok());
    auth.current_user(name.as_deref())
}

fn print_page(graph_page: &GraphPage) {
    for detail in &graph_page.page {
        let labels: Vec<&str> = graph_page
            .labels
            .get(&detail.id)
            .iter()
            .map(|r| r.display_id.as_str())
            .collect();
        let decoration = if labels.is_empty() {
            String::new()
        } else {
            format!(" ({})", labels.join(", "))
        };

        println!("commit {}{}", detail.display_id, decoration);
        println!("Author: {} <{}>", detail.author.name, detail.author.email);
        println!("Date:   {}", detail.author_timestamp.format("%Y-%m-%d %H:%M:%S %z"));
        println!("\n    {}\n", detail.summary());
    }

    let (number, repository) = (graph_page.page_number(), &graph_page.repository);
    match graph_page.page.next_page_number() {
        Some(next) => println!("-- page {number} of {repository}, next: {next} --"),
        None => println!("-- page {number} of {repository}, end of history --"),
    }
}

fn print_labels(labels: &LabelIndex) {
    for (commit, refs) in labels.iter() {
        let names: Vec<&str> = refs.iter().map(|r| r.id.as_str()).collect();
        println!("{} {}", commit.short(), names.join(" "));
    }
}
