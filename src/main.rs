use broadsheet::config::{self, SiteConfig, SourceKind};
use broadsheet::hosted::HostedClient;
use broadsheet::source::{ContentSource, open_source};
use broadsheet::{output, render};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "broadsheet")]
#[command(about = "Content access and preview builds for a news site")]
#[command(long_about = "\
Content access and preview builds for a news site

Articles come from a local content store or a hosted Content API and are
normalized into one model before rendering.

Content store layout:

  content/
  ├── articles/
  │   ├── budget-reply.mdoc            # Slug = file name; first by slug is featured
  │   ├── climate-policy.mdoc          # YAML frontmatter + Markdoc body
  │   └── voice-debate/index.mdoc      # Directory form
  ├── authors/
  │   └── sarah-mitchell.yaml          # name, bio, profileImage
  └── tags/
      └── politics.yaml                # name, description

The hosted source reads GHOST_URL and GHOST_CONTENT_API_KEY from the
environment when they are not set in broadsheet.toml.

Run 'broadsheet gen-config' to generate a documented broadsheet.toml.")]
#[command(version = env!("BROADSHEET_VERSION"))]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Content directory (overrides store.content_dir)
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Content source (overrides `source` in the config file)
    #[arg(long, value_enum, global = true)]
    source: Option<SourceArg>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    File,
    Hosted,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::File => SourceKind::File,
            SourceArg::Hosted => SourceKind::Hosted,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List every article
    List,
    /// Show one article by slug
    Show { slug: String },
    /// Show the featured article
    Featured,
    /// List authors
    Authors,
    /// List tags
    Tags,
    /// List articles with a tag
    Tag { slug: String },
    /// Render a static preview of the site
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Validate config and check the content source is readable
    Check,
    /// Print a stock broadsheet.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Default to info-level logs; override via RUST_LOG if needed.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let site = resolve_site_config(&cli)?;
    let source = open_source(&site)?;
    tracing::debug!(source = source.name(), "content source ready");

    match cli.command {
        Command::List => {
            let articles = source.all_articles().await;
            emit(cli.json, &articles, || {
                output::print_article_list(&format!("Articles ({})", source.name()), &articles)
            })?;
        }
        Command::Show { slug } => match source.article(&slug).await {
            Some(article) => emit(cli.json, &article, || output::print_article(&article))?,
            None => {
                eprintln!("Article not found: {slug}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Featured => match source.featured_article().await {
            Some(article) => emit(cli.json, &article, || output::print_article(&article))?,
            None => {
                eprintln!("No featured article");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Authors => {
            let authors = source.all_authors().await;
            emit(cli.json, &authors, || output::print_authors(&authors))?;
        }
        Command::Tags => {
            let tags = source.all_tags().await;
            emit(cli.json, &tags, || output::print_tags(&tags))?;
        }
        Command::Tag { slug } => {
            let articles = source.articles_by_tag(&slug).await;
            emit(cli.json, &articles, || {
                output::print_article_list(&format!("Tagged {slug}"), &articles)
            })?;
        }
        Command::Build { output: out_dir } => {
            println!("==> Building from {} source → {}", source.name(), out_dir.display());
            let summary = render::build_site(source.as_ref(), &site, &out_dir).await?;
            output::print_build_summary(&summary, &out_dir);
        }
        Command::Check => {
            if !check(&site, source.as_ref()).await {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => unreachable!("handled before the source is opened"),
    }

    Ok(ExitCode::SUCCESS)
}

/// Layer CLI flags over the file and environment configuration.
fn resolve_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut site = config::load_config_with_env(&cli.config)?;
    if let Some(content) = &cli.content {
        site.store.content_dir = content.to_string_lossy().into_owned();
    }
    if let Some(source) = cli.source {
        site.source = source.into();
    }
    Ok(site)
}

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    print: impl FnOnce(),
) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print();
    }
    Ok(())
}

/// Report what the configured source can see. Returns false when the hosted
/// API is unreachable.
async fn check(site: &SiteConfig, source: &dyn ContentSource) -> bool {
    println!("==> Config OK (source: {})", site.source);
    if site.source == SourceKind::Hosted {
        let reachable = match HostedClient::from_config(site) {
            Ok(client) => client.probe().await,
            Err(_) => false,
        };
        if !reachable {
            println!("==> Hosted API unreachable");
            return false;
        }
        println!("==> Hosted API reachable");
    } else {
        println!("==> Content directory: {}", site.store.content_dir);
    }

    let (articles, tags) = tokio::join!(source.all_articles(), source.all_tags());
    let unknown_authors = articles.iter().filter(|a| a.author.is_unknown()).count();
    println!("    {} articles, {} tags", articles.len(), tags.len());
    if unknown_authors > 0 {
        println!("    {} articles without a resolvable author", unknown_authors);
    }
    println!("==> Content is valid");
    true
}
