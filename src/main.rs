//! CLI entry point for mdpress

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mdpress")]
#[command(version)]
#[command(about = "A hybrid static/on-demand blog engine", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,
    },

    /// Build the static site
    #[command(alias = "b")]
    Build {
        /// Include draft CMS content instead of published
        #[arg(long)]
        preview: bool,
    },

    /// Start the blog server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Serve draft CMS content instead of published
        #[arg(long)]
        preview: bool,
    },

    /// List posts from the merged content view
    List {
        /// Include draft CMS content instead of published
        #[arg(long)]
        preview: bool,
    },

    /// Clean the public folder
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdpress=debug,info"
    } else {
        "mdpress=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            mdpress::commands::init::init_site(&target_dir)?;
            println!("Initialized empty blog in {:?}", target_dir);
        }

        Commands::New { title } => {
            let press = mdpress::Press::new(&base_dir)?;
            tracing::info!("Creating new post: {}", title);
            press.new_post(&title)?;
        }

        Commands::Build { preview } => {
            let press = mdpress::Press::new(&base_dir)?;
            tracing::info!("Building static site...");
            press.build(preview || press.config.render_drafts)?;
            println!("Built successfully!");
        }

        Commands::Server { port, ip, preview } => {
            let press = mdpress::Press::new(&base_dir)?;

            // Build first so known slugs are served as static files
            let effective_preview = preview || press.config.render_drafts;
            tracing::info!("Building static site...");
            press.build(effective_preview)?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            mdpress::server::start(&press, &ip, port, effective_preview).await?;
        }

        Commands::List { preview } => {
            let press = mdpress::Press::new(&base_dir)?;
            mdpress::commands::list::run(&press, preview || press.config.render_drafts)?;
        }

        Commands::Clean => {
            let press = mdpress::Press::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            press.clean()?;
            println!("Cleaned successfully!");
        }
    }

    Ok(())
}
