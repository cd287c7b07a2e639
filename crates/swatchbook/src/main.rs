//! Swatchbook CLI - browse and preview a library of template components.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "swatchbook")]
#[command(about = "Browse and preview a library of template components")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to swatchbook.toml config file
    #[arg(short, long, default_value = "swatchbook.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the component library server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Reload templates when files change
        #[arg(long)]
        watch: bool,

        /// Open browser on start
        #[arg(long)]
        open: bool,
    },

    /// Scaffold a component library in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the component catalog as JSON
    Catalog {
        /// Catalog the examples directory instead of the components
        #[arg(long)]
        examples: bool,
    },

    /// Render one component example to stdout
    Preview {
        /// Component name
        component: String,

        /// Example name (defaults to "default")
        example: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Serve {
            port,
            host,
            watch,
            open,
        } => {
            let options = commands::serve::ServeOptions {
                port,
                host,
                watch,
                open,
            };
            commands::serve::run(&cli.config, options).await?;
        }
        Commands::Init { yes } => {
            commands::init::run(Path::new("."), yes)?;
        }
        Commands::Catalog { examples } => {
            commands::catalog::run(&cli.config, examples)?;
        }
        Commands::Preview { component, example } => {
            commands::preview::run(&cli.config, &component, example.as_deref())?;
        }
    }

    Ok(())
}
