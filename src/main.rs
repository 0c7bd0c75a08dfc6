use blogpress::console::{Notice, ServeConsole};
use blogpress::handlers::{run_init, run_serve};
use clap::Parser;
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[clap(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create a blog.toml and an empty posts file
    Init {
        /// directory name
        dir: String,
        /// overwrite an existing blog.toml without asking
        #[arg(long)]
        yes: bool,
    },
    /// Serve the public blog and the admin page
    Serve {
        #[arg(long, default_value = blogpress::config::CONFIG_FILE)]
        config: PathBuf,
        /// log every request
        #[arg(long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install()?;
    let args = Args::parse();

    let verbose = matches!(&args.command, Command::Serve { verbose: true, .. });
    let filter = if verbose {
        EnvFilter::new("info,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Init { dir, yes } => run_init(Path::new(&dir), !yes).await,
        Command::Serve { config, .. } => {
            let mut console = ServeConsole::start()?;
            if let Err(report) = run_serve(&mut console, &config).await {
                console.notice(Notice::Failure(report))?;
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
