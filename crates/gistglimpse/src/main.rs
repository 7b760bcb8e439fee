use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use gistglimpse::app::preview::PreviewService;
use gistglimpse::app::render::{self, OutputFormat};
use gistglimpse::infra::clipboard::Clipboard;
use gistglimpse::infra::config::Config;

#[derive(Parser)]
#[command(author, version, about = "Instant previews for GitHub Gists", long_about = None)]
struct Cli {
    /// Emit debug logs to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical gist id for a URL or id
    Resolve { input: String },
    /// Fetch a gist and fuse its HTML, CSS and JavaScript into one preview
    Preview {
        /// Gist URL or id
        input: String,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Write the output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Copy a shareable link to the clipboard
        #[arg(long)]
        copy_link: bool,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    gistglimpse::init(cli.verbose);

    match cli.command {
        Commands::Resolve { input } => {
            let config = Config::load()?;
            let service = PreviewService::from_config(&config)?;
            let id = service.resolve(&input)?;
            println!("{id}");
        }
        Commands::Preview {
            input,
            format,
            output,
            copy_link,
        } => {
            let config = Config::load()?;
            let format = match format {
                Some(format) => format,
                None => config
                    .preview
                    .format()
                    .parse()
                    .context("invalid preview format in configuration")?,
            };
            let service = PreviewService::from_config(&config)?;
            let outcome = service.preview(&input).await?;
            let rendered = service.render(&outcome, format)?;

            match output {
                Some(path) => {
                    render::write_output(&path, &rendered)?;
                    eprintln!("wrote {} preview to {}", format.as_str(), path.display());
                }
                None => println!("{rendered}"),
            }

            if copy_link {
                let link = Clipboard::new()
                    .copy_share_link(config.preview.share_base_url(), &outcome.id)?;
                eprintln!("copied {link}");
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
        }
    }

    Ok(())
}
