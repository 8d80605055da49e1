//! lafs CLI
//!
//! Command-line access to a Tahoe-LAFS node's web API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tahoe_client::{Children, ClientConfig, Format, Node, TahoeClient};

#[derive(Parser)]
#[command(name = "lafs")]
#[command(about = "Read and write a Tahoe-LAFS grid through a node's web API")]
#[command(version)]
struct Cli {
    /// Node address, e.g. http://127.0.0.1:3456
    #[arg(long, global = true, env = "TAHOE_NODE_URL")]
    node: Option<String>,

    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the content of a filecap
    Get {
        /// Filecap
        cap: String,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the content of a named file inside a directory
    Cat {
        /// Dircap of the root directory
        dircap: String,

        /// File name
        name: String,

        /// Directory between the root and the file (repeatable)
        #[arg(short, long = "subdir")]
        subdirs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show JSON metadata of a capability, or of a named child
    Info {
        /// Filecap or dircap
        cap: String,

        /// Child name inside the directory
        name: Option<String>,

        /// Directory between the root and the child (repeatable)
        #[arg(short, long = "subdir")]
        subdirs: Vec<String>,
    },

    /// Upload a file unattached to any directory
    Put {
        /// File path, or - for stdin
        file: String,

        /// CHK, SDMF or MDMF
        #[arg(short, long, default_value = "CHK")]
        format: Format,
    },

    /// Replace the content of a mutable filecap
    PutAt {
        /// Mutable filecap
        cap: String,

        /// File path, or - for stdin
        file: String,

        /// SDMF or MDMF
        #[arg(short, long, default_value = "SDMF")]
        format: Format,
    },

    /// Upload or replace a named file inside a directory
    Write {
        /// Dircap of the root directory
        dircap: String,

        /// File name
        name: String,

        /// File path, or - for stdin
        file: String,

        /// CHK, SDMF or MDMF
        #[arg(short, long, default_value = "CHK")]
        format: Format,

        /// Directory between the root and the file (repeatable)
        #[arg(short, long = "subdir")]
        subdirs: Vec<String>,
    },

    /// Create a new directory
    Mkdir {
        /// Create an immutable directory
        #[arg(long)]
        immutable: bool,

        /// SDMF or MDMF (mutable directories only)
        #[arg(short, long, default_value = "SDMF")]
        format: Format,

        /// Initial child as NAME=CAP (repeatable)
        #[arg(short, long = "child")]
        children: Vec<String>,
    },

    /// Create an empty directory inside a directory
    MkdirAt {
        /// Dircap of the root directory
        dircap: String,

        /// New directory name
        name: String,

        /// SDMF or MDMF
        #[arg(short, long, default_value = "SDMF")]
        format: Format,

        /// Directory between the root and the new one (repeatable)
        #[arg(short, long = "subdir")]
        subdirs: Vec<String>,
    },

    /// Link an existing capability under a name
    Ln {
        /// Dircap of the root directory
        dircap: String,

        /// Link name
        name: String,

        /// Capability to link
        target: String,

        /// Directory between the root and the link (repeatable)
        #[arg(short, long = "subdir")]
        subdirs: Vec<String>,

        /// Fail instead of replacing an existing name
        #[arg(long)]
        no_replace: bool,
    },

    /// Unlink a named child from a directory
    Rm {
        /// Dircap of the root directory
        dircap: String,

        /// Child name
        name: String,

        /// Directory between the root and the child (repeatable)
        #[arg(short, long = "subdir")]
        subdirs: Vec<String>,
    },

    /// Check share health of a capability
    Check {
        /// Filecap or dircap
        cap: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.node.as_deref(), cli.config.as_deref())?;
    let client = TahoeClient::new(config).context("Invalid node configuration")?;
    tracing::debug!(node = %client.base_url(), "using node");

    match cli.command {
        Commands::Get { cap, output } => {
            let content = client.read_filecap(&cap).await?;
            write_output(&content, output)
        }

        Commands::Cat { dircap, name, subdirs, output } => {
            let content = client.read_filename(&dircap, &name, &as_strs(&subdirs)).await?;
            write_output(&content, output)
        }

        Commands::Info { cap, name, subdirs } => {
            let node = match name {
                Some(name) => client.read_name_info(&cap, &name, &as_strs(&subdirs)).await?,
                None => client.read_capability_info(&cap).await?,
            };
            println!("{}", serde_json::to_string_pretty(&node)?);
            Ok(())
        }

        Commands::Put { file, format } => {
            let cap = client.upload_file(read_input(&file)?, format).await?;
            println!("{}", cap);
            Ok(())
        }

        Commands::PutAt { cap, file, format } => {
            let cap = client.upload_filecap(&cap, read_input(&file)?, format).await?;
            println!("{}", cap);
            Ok(())
        }

        Commands::Write { dircap, name, file, format, subdirs } => {
            let content = read_input(&file)?;
            let cap = client
                .upload_filename(&dircap, &name, content, format, &as_strs(&subdirs))
                .await?;
            println!("{}", cap);
            Ok(())
        }

        Commands::Mkdir { immutable, format, children } => {
            let children = parse_children(&children)?;
            let dircap = if immutable {
                client.create_immutable_directory(&children).await?
            } else {
                client.create_directory(format, &children).await?
            };
            println!("{}", dircap);
            Ok(())
        }

        Commands::MkdirAt { dircap, name, format, subdirs } => {
            let cap = client
                .create_subdirectory(&dircap, &name, format, &as_strs(&subdirs))
                .await?;
            println!("{}", cap);
            Ok(())
        }

        Commands::Ln { dircap, name, target, subdirs, no_replace } => {
            let cap = client
                .add_link(&dircap, &name, &target, &as_strs(&subdirs), !no_replace)
                .await?;
            println!("{}", cap);
            Ok(())
        }

        Commands::Rm { dircap, name, subdirs } => {
            let parent = client.unlink_name(&dircap, &name, &as_strs(&subdirs)).await?;
            println!("{}", parent);
            Ok(())
        }

        Commands::Check { cap } => {
            let report = client.check_health(&cap).await?;
            println!("\n  HEALTH CHECK");
            println!("  ============\n");
            println!("  Capability: {}", cap);
            println!("  Healthy:    {}", if report.is_healthy() { "yes" } else { "NO" });
            if let Some(summary) = &report.summary {
                println!("  Summary:    {}", summary);
            }
            if let (Some(good), Some(expected)) =
                (report.results.count_shares_good, report.results.count_shares_expected)
            {
                println!("  Shares:     {}/{}", good, expected);
            }
            Ok(())
        }
    }
}

/// An explicit `--config` path, else the per-user file when one exists
fn load_config(node: Option<&str>, path: Option<&Path>) -> Result<ClientConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => ClientConfig::default_path().filter(|p| p.exists()),
    };
    resolve_config(node, path.as_deref())
}

/// `--node` wins over the config file, which wins over defaults
fn resolve_config(node: Option<&str>, path: Option<&Path>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(node) = node {
        config.base_url = Some(node.to_string());
    }

    Ok(config)
}

fn as_strs(subdirs: &[String]) -> Vec<&str> {
    subdirs.iter().map(String::as_str).collect()
}

fn read_input(file: &str) -> Result<Vec<u8>> {
    if file == "-" {
        let mut content = Vec::new();
        std::io::stdin().read_to_end(&mut content)?;
        return Ok(content);
    }

    std::fs::read(file).with_context(|| format!("Failed to read {}", file))
}

fn write_output(content: &[u8], output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// `NAME=CAP` pairs; directory caps are linked as dirnodes
fn parse_children(pairs: &[String]) -> Result<Children> {
    let mut children = Children::new();

    for pair in pairs {
        let Some((name, cap)) = pair.split_once('=') else {
            bail!("Child '{}' is not NAME=CAP", pair);
        };
        if name.is_empty() || cap.is_empty() {
            bail!("Child '{}' is not NAME=CAP", pair);
        }

        let node = if cap.starts_with("URI:DIR2") {
            Node::dir(cap)
        } else {
            Node::file(cap)
        };
        children.insert(name.to_string(), node);
    }

    Ok(children)
}
