//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use ragdash_domain::OutputFormat;
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Human-readable text (streamed as it arrives)
    Text,
    /// JSON, printed once the command finishes
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for ragdash
#[derive(Parser, Debug)]
#[command(name = "ragdash")]
#[command(author, version, about = "Terminal client for a RAG dashboard backend")]
#[command(long_about = r#"
ragdash talks to a retrieval-augmented generation backend: it streams model
output as it is generated, manages the context documents used for retrieval
and reports the health of the backend's dependencies.

Configuration files are loaded from (in priority order):
1. RAGDASH_* environment variables (e.g. RAGDASH_API__BASE_URL)
2. --config <path>     Explicit config file
3. ./ragdash.toml      Project-level config
4. ~/.config/ragdash/config.toml   Global config

Example:
  ragdash generate "Explain ownership in Rust"
  ragdash generate --rag -m llama3.2 "What do the docs say about deploys?"
  ragdash agent "Summarize open GitHub issues"
  ragdash context add --title "Runbook" --content "Restart the worker first."
  ragdash health --watch
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (defaults to the configured one, then text)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Backend base URL (overrides configuration)
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a response, streaming it as it arrives
    Generate(GenerateArgs),

    /// Send a query to the backend's agent
    Agent {
        /// The query for the agent
        query: String,

        /// Model to use
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,

        /// Wait for the agent's whole answer instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },

    /// Interactive session; a new prompt replaces the one still streaming
    Chat {
        /// Start in retrieval-augmented mode
        #[arg(long)]
        rag: bool,

        /// Model to use
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,
    },

    /// Manage context documents used for retrieval
    #[command(subcommand)]
    Context(ContextCommand),

    /// Show the health of the backend's dependencies
    Health {
        /// Keep polling and print every update
        #[arg(short, long)]
        watch: bool,
    },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// The prompt to send
    pub prompt: String,

    /// Ground the answer in the stored context documents
    #[arg(long)]
    pub rag: bool,

    /// Model to use
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Wait for the whole response instead of streaming it
    #[arg(long)]
    pub no_stream: bool,
}

#[derive(Subcommand, Debug)]
pub enum ContextCommand {
    /// List stored documents
    List,

    /// Add a document
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },

    /// Replace the title and content of a document
    Update {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },

    /// Delete a document
    Delete { id: String },

    /// Ask the backend to index its sample documents
    Seed,
}
