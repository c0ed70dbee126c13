use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use polykv_store::Codec;

#[derive(Parser)]
#[command(name = "polykv", about = "Inspect and edit a PolyKV store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML store configuration. Without one, a file store is used.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of the file store.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Value codec (json or bincode), overriding the configuration.
    #[arg(long, global = true)]
    pub codec: Option<Codec>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a value under a key
    Set(SetArgs),
    /// Print the value stored under a key
    Get(KeyArgs),
    /// Remove the value stored under a key
    Delete(KeyArgs),
    /// Print the effective store configuration
    Config,
}

#[derive(Args)]
pub struct SetArgs {
    pub key: String,
    pub value: String,
    /// Parse the value as JSON instead of storing it as a string.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
}
