use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ironpxe",
    about = "Boot-provisioning server: layered Ignition configs, iPXE scripts, and mirrored images",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the provisioning server
    Serve(ServeArgs),
    /// Compose configuration layers and print the merged document
    Compose(ComposeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, env = "IRONPXE_LISTEN_ADDR", default_value = "0.0.0.0:8086")]
    pub bind: SocketAddr,
    /// Root of the per-OS configuration trees
    #[arg(long, env = "IRONPXE_CONFIG_DIR", default_value = "/var/lib/ironpxe/configs")]
    pub config_dir: PathBuf,
    /// Root of the local boot-image cache
    #[arg(long, env = "IRONPXE_IMAGE_DIR", default_value = "/var/lib/ironpxe/images")]
    pub image_dir: PathBuf,
}

#[derive(Args)]
pub struct ComposeArgs {
    /// Layer files, lowest precedence first, relative to --base-dir
    #[arg(required = true)]
    pub layers: Vec<String>,
    /// Directory the layer paths are resolved against
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,
    /// Let later layers replace scalar values instead of erroring
    #[arg(long)]
    pub overwrite: bool,
    /// Concatenate sequences across layers instead of replacing them
    #[arg(long)]
    pub append: bool,
    /// Key matcher for layer-relative file-reference rewriting (repeatable);
    /// a leading '.' makes it a suffix match
    #[arg(long = "path-key")]
    pub path_keys: Vec<String>,
    /// Use the server's default path keys in addition to any --path-key
    #[arg(long)]
    pub default_path_keys: bool,
}
