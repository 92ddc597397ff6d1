use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
pub struct Cli {
    /// Disk image path
    #[arg(long, short)]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create and format a new image, overwriting any existing one
    Format {
        /// Image size in MiB
        #[arg(long, default_value_t = 4)]
        size: u64,

        /// Number of inodes, the root directory included
        #[arg(long, default_value_t = 128)]
        inodes: u32,
    },

    /// Copy every regular file of a host directory into the image
    Pack {
        /// Source directory
        #[arg(long, short)]
        source: PathBuf,
    },

    /// Print a file to stdout
    Cat { name: String },

    /// List files with their block-quantized sizes
    Ls,
}
