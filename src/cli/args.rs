use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixup")]
#[command(version)]
#[command(about = "Create, fill and finalize pixhost galleries", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output_format: OutputFormat,

    /// Don't copy the finalized gallery URL to the clipboard
    #[arg(long, global = true)]
    pub no_clipboard: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Hashes of a gallery created in an earlier run
#[derive(Args, Debug, Clone)]
pub struct GalleryHashes {
    /// Gallery hash returned when the gallery was created
    #[arg(long, env = "PIXUP_GALLERY_HASH")]
    pub gallery_hash: String,

    /// Gallery upload hash returned when the gallery was created
    #[arg(long, env = "PIXUP_GALLERY_UPLOAD_HASH")]
    pub upload_hash: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default configuration file
    Init,
    /// Create a new gallery
    Create {
        /// Gallery name
        name: String,
        /// Mark the gallery's content as public access
        #[arg(long)]
        public: bool,
    },
    /// Upload images to an existing gallery, one at a time
    Upload {
        #[command(flatten)]
        gallery: GalleryHashes,
        /// Image files or directories of images
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Pause after each upload, in milliseconds
        #[arg(long)]
        pace_ms: Option<u64>,
    },
    /// Finalize a gallery and record its URL
    Finalize {
        #[command(flatten)]
        gallery: GalleryHashes,
        /// Gallery URL, written to the galleries log and clipboard
        #[arg(long)]
        url: String,
        /// Gallery name, written to the galleries log
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a gallery, upload images to it and finalize it
    Run {
        /// Gallery name
        name: String,
        /// Image files or directories of images
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Mark the gallery's content as public access
        #[arg(long)]
        public: bool,
        /// Pause after each upload, in milliseconds
        #[arg(long)]
        pace_ms: Option<u64>,
        /// Leave the gallery open after uploading
        #[arg(long)]
        no_finalize: bool,
    },
    /// List finalized galleries from the galleries log
    History {
        /// List uploaded image links instead
        #[arg(long)]
        images: bool,
    },
    /// How to use pixup
    About,
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}
