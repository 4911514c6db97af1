use clap::{Parser, Subcommand, ValueEnum};
use geotags_core::search::{Cursor, PrimaryFilter, PropSet, SortMode};
use std::path::PathBuf;

/// CLI arguments for geotags
#[derive(Debug, Parser)]
#[command(
    name = "geotags",
    version,
    about = "Parse coordinates, tag pages and run proximity searches with geotags-core"
)]
pub struct CliArgs {
    /// JSON configuration file (plain or gzipped); defaults apply when omitted
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Store snapshot used by `tag`, `search` and `list`
    #[arg(
        short = 's',
        long = "store",
        global = true,
        default_value = "geotags.store.bin"
    )]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Signed decimal degrees with hemisphere suffixes
    #[default]
    Decimal,
    /// Degrees, minutes and seconds
    Dms,
    /// The parsed coordinate as JSON
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse one tag invocation (e.g. `10 N 20 E type=city`)
    Parse {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Coordinate tokens followed by optional key=value arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        parts: Vec<String>,
    },

    /// Great-circle distance between two points given as `lat|lon`
    Distance {
        from: String,
        to: String,
        #[arg(short, long)]
        globe: Option<String>,
    },

    /// Bounding box around a `lat|lon` point
    Bbox {
        coord: String,
        /// Radius in metres
        radius: f64,
        #[arg(short, long)]
        globe: Option<String>,
    },

    /// List the known globes
    Globes,

    /// Parse invocations for a page and reconcile them into the store
    Tag {
        page: u64,

        /// Namespace recorded for a page seen for the first time
        #[arg(short, long, default_value_t = 0)]
        namespace: i32,

        /// One invocation per argument, parts separated by `|` (e.g. `10|N|20|E|primary`)
        #[arg(allow_hyphen_values = true)]
        invocations: Vec<String>,
    },

    /// Proximity or bounding-box search over the store
    Search {
        /// Centre as `lat|lon`
        #[arg(long, allow_hyphen_values = true)]
        coord: Option<String>,
        /// Search around this page's primary coordinate
        #[arg(long)]
        page: Option<u64>,
        /// Box as `top|left|bottom|right`
        #[arg(long, allow_hyphen_values = true)]
        bbox: Option<String>,
        /// Radius in metres
        #[arg(short, long)]
        radius: Option<f64>,
        #[arg(long)]
        max_dim: Option<u32>,
        #[arg(short, long)]
        globe: Option<String>,
        #[arg(long, default_value = "primary")]
        primary: PrimaryFilter,
        /// Comma-separated namespaces
        #[arg(long, value_delimiter = ',')]
        namespaces: Option<Vec<i32>>,
        /// Properties to return (`type|name|dim|country|region|globe`)
        #[arg(long, default_value = "globe")]
        props: PropSet,
        #[arg(long, default_value = "distance")]
        sort: SortMode,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List stored coordinates of pages
    List {
        #[arg(required = true)]
        pages: Vec<u64>,
        #[arg(long, default_value = "primary")]
        primary: PrimaryFilter,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Continue from a `pageId|coordId` cursor
        #[arg(long = "continue")]
        cursor: Option<Cursor>,
        /// Report distances from this `lat|lon` point
        #[arg(long, allow_hyphen_values = true)]
        from: Option<String>,
    },
}
