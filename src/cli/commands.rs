use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bd", about = concat!("~ braindump v", env!("CARGO_PKG_VERSION"), " - notes with a brain dump"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different state file
    #[arg(long = "state-file", global = true)]
    pub state_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a post and select it
    Add(AddArgs),
    /// List posts
    List,
    /// Select a post
    Select(PostArg),
    /// Delete a post
    Delete(PostArg),
    /// Show a post's body (default: the selected post)
    Show(ShowArgs),
    /// Replace the selected post's body from a file or stdin
    Write(WriteArgs),
    /// List, add or reorder the brain dump of the selected post
    Brain(BrainCmd),
    /// Set or toggle no-disturb mode
    NoDisturb(NoDisturbArgs),
    /// Search labels and bodies by regex
    Search(SearchArgs),
    /// Print the brain dump whenever the state file changes
    Watch,
    /// View the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Post args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Post label
    pub label: String,
}

#[derive(Args)]
pub struct PostArg {
    /// Post id or 1-based position
    pub post: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Post id or 1-based position
    pub post: Option<String>,
}

#[derive(Args)]
pub struct WriteArgs {
    /// Read the body from this file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern
    pub pattern: String,
}

// ---------------------------------------------------------------------------
// Brain dump
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BrainCmd {
    #[command(subcommand)]
    pub action: Option<BrainAction>,
}

#[derive(Subcommand)]
pub enum BrainAction {
    /// List brain dump items (default)
    List,
    /// Append a `~ label` line to the selected post
    Add(BrainAddArgs),
    /// Move a brain dump item
    Mv(BrainMvArgs),
}

#[derive(Args)]
pub struct BrainAddArgs {
    /// Item label
    pub label: String,
}

#[derive(Args)]
pub struct BrainMvArgs {
    /// 1-based position of the item to move
    pub from: usize,
    /// 1-based target position
    pub to: usize,
}

// ---------------------------------------------------------------------------
// No-disturb
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(s: Switch) -> bool {
        matches!(s, Switch::On)
    }
}

#[derive(Args)]
pub struct NoDisturbArgs {
    /// on or off (default: toggle)
    pub value: Option<Switch>,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Print the absolute path to the recovery log
    Path,
}
