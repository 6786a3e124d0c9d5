use std::path::PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::logic::stream::DisplayMode;

#[derive(Parser)]
#[command(
    name = "packet-shield",
    version,
    about = "Replay packet captures through fitted intrusion classifiers",
    long_about = "Replay a packet capture as a simulated real-time stream, classifying each\n\
                  packet with fitted models and a burst rule engine side by side.\n\
                  Keys: space/p pause, m/Tab display mode, q/Esc quit."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stream a capture through the classifiers
    Demo(DemoArgs),
    /// Run every startup check without streaming
    Check(CheckArgs),
    /// Print the feature layout of an artifact bundle
    Layout(LayoutArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    All,
    Attack,
    Benign,
}

impl From<ModeArg> for DisplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::All => DisplayMode::All,
            ModeArg::Attack => DisplayMode::AttackOnly,
            ModeArg::Benign => DisplayMode::BenignOnly,
        }
    }
}

/// Built-in settings used in place of a config file
#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    /// Unpaced, no attack drop, file order
    Fast,
    /// Slow pacing for a live walkthrough
    Presentation,
}

/// Inputs shared by `demo` and `check`
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// JSON config file; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start from a built-in preset instead of a config file
    #[arg(long, value_enum, conflicts_with = "config")]
    pub preset: Option<PresetArg>,

    /// Single capture (labeled if it has the label column)
    #[arg(long, conflicts_with_all = ["attack", "benign"])]
    pub capture: Option<PathBuf>,

    /// Unlabeled attack capture (requires --benign)
    #[arg(long, requires = "benign")]
    pub attack: Option<PathBuf>,

    /// Unlabeled benign capture (requires --attack)
    #[arg(long, requires = "attack")]
    pub benign: Option<PathBuf>,

    /// Ground-truth column name
    #[arg(long)]
    pub label_column: Option<String>,

    /// Fitted artifact bundle (JSON)
    #[arg(long)]
    pub artifacts: Option<PathBuf>,

    /// Expected SHA-256 of the artifact bundle
    #[arg(long)]
    pub artifacts_sha256: Option<String>,

    /// ONNX model as NAME=PATH (repeatable)
    #[arg(long = "onnx", value_name = "NAME=PATH")]
    pub onnx: Vec<String>,

    /// Linear JSON model as NAME=PATH (repeatable)
    #[arg(long = "linear", value_name = "NAME=PATH")]
    pub linear: Vec<String>,

    /// Disable the burst rule engine
    #[arg(long)]
    pub no_rules: bool,
}

#[derive(Args)]
pub struct DemoArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Delay between records in milliseconds
    #[arg(long)]
    pub pace_ms: Option<u64>,

    /// Pause / cancellation poll tick in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Pipeline capacity
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Probability of dropping an attack row before it is replayed
    #[arg(long)]
    pub attack_drop: Option<f64>,

    /// Shuffle seed (also fixes the drop sequence)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Replay in file order
    #[arg(long)]
    pub no_shuffle: bool,

    /// Initial display mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Disable colored labels
    #[arg(long)]
    pub no_color: bool,

    /// Start paused; press space to begin
    #[arg(long, conflicts_with = "no_input")]
    pub start_paused: bool,

    /// Run without keyboard control (Ctrl+C still stops the run)
    #[arg(long)]
    pub no_input: bool,

    /// Write a JSONL journal of every classified row
    #[arg(long)]
    pub journal: bool,

    /// Journal directory (implies --journal)
    #[arg(long)]
    pub journal_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct LayoutArgs {
    /// Fitted artifact bundle (JSON)
    #[arg(long)]
    pub artifacts: PathBuf,

    /// Print the layout as JSON
    #[arg(long)]
    pub json: bool,
}
