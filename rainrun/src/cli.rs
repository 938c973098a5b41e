use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use rainrun_core::{DEFAULT_MAX_PCT_FAILED_OPS, DEFAULT_MAX_PCT_OVERHEAD_OPS, Thresholds};

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 30s, 250ms, 2m)".to_string());
    }
    humantime::parse_duration(s)
        .map_err(|e| format!("invalid duration '{s}' ({e}; expected e.g. 30s, 250ms, 2m)"))
}

fn parse_pct(input: &str) -> Result<f64, String> {
    let v: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid percentage '{input}'"))?;
    if !v.is_finite() {
        return Err(format!("percentage must be finite (got '{input}')"));
    }
    Ok(v)
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table.
    HumanReadable,
    /// A single JSON document on stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "rainrun",
    author,
    version,
    about = "Run the Rain benchmark and validate its per-track results",
    long_about = "rainrun launches the Rain load generator, waits for it to exit and turns its scoreboard output into per-track summaries.\n\nEach track is accepted when its overhead against the Little's Law estimate and its share of failed operations stay within the configured limits.\n\nLogs go to stderr (filter with RUST_LOG); the results table goes to stdout.",
    after_help = "Examples:\n  rainrun run --config-file config/rain.config.ac.json\n  rainrun run --classpath .:rain.jar:workloads/olio.jar --timeout 2h --save-report rain.out\n  rainrun parse rain.out --max-overhead-pct 10\n  rainrun parse - --output json < rain.out"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch Rain, wait for it to finish and validate its report
    Run(RunArgs),

    /// Validate a previously saved Rain report
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// How often to check whether the benchmark is still running
    #[arg(long, env = "RAINRUN_POLL_INTERVAL", value_parser = parse_duration, default_value = "1s")]
    pub poll_interval: Duration,

    /// An exit with a failure status within this window counts as a failed launch
    #[arg(long, env = "RAINRUN_STARTUP_GRACE", value_parser = parse_duration, default_value = "2s")]
    pub startup_grace: Duration,

    /// Kill the benchmark if it is still running after this long
    #[arg(long, env = "RAINRUN_TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Also write the raw benchmark stdout to this file
    #[arg(long, value_name = "PATH")]
    pub save_report: Option<PathBuf>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Saved Rain stdout (`-` reads stdin)
    pub report: PathBuf,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct LaunchArgs {
    /// Java executable used to start Rain
    #[arg(long, env = "RAIN_JAVA", default_value = "java")]
    pub java: PathBuf,

    /// Rain benchmark configuration file
    #[arg(long, env = "RAIN_CONFIG", default_value = "config/rain.config.ac.json")]
    pub config_file: PathBuf,

    /// Classpath holding rain.jar and the workload jars
    #[arg(long, env = "RAIN_CLASSPATH", default_value = ".:rain.jar:workloads/httptest.jar")]
    pub classpath: String,

    /// Rain entry point
    #[arg(long, env = "RAIN_MAIN_CLASS", default_value = "radlab.rain.Benchmark")]
    pub main_class: String,

    /// Initial JVM heap flag
    #[arg(long, env = "RAIN_MIN_HEAP", default_value = "-Xms256m", allow_hyphen_values = true)]
    pub min_heap: String,

    /// Maximum JVM heap flag
    #[arg(long, env = "RAIN_MAX_HEAP", default_value = "-Xmx1g", allow_hyphen_values = true)]
    pub max_heap: String,

    /// JVM garbage collector flag
    #[arg(
        long,
        env = "RAIN_GC_POLICY",
        default_value = "-XX:+DisableExplicitGC",
        allow_hyphen_values = true
    )]
    pub gc_policy: String,

    /// Extra JVM argument, passed before `-cp` (repeatable)
    #[arg(long = "jvm-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub jvm_args: Vec<String>,

    /// Working directory for the benchmark (defaults to the current directory)
    #[arg(long, env = "RAIN_WORKDIR")]
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct ThresholdArgs {
    /// Highest acceptable overhead vs. the Little's Law estimate, in percent
    #[arg(long, env = "RAINRUN_MAX_OVERHEAD_PCT", value_parser = parse_pct, default_value_t = DEFAULT_MAX_PCT_OVERHEAD_OPS)]
    pub max_overhead_pct: f64,

    /// Highest acceptable share of failed operations, in percent
    #[arg(long, env = "RAINRUN_MAX_FAILED_PCT", value_parser = parse_pct, default_value_t = DEFAULT_MAX_PCT_FAILED_OPS)]
    pub max_failed_pct: f64,
}

impl From<ThresholdArgs> for Thresholds {
    fn from(args: ThresholdArgs) -> Self {
        Self {
            max_pct_overhead_ops: args.max_overhead_pct,
            max_pct_failed_ops: args.max_failed_pct,
        }
    }
}
