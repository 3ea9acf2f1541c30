use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "extlint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lint extension charts")]
#[command(long_about = "Runs Helm's standard lint checks over extension charts, then checks that every declared image is used and that global.imageRegistry and global.nodeSelector overrides reach every workload.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// helm executable to use
    #[arg(long, global = true, value_name = "PATH", env = "EXTLINT_HELM_BIN")]
    pub helm_bin: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint one or more extension charts
    Lint(LintArgs),

    /// List the builtin extension rules
    Rules,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LintArgs {
    /// Extension or chart paths
    #[arg(value_name = "PATH", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Namespace used by the helm lint pass
    #[arg(short, long, env = "HELM_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Print only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Lint dependent charts found under charts/
    #[arg(long)]
    pub with_subcharts: bool,

    /// Fail on lint warnings
    #[arg(long)]
    pub strict: bool,

    /// Values file, local path, URL or "-" for stdin (can repeat)
    #[arg(short = 'f', long = "values", value_name = "FILE")]
    pub value_files: Vec<String>,

    /// Set values (key1=val1,key2=val2)
    #[arg(long = "set", value_name = "VALUES")]
    pub values: Vec<String>,

    /// Set STRING values (key1=val1,key2=val2)
    #[arg(long = "set-string", value_name = "VALUES")]
    pub string_values: Vec<String>,

    /// Set JSON values (key1=jsonval1,key2=jsonval2)
    #[arg(long = "set-json", value_name = "VALUES")]
    pub json_values: Vec<String>,

    /// Set values from files (key1=path1,key2=path2)
    #[arg(long = "set-file", value_name = "VALUES")]
    pub file_values: Vec<String>,

    /// Set a literal STRING value
    #[arg(long = "set-literal", value_name = "VALUE")]
    pub literal_values: Vec<String>,

    /// Skip the helm lint pass
    #[arg(long)]
    pub skip_helm: bool,

    /// Skip the builtin extension rules
    #[arg(long)]
    pub skip_builtins: bool,

    /// Disable a builtin rule by code or name (can repeat)
    #[arg(long = "disable-rule", value_name = "RULE")]
    pub disabled_rules: Vec<String>,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
