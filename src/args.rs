use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "fofak",
    about = "Query the FOFA asset search API and export the results to a spreadsheet",
    version,
    long_about = None,
    after_help = "Exclusion file: column A holds hosts (example.com, 192.168.1.1:8080), \
column B an optional remark."
)]
pub struct Args {
    /// FOFA query, e.g. app="Apache-Tomcat"
    #[arg(short, long)]
    pub query: String,

    /// Output workbook (".xlsx" is appended when missing)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Mark hosts listed in the exclusion file and add the per-status sheets
    #[arg(short, long)]
    pub exclude: bool,

    /// Exclusion workbook, overrides the configured path
    #[arg(long)]
    pub exclude_file: Option<PathBuf>,

    /// Path to config file (defaults to ./fofak.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of results to request
    #[arg(long)]
    pub size: Option<u32>,

    /// FOFA account email
    #[arg(long, env = "FOFA_EMAIL", hide_env_values = true)]
    pub email: Option<String>,

    /// FOFA API key
    #[arg(long, env = "FOFA_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
