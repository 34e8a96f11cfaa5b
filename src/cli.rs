use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the changed file list.
pub const CHANGED_FILES_VAR: &str = "CHANGED_FILES";

#[derive(Parser, Debug, Clone)]
#[command(name = "pipeline-kit")]
#[command(about = "CI helpers: map changed paths to deployment accounts and render pipeline reports")]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve deployment account numbers from the directories touched by a change
    MapAccounts(MapAccountsArgs),

    /// Render report data: JSON to PDF, Markdown to HTML
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MapAccountsArgs {
    /// Whitespace-separated changed file paths, relative to the repository root
    #[arg(long, env = "CHANGED_FILES", value_name = "PATHS")]
    pub changed_files: Option<String>,

    /// Target environment, a top-level key of the mappings file
    #[arg(long, env = "ENVIRONMENT", default_value = "")]
    pub environment: String,

    /// YAML file mapping environment -> category -> account number
    #[arg(long, env = "ACCOUNT_MAPPINGS", default_value = "mappings.yml", value_name = "PATH")]
    pub mappings: PathBuf,

    /// Also append the key=value outputs to this file (GitHub Actions step outputs)
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
    pub github_output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Report payload: JSON or Markdown text depending on --data-type
    #[arg(long, env = "REPORT_DATA", value_name = "TEXT")]
    pub data: Option<String>,

    /// Payload type: "json" (PDF output) or "markdown" (HTML output)
    #[arg(long, env = "DATA_TYPE", default_value = "json")]
    pub data_type: String,

    /// Output file name without extension
    #[arg(long, env = "OUTPUT_FILENAME", default_value = "report", value_name = "NAME")]
    pub output: String,

    /// Directory the report is written to
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// TOML file overriding theme colors, fonts and page geometry
    #[arg(long, env = "REPORT_THEME", value_name = "PATH")]
    pub theme: Option<PathBuf>,

    /// Markdown-to-HTML renderer program
    #[arg(long, env = "MARKDOWN_RENDERER", default_value = "grip", value_name = "PROGRAM")]
    pub renderer: String,

    /// Page title for HTML output
    #[arg(long, env = "REPORT_TITLE", default_value = "Generated Report")]
    pub title: String,
}

impl MapAccountsArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        // An empty CHANGED_FILES is a valid "nothing changed"; an unset one is a misconfigured step
        if self.changed_files.is_none() && std::env::var_os(CHANGED_FILES_VAR).is_none() {
            return Err(format!("No changed files given: set {} or pass --changed-files", CHANGED_FILES_VAR));
        }
        Ok(())
    }

    /// The changed file list, empty when the variable is set but blank.
    pub fn changed_files(&self) -> &str {
        self.changed_files.as_deref().unwrap_or("")
    }
}

impl ReportArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        let name = self.output.trim();
        if name.is_empty() {
            return Err("Output file name must not be empty".to_string());
        }
        if name.contains('/') || name.contains('\\') {
            return Err(format!("Output file name '{}' must not contain a path separator; use --output-dir", name));
        }
        if self.renderer.trim().is_empty() {
            return Err("Markdown renderer program must not be empty".to_string());
        }
        Ok(())
    }

    pub fn data(&self) -> &str {
        self.data.as_deref().unwrap_or("")
    }
}
