use crate::config::FetcherConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "blob-fetchers")]
#[command(about = "Fetch binary or JSON resources and upload files or gzipped JSON")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Base URL used to resolve relative request URLs")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "TOML file with client settings")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download a resource as raw bytes
    Get {
        url: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Download a resource and pretty-print it as JSON
    GetJson { url: String },
    /// Upload a file as application/octet-stream
    SendFile { url: String, path: PathBuf },
    /// Send a JSON literal, gzip-compressed
    SendJson { url: String, json: String },
}

impl CliConfig {
    /// Settings from `--config` (or defaults), with `--base-url` taking precedence.
    pub fn fetcher_config(&self) -> Result<FetcherConfig> {
        let mut config = match &self.config {
            Some(path) => FetcherConfig::from_file(path)?,
            None => FetcherConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Get {
                output: Some(path), ..
            } => validate_path("output", &path.to_string_lossy()),
            Command::SendFile { path, .. } => validate_path("path", &path.to_string_lossy()),
            _ => Ok(()),
        }
    }
}
