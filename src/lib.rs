pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::FetcherConfig;
pub use core::fetchers::{fetch_binary, fetch_json, send_file, send_json, HttpFetcher};
pub use domain::{model::UploadFile, ports::Fetcher};
pub use utils::error::{FetchError, Result};
