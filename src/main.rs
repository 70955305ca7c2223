use anyhow::Context;
use blob_fetchers::config::Command;
use blob_fetchers::utils::{logger, validation::Validate};
use blob_fetchers::{CliConfig, FetchError, Fetcher, HttpFetcher, UploadFile};
use clap::Parser;
use serde_json::Value;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!("❌ {:#}", e);
        eprintln!("❌ {:#}", e);

        // 1 for HTTP status failures, 2 for everything else
        let exit_code = match e.downcast_ref::<FetchError>() {
            Some(err) if err.is_http() => 1,
            _ => 2,
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: CliConfig) -> anyhow::Result<()> {
    config.validate()?;
    let fetcher = HttpFetcher::from_config(&config.fetcher_config()?)?;

    match config.command {
        Command::Get { url, output } => {
            let bytes = fetcher.fetch_binary(&url).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &bytes)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!("📁 Saved {} bytes to {}", bytes.len(), path.display());
                }
                None => println!("{} bytes", bytes.len()),
            }
        }
        Command::GetJson { url } => {
            let value: Value = fetcher.fetch_json(&url).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::SendFile { url, path } => {
            let file = UploadFile::from_path(&path).await?;
            tracing::info!("Uploading {} ({} bytes)", path.display(), file.len());
            let reply: Value = fetcher.send_file(&url, file).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::SendJson { url, json } => {
            let data: Value = serde_json::from_str(&json).context("argument is not valid JSON")?;
            let reply: Value = fetcher.send_json(&url, &data).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }

    Ok(())
}
