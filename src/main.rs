use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use fusion2feed::config::Config;
use fusion2feed::convert::Converter;

#[derive(Parser, Debug)]
#[command(
    name = "fusion2feed",
    version,
    about = "Publish a table of merger-control proceedings as an Atom feed"
)]
struct Args {
    /// TOML file with feed metadata, request headers and table selectors
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Absolute http://, https:// or file:// URIs, converted in order
    #[arg(required = true, value_name = "URI")]
    uris: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the Atom documents
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };

    let converter = Converter::new(config).context("Failed to set up converter")?;

    let stdout = std::io::stdout();
    for uri in &args.uris {
        let payload = converter
            .convert(uri)
            .await
            .with_context(|| format!("Failed to convert {}", uri))?;

        // Flush per document so earlier output survives a later failure
        let mut out = stdout.lock();
        out.write_all(payload.as_bytes())
            .and_then(|()| out.flush())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}
