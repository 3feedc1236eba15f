use anyhow::{anyhow, bail, Result};
use clap::Parser;
use cli::{Cli, Commands::*};
use colored::{ColoredString, Colorize};
use nepse_chart::ChartKind;
use nepse_market::{bucket, Config, Source, SymbolSeries};
use nepse_util::Util;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

mod cli;

fn preprocess(level: log::LevelFilter) {
    // grant access to .env
    dotenv::dotenv().ok();

    // initialise logger; RUST_LOG, if set, wins over --log
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    preprocess(cli.log.into());
    log::trace!("Command line input recorded: {cli:#?}");

    let mut config = Config::from_env();
    cli.source.apply(&mut config);
    log::debug!("Configuration: {config:#?}");

    let client = nepse_util::build_client(&config.user_agent)?;
    let source = cli.source.resolve(&config);

    // cli framework:
    // "> nepse <COMMAND>"
    match &cli.command {
        // "> nepse list"
        // list the files held in the bucket
        List => list(&client, &config).await?,

        // "> nepse symbols"
        Symbols => {
            let data = source.load(&client).await?;
            let symbols = data.symbols();
            for symbol in &symbols {
                println!("{}", symbol_line(symbol));
            }
            log::info!("{} symbols in {}", symbols.len(), source.describe());
        }

        // "> nepse chart <SYMBOL> [--kind price,volume,market-cap] [--out DIR]"
        // draw the charts of one symbol, alongside its summary
        Chart { symbol, kind, out } => {
            let series = load_series(&client, &source, symbol).await?;
            let kinds: Vec<ChartKind> = if kind.is_empty() {
                ChartKind::ALL.to_vec()
            } else {
                kind.iter().map(|k| ChartKind::from(*k)).collect()
            };
            let dir = out.clone().unwrap_or_else(|| config.out_dir.clone());

            let paths = render_charts(series.clone(), kinds, dir.clone()).await?;
            let summary = dir.join(format!("{}_summary.json", nepse_chart::file_safe(&series.symbol)));
            nepse_util::write_json(&summary, &series.summary()).await?;

            log::info!("{} charts written for {}", paths.len(), series.symbol);
            for path in paths.iter().chain(std::iter::once(&summary)) {
                println!("{}", path.display());
            }
        }

        // "> nepse compare <SYMBOL> <SYMBOL> ... [--rebase] [--out DIR]"
        // overlay close prices of several symbols
        Compare {
            symbols,
            rebase,
            out,
        } => {
            let data = source.load(&client).await?;
            let series: Vec<SymbolSeries> = symbols
                .iter()
                .filter_map(|symbol| {
                    let series = data.series(symbol);
                    if series.is_none() {
                        log::warn!("{symbol} not found in {}; skipping", source.describe());
                    }
                    series
                })
                .collect();
            if series.is_empty() {
                bail!("none of {symbols:?} found in {}", source.describe());
            }

            let svg = nepse_chart::render_comparison(&series, *rebase)?;
            let name = series
                .iter()
                .map(|s| nepse_chart::file_safe(&s.symbol))
                .collect::<Vec<_>>()
                .join("_");
            let dir = out.clone().unwrap_or_else(|| config.out_dir.clone());
            let path = dir.join(format!("compare_{name}.svg"));
            nepse_util::write_text(&path, &svg).await?;
            println!("{}", path.display());
        }

        // "> nepse summary <SYMBOL>"
        Summary { symbol } => {
            let series = load_series(&client, &source, symbol).await?;
            println!("{}", serde_json::to_string_pretty(&series.summary())?);
        }

        // "> nepse download [--out PATH]"
        // keep a local copy of the resolved file
        Download { out } => {
            let url = source.remote_url(&client).await?;
            let path = match out {
                Some(path) => path.clone(),
                None => config.out_dir.join(file_name(&url)),
            };
            let bytes = client.download_file(&url, &path).await?;
            log::info!("{url} saved to {} ({bytes} bytes)", path.display());
            println!("{}", path.display());
        }
    }

    Ok(())
}

async fn load_series(client: &Client, source: &Source, symbol: &str) -> Result<SymbolSeries> {
    let data = source.load(client).await?;
    data.series(symbol)
        .ok_or_else(|| anyhow!("{symbol} not found in {}", source.describe()))
}

/// Chart rendering is CPU-bound; keep it off the async workers.
async fn render_charts(series: SymbolSeries, kinds: Vec<ChartKind>, dir: PathBuf) -> Result<Vec<PathBuf>> {
    tokio::task::spawn_blocking(move || nepse_chart::render_to_dir(&series, &kinds, &dir)).await?
}

fn symbol_line(symbol: &str) -> ColoredString {
    symbol.cyan().bold()
}

async fn list(client: &Client, config: &Config) -> Result<()> {
    let bucket = config.bucket();
    let entries = bucket.list(client).await?;
    let latest = bucket::latest(&entries).map(|entry| entry.key.clone());

    for entry in &entries {
        let date = entry
            .date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = format!("{:<10} {:>12} {}", date, entry.size, entry.key);
        if Some(&entry.key) == latest.as_ref() {
            println!("{} {}", "*".green().bold(), line.green());
        } else if entry.is_csv() {
            println!("  {line}");
        } else {
            println!("  {}", line.dimmed());
        }
    }
    log::info!("{} objects in bucket {}", entries.len(), bucket.name);
    Ok(())
}

/// Last path segment of `url`, percent-decoded, for naming downloads.
fn file_name(url: &str) -> PathBuf {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            let segment = url.path_segments()?.last()?.to_string();
            let name = percent_decode_str(&segment).decode_utf8_lossy().into_owned();
            // a decoded `/` would escape the output directory
            Some(name.replace(|c| c == '/' || c == '\\', "_"))
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("download.csv"))
}
