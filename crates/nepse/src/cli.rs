use clap::{Args, Parser, Subcommand, ValueEnum};
use nepse_chart::ChartKind;
use nepse_market::{Config, Source};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of logging (`RUST_LOG` takes precedence)
    #[arg(long, global = true, value_enum, ignore_case = true, default_value = "info")]
    pub log: LogLevel,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the files held in the bucket, marking the latest `.csv`.
    List,

    /// Print every symbol found in the dataset.
    Symbols,

    /// Chart a single symbol; writes one `.svg` per chart & a `_summary.json`.
    Chart {
        symbol: String,

        /// Charts to draw; all of them by default.
        #[arg(long, value_enum, value_delimiter = ',')]
        kind: Vec<ChartArg>,

        /// Output directory [default: $NEPSE_OUT_DIR or ./charts]
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compare the close prices of several symbols on one chart.
    Compare {
        #[arg(required = true, num_args = 1..)]
        symbols: Vec<String>,

        /// Express each line as a percentage of its first close.
        #[arg(long)]
        rebase: bool,

        /// Output directory [default: $NEPSE_OUT_DIR or ./charts]
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the summary of a single symbol as JSON.
    Summary { symbol: String },

    /// Save the resolved `.csv` to disk.
    Download {
        /// Output file [default: <out dir>/<file name>]
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// Where the data comes from; the first of `--file`, `--url`, `--key` &
// `--all-files` given wins, then `$NEPSE_DATA_URL`, then the latest file of
// the bucket.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Read a local `.csv` file.
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Fetch a `.csv` from a static URL.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Fetch a specific object of the bucket.
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Fetch & merge every `.csv` of the bucket.
    #[arg(long, global = true)]
    pub all_files: bool,

    /// Bucket name [default: $NEPSE_BUCKET or nepse-stock-data]
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// Bucket region [default: $NEPSE_REGION or us-east-1]
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Bucket address, replacing the AWS one [default: $NEPSE_ENDPOINT]
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

impl SourceArgs {
    /// Layer the bucket flags over `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bucket) = &self.bucket {
            config.bucket = bucket.clone();
        }
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
    }

    pub fn resolve(&self, config: &Config) -> Source {
        let bucket = config.bucket();
        if let Some(path) = &self.file {
            Source::Path(path.clone())
        } else if let Some(url) = &self.url {
            Source::Url(url.clone())
        } else if let Some(key) = &self.key {
            Source::Object(bucket, key.clone())
        } else if self.all_files {
            Source::AllObjects(bucket)
        } else if let Some(url) = &config.data_url {
            Source::Url(url.clone())
        } else {
            Source::Latest(bucket)
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChartArg {
    /// Open & close prices, with the daily high/low range.
    Price,

    /// Shares traded per day.
    Volume,

    /// Market capitalization.
    MarketCap,
}

impl From<ChartArg> for ChartKind {
    fn from(arg: ChartArg) -> Self {
        match arg {
            ChartArg::Price => ChartKind::Price,
            ChartArg::Volume => ChartKind::Volume,
            ChartArg::MarketCap => ChartKind::MarketCap,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use nepse_market::Bucket;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("nepse").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chart_kinds_and_global_flags() {
        let cli = parse(&["chart", "NABIL", "--kind", "price,market-cap", "--log", "DEBUG", "--all-files"]);

        match cli.command {
            Commands::Chart { symbol, kind, out } => {
                assert_eq!(symbol, "NABIL");
                assert_eq!(kind, vec![ChartArg::Price, ChartArg::MarketCap]);
                assert_eq!(out, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.log, LogLevel::Debug);
        assert!(cli.source.all_files);
    }

    #[test]
    fn compare_needs_a_symbol() {
        assert!(Cli::try_parse_from(["nepse", "compare"]).is_err());

        let cli = parse(&["compare", "NABIL", "NICA", "--rebase"]);
        match cli.command {
            Commands::Compare { symbols, rebase, .. } => {
                assert_eq!(symbols, vec!["NABIL", "NICA"]);
                assert!(rebase);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn source_precedence() {
        let config = Config::default();
        let bucket = config.bucket();

        let cli = parse(&["symbols"]);
        assert_eq!(cli.source.resolve(&config), Source::Latest(bucket.clone()));

        let cli = parse(&["symbols", "--all-files", "--key", "today.csv"]);
        assert_eq!(
            cli.source.resolve(&config),
            Source::Object(bucket.clone(), "today.csv".to_string())
        );

        let cli = parse(&["symbols", "--key", "today.csv", "--url", "https://example.com/a.csv"]);
        assert_eq!(
            cli.source.resolve(&config),
            Source::Url("https://example.com/a.csv".to_string())
        );

        let cli = parse(&["symbols", "--url", "https://example.com/a.csv", "--file", "a.csv"]);
        assert_eq!(cli.source.resolve(&config), Source::Path(PathBuf::from("a.csv")));

        let with_url = Config {
            data_url: Some("https://example.com/static.csv".to_string()),
            ..Config::default()
        };
        let cli = parse(&["symbols"]);
        assert_eq!(
            cli.source.resolve(&with_url),
            Source::Url("https://example.com/static.csv".to_string())
        );
        let cli = parse(&["symbols", "--all-files"]);
        assert_eq!(cli.source.resolve(&with_url), Source::AllObjects(bucket));
    }

    #[test]
    fn bucket_flags_override_config() {
        let mut config = Config::default();
        let cli = parse(&["list", "--bucket", "mirror", "--endpoint", "http://localhost:9000/mirror"]);
        cli.source.apply(&mut config);

        assert_eq!(
            config.bucket(),
            Bucket::new("mirror", "us-east-1").with_endpoint("http://localhost:9000/mirror")
        );
    }
}
