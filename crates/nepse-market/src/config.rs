use crate::bucket::Bucket;
use std::path::PathBuf;

pub const DEFAULT_BUCKET: &str = "nepse-stock-data";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_OUT_DIR: &str = "./charts";

/// Runtime settings, read from the environment (`.env` included, once the
/// binary has loaded it). Command line flags are layered on top by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bucket: String,
    pub region: String,
    /// Replaces the `https://{bucket}.s3.{region}.amazonaws.com/` host.
    pub endpoint: Option<String>,
    /// Static `.csv` URL, used instead of the bucket when set.
    pub data_url: Option<String>,
    pub user_agent: String,
    pub out_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            bucket: get("NEPSE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: get("NEPSE_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: get("NEPSE_ENDPOINT"),
            data_url: get("NEPSE_DATA_URL"),
            user_agent: get("USER_AGENT").unwrap_or_else(default_user_agent),
            out_dir: get("NEPSE_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
        }
    }

    pub fn bucket(&self) -> Bucket {
        Bucket {
            name: self.bucket.clone(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn default_user_agent() -> String {
    format!("nepse/{}", env!("CARGO_PKG_VERSION"))
}
