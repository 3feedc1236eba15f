use crate::bucket::{self, Bucket, ObjectEntry};
use crate::dataset::Dataset;
use anyhow::{bail, Context, Result};
use futures::{stream, StreamExt};
use log::{error, info};
use nepse_util::{ui, Util};
use reqwest::Client;
use std::path::PathBuf;

/// Where a [`Dataset`] is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The `.csv` with the most recent date in its file name.
    Latest(Bucket),
    /// A specific object of the bucket.
    Object(Bucket, String),
    /// Every `.csv` of the bucket, merged into one history.
    AllObjects(Bucket),
    /// A static `.csv` URL.
    Url(String),
    /// A `.csv` on local disk.
    Path(PathBuf),
}

impl Source {
    pub fn describe(&self) -> String {
        match self {
            Source::Latest(bucket) => format!("latest file of bucket {}", bucket.name),
            Source::Object(bucket, key) => format!("{key} of bucket {}", bucket.name),
            Source::AllObjects(bucket) => format!("every file of bucket {}", bucket.name),
            Source::Url(url) => url.clone(),
            Source::Path(path) => path.display().to_string(),
        }
    }

    /// Resolve to a single downloadable URL; the merged & local sources have none.
    pub async fn remote_url(&self, client: &Client) -> Result<String> {
        match self {
            Source::Latest(bucket) => {
                let key = latest_key(client, bucket).await?;
                Ok(bucket.object_url(&key)?.to_string())
            }
            Source::Object(bucket, key) => Ok(bucket.object_url(key)?.to_string()),
            Source::Url(url) => Ok(url.clone()),
            Source::AllObjects(_) | Source::Path(_) => {
                bail!("{} is not a single remote file", self.describe())
            }
        }
    }

    pub async fn load(&self, client: &Client) -> Result<Dataset> {
        info!("Loading {}", self.describe());
        let data = match self {
            Source::Latest(bucket) => {
                let key = latest_key(client, bucket).await?;
                fetch_object(client, bucket, &key).await?
            }
            Source::Object(bucket, key) => fetch_object(client, bucket, key).await?,
            Source::AllObjects(bucket) => fetch_all(client, bucket).await?,
            Source::Url(url) => fetch_url(client, url).await?,
            Source::Path(path) => Dataset::parse(&nepse_util::read_text(path).await?)
                .with_context(|| format!("failed to parse {}", path.display()))?,
        };
        info!(
            "Loaded {} rows, {} symbols ({} rows skipped)",
            data.len(),
            data.symbols().len(),
            data.skipped()
        );
        Ok(data)
    }
}

async fn latest_key(client: &Client, bucket: &Bucket) -> Result<String> {
    let entries = bucket.list(client).await?;
    match bucket::latest(&entries) {
        Some(entry) => {
            info!("Latest file: {} ({:?})", entry.key, entry.date);
            Ok(entry.key.clone())
        }
        None => bail!("bucket {} holds no .csv files", bucket.name),
    }
}

async fn fetch_url(client: &Client, url: &str) -> Result<Dataset> {
    let text = client.fetch_text(url).await?;
    Dataset::parse(&text).with_context(|| format!("failed to parse {url}"))
}

async fn fetch_object(client: &Client, bucket: &Bucket, key: &str) -> Result<Dataset> {
    let url = bucket.object_url(key)?;
    fetch_url(client, url.as_str()).await
}

/// `.csv` keys oldest first, by file name date then key; undated files go
/// first, so a dated export always overrides them when merged.
fn merge_order(entries: Vec<ObjectEntry>) -> Vec<String> {
    let mut csvs: Vec<ObjectEntry> = entries.into_iter().filter(|entry| entry.is_csv()).collect();
    csvs.sort_by(|a, b| (a.date, &a.key).cmp(&(b.date, &b.key)));
    csvs.into_iter().map(|entry| entry.key).collect()
}

/// Fetch every `.csv` concurrently (bounded by CPU count), merging in
/// [`merge_order`] whatever order the downloads finish in. Failures are
/// logged and left out of the merge.
async fn fetch_all(client: &Client, bucket: &Bucket) -> Result<Dataset> {
    let keys = merge_order(bucket.list(client).await?);
    if keys.is_empty() {
        bail!("bucket {} holds no .csv files", bucket.name);
    }

    let total = keys.len();
    let pb = ui::single_pb(total as u64);
    let datasets: Vec<Dataset> = stream::iter(keys)
        .map(|key| {
            let pb = &pb;
            async move {
                let result = fetch_object(client, bucket, &key).await;
                pb.inc(1);
                (key, result)
            }
        })
        .buffered(num_cpus::get())
        .filter_map(|(key, result)| async move {
            match result {
                Ok(data) => Some(data),
                Err(e) => {
                    error!("Failed to load {key}: {e:#}");
                    None
                }
            }
        })
        .collect()
        .await;
    pb.finish_and_clear();

    if datasets.is_empty() {
        bail!("none of the {total} files in bucket {} could be loaded", bucket.name);
    }
    info!("Merged {} of {total} files", datasets.len());
    Ok(Dataset::merge(datasets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_order_follows_file_name_dates() {
        let entries = vec![
            ObjectEntry::new("z/nepse_2024-09-14.csv"),
            ObjectEntry::new("a/nepse_2024-09-16.csv"),
            ObjectEntry::new("notes.txt"),
            ObjectEntry::new("undated.csv"),
            ObjectEntry::new("b/20240915.csv"),
            ObjectEntry::new("a/nepse_2024-09-14.csv"),
        ];

        assert_eq!(
            merge_order(entries),
            vec![
                "undated.csv",
                "a/nepse_2024-09-14.csv",
                "z/nepse_2024-09-14.csv",
                "b/20240915.csv",
                "a/nepse_2024-09-16.csv",
            ]
        );
    }
}
