use anyhow::{anyhow, bail, Result};
use log::{debug, trace, warn};
use reqwest::Client;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::{fs::File, io::AsyncWriteExt};

pub trait ClientUtilExt {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;

    fn download_file(&self, url: &str, path: &Path) -> impl Future<Output = Result<u64>> + Send;
}

/// Add-on methods for [`reqwest::Client`].
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
impl ClientUtilExt for Client {
    /// GET request `url` and return the body as text.
    ///
    /// Any non-success status is returned as an error, naming the status & URL.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        trace!("GET {url}");
        let response = self.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }

        let text = response.text().await?;
        debug!(
            "fetched {} from {url}",
            indicatif::HumanBytes(text.len() as u64)
        );
        Ok(text)
    }

    /// GET request a file from `url` and stream it to `path`, returning the
    /// number of bytes written.
    ///
    /// Bytes land in a `<name>.part` sibling first, renamed over `path` once the
    /// body is complete; a failed download leaves `path` as it was.
    async fn download_file(&self, url: &str, path: &Path) -> Result<u64> {
        use reqwest::header::CONTENT_LENGTH;

        let partial = partial_path(path)?;
        let mut response = self.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }

        // Get the content length from the URL header
        let file_size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|len| len.to_str().ok())
            .and_then(|len| len.parse::<u64>().ok())
            .unwrap_or(0);
        let pb = crate::ui::bytes_pb(file_size);

        // Ensure the directory exists
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        // write each chunk as it arrives
        let streamed = async {
            let mut file = File::create(&partial).await?;
            let mut written = 0;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
                pb.set_position(written);
            }
            file.flush().await?;
            Ok::<_, anyhow::Error>(written)
        }
        .await;

        let written = match streamed {
            Ok(written) => written,
            Err(e) => {
                pb.abandon();
                if let Err(rm) = tokio::fs::remove_file(&partial).await {
                    warn!("could not remove {}: {rm}", partial.display());
                }
                return Err(e.context(format!("saving {url} to {} failed", partial.display())));
            }
        };
        tokio::fs::rename(&partial, path).await?;

        let msg = format!(
            "{} downloaded successfully ({})",
            path.display(),
            indicatif::HumanBytes(written)
        );
        pb.finish_with_message(msg);

        Ok(written)
    }
}

/// `dir/name.csv` -> `dir/name.csv.part`
fn partial_path(path: &Path) -> Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| anyhow!("{} does not name a file", path.display()))?
        .to_os_string();
    name.push(".part");
    Ok(path.with_file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_sits_beside_the_target() {
        assert_eq!(
            partial_path(Path::new("charts/nepse_2024-09-15.csv")).unwrap(),
            PathBuf::from("charts/nepse_2024-09-15.csv.part")
        );
        assert!(partial_path(Path::new("charts/..")).is_err());
    }
}
