use crate::filename::date_from_key;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, trace};
use nepse_util::Util;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

/// A publicly readable S3 bucket holding the daily `.csv` exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub region: String,
    /// Replaces the virtual-hosted AWS address, e.g., a path-style
    /// `http://localhost:9000/nepse-stock-data` mirror.
    pub endpoint: Option<String>,
}

impl Bucket {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Root of the bucket, always with a trailing `/`.
    pub fn base_url(&self) -> Result<Url> {
        let mut base = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.s3.{}.amazonaws.com/", self.name, self.region),
        };
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).with_context(|| format!("invalid bucket address: {base}"))
    }

    /// Public URL of the object at `key`; each `/` separated segment is
    /// percent-encoded.
    pub fn object_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base_url()?;
        let address = url.to_string();
        url.path_segments_mut()
            .map_err(|_| anyhow!("bucket address cannot hold a path: {address}"))?
            .pop_if_empty()
            .extend(key.split('/'));
        Ok(url)
    }

    fn list_url(&self, continuation: Option<&str>) -> Result<Url> {
        let mut url = self.base_url()?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("list-type", "2");
            if let Some(token) = continuation {
                query.append_pair("continuation-token", token);
            }
        }
        Ok(url)
    }

    /// List every object in the bucket (anonymous ListObjectsV2), following
    /// continuation tokens until the listing is complete. Sorted by key.
    pub async fn list(&self, client: &Client) -> Result<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let url = self.list_url(continuation.as_deref())?;
            let xml = client
                .fetch_text(url.as_str())
                .await
                .with_context(|| format!("failed to list bucket {}", self.name))?;
            let page = parse_listing(&xml)?;
            trace!("listed {} objects from {url}", page.contents.len());

            entries.extend(page.contents.into_iter().map(ObjectEntry::from));

            match (page.is_truncated, page.next_continuation_token) {
                (true, Some(token)) => continuation = Some(token),
                _ => break,
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        debug!("bucket {} holds {} objects", self.name, entries.len());
        Ok(entries)
    }
}

/// One object of a bucket listing.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    /// Date parsed out of the file name, see [`date_from_key`].
    pub date: Option<NaiveDate>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            date: date_from_key(&key),
            key,
            size: 0,
            last_modified: None,
        }
    }

    pub fn is_csv(&self) -> bool {
        self.key.to_ascii_lowercase().ends_with(".csv")
    }
}

impl From<Contents> for ObjectEntry {
    fn from(contents: Contents) -> Self {
        let last_modified = contents
            .last_modified
            .as_deref()
            .and_then(|stamp| DateTime::parse_from_rfc3339(stamp).ok())
            .map(|stamp| stamp.with_timezone(&Utc));
        Self {
            size: contents.size,
            last_modified,
            ..ObjectEntry::new(contents.key)
        }
    }
}

/// The most recent `.csv`: greatest file name date, ties broken by key. When
/// no file name carries a date, the most recently modified `.csv` is used.
pub fn latest(entries: &[ObjectEntry]) -> Option<&ObjectEntry> {
    let csvs = entries.iter().filter(|entry| entry.is_csv());

    csvs.clone()
        .filter(|entry| entry.date.is_some())
        .max_by(|a, b| (a.date, &a.key).cmp(&(b.date, &b.key)))
        .or_else(|| csvs.max_by(|a, b| (a.last_modified, &a.key).cmp(&(b.last_modified, &b.key))))
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

// Input: S3 ListObjectsV2
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListBucketResult {
    #[serde(default)]
    pub contents: Vec<Contents>,
    #[serde(default)]
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Contents {
    pub key: String,
    pub last_modified: Option<String>,
    #[serde(default)]
    pub size: u64,
}

pub(crate) fn parse_listing(xml: &str) -> Result<ListBucketResult> {
    quick_xml::de::from_str(xml).context("unreadable bucket listing")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
    <Name>nepse-stock-data</Name>
    <Prefix></Prefix>
    <KeyCount>2</KeyCount>
    <MaxKeys>1000</MaxKeys>
    <IsTruncated>true</IsTruncated>
    <NextContinuationToken>1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=</NextContinuationToken>
    <Contents>
        <Key>daily/nepse_2024-09-15.csv</Key>
        <LastModified>2024-09-15T12:00:00.000Z</LastModified>
        <ETag>&quot;d41d8cd98f00b204e9800998ecf8427e&quot;</ETag>
        <Size>52311</Size>
        <StorageClass>STANDARD</StorageClass>
    </Contents>
    <Contents>
        <Key>README.txt</Key>
        <LastModified>2024-01-01T00:00:00.000Z</LastModified>
        <Size>12</Size>
    </Contents>
</ListBucketResult>"#;

    fn entry(key: &str, modified: Option<&str>) -> ObjectEntry {
        ObjectEntry {
            last_modified: modified
                .and_then(|m| DateTime::parse_from_rfc3339(m).ok())
                .map(|m| m.with_timezone(&Utc)),
            ..ObjectEntry::new(key)
        }
    }

    #[test]
    fn listing_page() {
        let page = parse_listing(PAGE).unwrap();
        assert!(page.is_truncated);
        assert_eq!(
            page.next_continuation_token.as_deref(),
            Some("1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM=")
        );
        assert_eq!(page.contents.len(), 2);

        let first = ObjectEntry::from(page.contents.into_iter().next().unwrap());
        assert_eq!(first.key, "daily/nepse_2024-09-15.csv");
        assert_eq!(first.size, 52311);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 9, 15));
        assert_eq!(
            first.last_modified.map(|m| m.to_rfc3339()),
            Some("2024-09-15T12:00:00+00:00".to_string())
        );
        assert!(first.is_csv());
    }

    #[test]
    fn empty_listing() {
        let page = parse_listing(
            r#"<ListBucketResult><Name>empty</Name><KeyCount>0</KeyCount><IsTruncated>false</IsTruncated></ListBucketResult>"#,
        )
        .unwrap();
        assert!(page.contents.is_empty());
        assert!(!page.is_truncated);
        assert_eq!(page.next_continuation_token, None);
    }

    #[test]
    fn addresses() {
        let opaque = Bucket::new("x", "y").with_endpoint("mailto:someone@example.com");
        let err = opaque.object_url("today.csv").unwrap_err();
        assert!(err.to_string().contains("mailto:someone@example.com"));

        let aws = Bucket::new("nepse-stock-data", "us-east-1");
        assert_eq!(
            aws.base_url().unwrap().as_str(),
            "https://nepse-stock-data.s3.us-east-1.amazonaws.com/"
        );
        assert_eq!(
            aws.object_url("daily/nepse 2024-09-15.csv").unwrap().as_str(),
            "https://nepse-stock-data.s3.us-east-1.amazonaws.com/daily/nepse%202024-09-15.csv"
        );
        assert_eq!(
            aws.list_url(Some("a+b/c=")).unwrap().as_str(),
            "https://nepse-stock-data.s3.us-east-1.amazonaws.com/?list-type=2&continuation-token=a%2Bb%2Fc%3D"
        );

        let mirror = Bucket::new("ignored", "ignored").with_endpoint("http://localhost:9000/mirror");
        assert_eq!(mirror.base_url().unwrap().as_str(), "http://localhost:9000/mirror/");
        assert_eq!(
            mirror.object_url("daily/nepse 2024.csv").unwrap().as_str(),
            "http://localhost:9000/mirror/daily/nepse%202024.csv"
        );
        assert_eq!(
            mirror.object_url("today.csv").unwrap().as_str(),
            "http://localhost:9000/mirror/today.csv"
        );
    }

    #[test]
    fn latest_prefers_the_file_name_date() {
        let entries = vec![
            entry("nepse_2024-09-13.csv", Some("2024-09-20T00:00:00Z")),
            entry("nepse_2024-09-15.csv", Some("2024-09-15T00:00:00Z")),
            entry("notes_2025-01-01.txt", None),
            entry("nepse_undated.csv", Some("2025-01-01T00:00:00Z")),
            entry("NEPSE_2024-09-14.CSV", None),
        ];
        assert_eq!(latest(&entries).unwrap().key, "nepse_2024-09-15.csv");
    }

    #[test]
    fn latest_breaks_ties_by_key() {
        let entries = vec![entry("a/2024-09-15.csv", None), entry("b/2024-09-15.csv", None)];
        assert_eq!(latest(&entries).unwrap().key, "b/2024-09-15.csv");
    }

    #[test]
    fn latest_falls_back_to_modification_time() {
        let entries = vec![
            entry("today.csv", Some("2024-09-15T00:00:00Z")),
            entry("yesterday.csv", Some("2024-09-14T00:00:00Z")),
            entry("never.csv", None),
        ];
        assert_eq!(latest(&entries).unwrap().key, "today.csv");
    }

    #[test]
    fn latest_needs_a_csv() {
        assert_eq!(latest(&[]), None);
        assert_eq!(latest(&[entry("nepse_2024-09-15.json", None)]), None);
    }
}
