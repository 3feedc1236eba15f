use mockito::mock;
use nepse_util::{build_client, Util};

#[tokio::test]
async fn fetch_text_returns_body() {
    let _mock = mock("GET", "/util/prices.csv")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("SYMBOL,CLOSE_PRICE\nNABIL,512.5\n")
        .create();

    let client = build_client("nepse-test").unwrap();
    let url = format!("{}/util/prices.csv", mockito::server_url());
    let text = client.fetch_text(&url).await.unwrap();

    assert_eq!(text, "SYMBOL,CLOSE_PRICE\nNABIL,512.5\n");
}

#[tokio::test]
async fn fetch_text_rejects_error_status() {
    let _mock = mock("GET", "/util/missing.csv").with_status(403).create();

    let client = build_client("nepse-test").unwrap();
    let url = format!("{}/util/missing.csv", mockito::server_url());
    let err = client.fetch_text(&url).await.unwrap_err();

    assert!(err.to_string().contains("403"));
    assert!(err.to_string().contains("/util/missing.csv"));
}

#[tokio::test]
async fn download_file_writes_every_byte() {
    let body = "BUSINESS_DATE,SYMBOL,CLOSE_PRICE\n".repeat(64);
    let _mock = mock("GET", "/util/download.csv")
        .with_status(200)
        .with_body(&body)
        .create();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("buffer/download.csv");
    let client = build_client("nepse-test").unwrap();
    let url = format!("{}/util/download.csv", mockito::server_url());

    let written = client.download_file(&url, &path).await.unwrap();

    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
}

#[tokio::test]
async fn download_file_replaces_only_when_complete() {
    let _mock = mock("GET", "/util/replace.csv")
        .with_status(200)
        .with_body("BUSINESS_DATE,SYMBOL,CLOSE_PRICE\n2024-09-16,NABIL,518\n")
        .create();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replace.csv");
    std::fs::write(&path, "stale").unwrap();
    let client = build_client("nepse-test").unwrap();
    let url = format!("{}/util/replace.csv", mockito::server_url());

    client.download_file(&url, &path).await.unwrap();

    assert!(std::fs::read_to_string(&path).unwrap().contains("2024-09-16"));
    assert!(!dir.path().join("replace.csv.part").exists());
}

#[tokio::test]
async fn failed_download_keeps_the_existing_file() {
    let _mock = mock("GET", "/util/gone.csv").with_status(404).create();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.csv");
    std::fs::write(&path, "yesterday").unwrap();
    let client = build_client("nepse-test").unwrap();
    let url = format!("{}/util/gone.csv", mockito::server_url());

    let err = client.download_file(&url, &path).await.unwrap_err();

    assert!(err.to_string().contains("404"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "yesterday");
    assert!(!dir.path().join("gone.csv.part").exists());
}

#[tokio::test]
async fn interrupted_write_leaves_no_partial_file() {
    let _mock = mock("GET", "/util/blocked.csv")
        .with_status(200)
        .with_body("BUSINESS_DATE,SYMBOL,CLOSE_PRICE\n")
        .create();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocked.csv");
    std::fs::write(&path, "yesterday").unwrap();
    // a directory where the partial file would go makes the write fail
    std::fs::create_dir(dir.path().join("blocked.csv.part")).unwrap();
    let client = build_client("nepse-test").unwrap();
    let url = format!("{}/util/blocked.csv", mockito::server_url());

    assert!(client.download_file(&url, &path).await.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "yesterday");
}
