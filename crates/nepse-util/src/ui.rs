use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn single_pb(length: u64) -> ProgressBar {
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [ {bar:50} ] {pos}/{len} {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#|-"),
    );
    pb
}

/// Byte-counting bar for downloads; `length` of 0 means the server sent no `Content-Length`.
pub fn bytes_pb(length: u64) -> ProgressBar {
    if length == 0 {
        return spinner("downloading");
    }
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#|-"),
    );
    pb
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {msg} {bytes}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
