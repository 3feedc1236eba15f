pub mod util;

pub use reqwest::Client;

/// Build the shared [`reqwest::Client`], identifying ourselves with `user_agent`.
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
pub fn build_client(user_agent: &str) -> anyhow::Result<Client> {
    let client = reqwest::ClientBuilder::new()
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}
