use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::errors::FetchError;
use crate::USER_AGENT;

/// Produces the raw feed body for one cycle.
pub trait FeedSource {
    fn url(&self) -> &str;

    fn fetch(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches the feed with a single GET, bounded by a timeout.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpFeedSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

impl FeedSource for HttpFeedSource {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            // See: https://stackoverflow.com/a/7001617/5155484
            .header(
                "Accept",
                "application/rss+xml, application/rdf+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        tracing::debug!(feed_url = %self.url, "Got response for feed");
        Ok(response.text().await?)
    }
}
