use std::time::Duration;

use reqwest::blocking::Client;

use crate::detection::domain::provider_error::ProviderError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP endpoint that accepts raw image bytes and answers with JSON.
pub struct ProviderEndpoint {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl ProviderEndpoint {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts the image and returns the response body of a 2xx reply.
    pub fn post_image(&self, image: &[u8], query: &[(&str, String)]) -> Result<String, ProviderError> {
        let mut request = self
            .client
            .post(&self.url)
            .query(query)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
