use std::sync::Arc;

use reqwest::{header::AUTHORIZATION, Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{models::response::Envelope, session::BearerToken, Config, Error, Result};

pub mod blogs_repo;

pub use blogs_repo::BlogRepository;

/// Blog API client over plain JSON-over-HTTP.
#[derive(Clone)]
pub struct HttpBlogRepo {
    client: Client,
    config: Arc<Config>,
}

impl HttpBlogRepo {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("hmstores-blog-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn authorized(builder: RequestBuilder, token: Option<&BearerToken>) -> RequestBuilder {
        match token {
            Some(token) => builder.header(AUTHORIZATION, token.header_value()),
            None => builder,
        }
    }

    /// Sends the request and parses the body as an envelope. A non-2xx
    /// transport status never reaches envelope parsing.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>> {
        let response = builder.send().await.map_err(|err| {
            tracing::warn!("blog api request failed: {}", err);
            Error::from(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %response.url(), "blog api returned an error status");
            return Err(Error::Status(status));
        }

        let body = response.text().await?;
        Envelope::parse(&body)
    }
}
