use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::{KexError, Result};
use crate::interfaces::transport::{ChannelFetcher, FetchRequest, RawRecord};

pub const RECEIVE_ENDPOINT: &str = "kex/receive";

/// Extra time allowed on top of the server-side poll before the request is
/// abandoned.
const POLL_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiStatus {
    code: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ReceiveResponse {
    status: ApiStatus,
    #[serde(default)]
    msgs: Option<Vec<RawRecord>>,
}

/// Long-polls the relay's `kex/receive` endpoint over HTTP.
pub struct HttpChannelFetcher {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpChannelFetcher {
    pub fn new(base_url: String, token: String, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| KexError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.session_token.clone().unwrap_or_default(),
            config.connect_timeout(),
        )
    }

    pub fn receive_url(&self, request: &FetchRequest) -> String {
        join_url_with_query(&self.base_url, RECEIVE_ENDPOINT, &request.query())
    }
}

#[async_trait]
impl ChannelFetcher for HttpChannelFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawRecord>> {
        let mut builder = self
            .client
            .get(self.receive_url(request))
            .timeout(request.poll + POLL_SLACK);
        if !self.token.trim().is_empty() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let response = builder
            .send()
            .await
            .map_err(|e: reqwest::Error| KexError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(KexError::Http(format!("{RECEIVE_ENDPOINT} returned {status}")));
        }
        let body: ReceiveResponse = response
            .json()
            .await
            .map_err(|e: reqwest::Error| KexError::Serialization(e.to_string()))?;
        if body.status.code != 0 {
            return Err(KexError::Api {
                code: body.status.code,
                name: body.status.name,
            });
        }
        Ok(body.msgs.unwrap_or_default())
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn join_url_with_query(base_url: &str, path: &str, query: &[(&str, String)]) -> String {
    let mut url = join_url(base_url, path);
    if !query.is_empty() {
        let query_string = query
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        url.push('?');
        url.push_str(&query_string);
    }
    url
}
