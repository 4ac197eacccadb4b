use futures_util::StreamExt;
use listing_core::{ApiQuery, Cursor, FailureKind, FetchError, Page};
use listing_logging::listing_debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::FetchSettings;

/// Paginated listing source. Timeouts are the implementation's concern.
#[async_trait::async_trait]
pub trait PagedFetch<F, T>: Send + Sync {
    async fn fetch_page(
        &self,
        filters: &F,
        cursor: Option<&Cursor>,
        page_size: u32,
    ) -> Result<Page<T>, FetchError>;
}

/// Wire shape of one page: `{"items": [...], "nextCursor": "..." | null}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse<T> {
    items: Vec<T>,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// HTTP GET against a listing endpoint; filters travel as query parameters.
#[derive(Debug, Clone)]
pub struct ReqwestPagedFetch {
    endpoint: reqwest::Url,
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestPagedFetch {
    pub fn new(endpoint: &str, settings: FetchSettings) -> Result<Self, FetchError> {
        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            endpoint,
            client,
            settings,
        })
    }

    fn request_url(
        &self,
        pairs: Vec<(&'static str, String)>,
        cursor: Option<&Cursor>,
        page_size: u32,
    ) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
            query.append_pair("limit", &page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor.token());
            }
        }
        url
    }
}

#[async_trait::async_trait]
impl<F, T> PagedFetch<F, T> for ReqwestPagedFetch
where
    F: ApiQuery + Sync,
    T: DeserializeOwned + Send,
{
    async fn fetch_page(
        &self,
        filters: &F,
        cursor: Option<&Cursor>,
        page_size: u32,
    ) -> Result<Page<T>, FetchError> {
        let url = self.request_url(filters.query_pairs(), cursor, page_size);
        listing_debug!("Fetching page {}", url);

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let body: PageResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(Page {
            items: body.items,
            next_cursor: body.next_cursor.filter(|token| !token.is_empty()).map(Cursor::new),
        })
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
