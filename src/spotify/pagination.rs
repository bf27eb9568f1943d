use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    Res,
    error::ApiError,
    spotify::client::ApiClient,
    types::Page,
};

/// Page size used for offset-mode list endpoints.
pub const PAGE_SIZE: u32 = 50;

/// Walks list endpoints into complete, order-preserving results.
///
/// Both modes run to completion before returning; pages are concatenated in
/// the order the server produced them.
pub struct Paginator<'a> {
    client: &'a ApiClient,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Offset mode: requests `limit`/`offset` pages starting at offset 0 and
    /// stops at the first page holding fewer than `page_size` items.
    ///
    /// A listing of exactly `page_size` items therefore costs one extra
    /// request that comes back empty.
    pub async fn by_offset<T: DeserializeOwned>(
        &self,
        url: &str,
        page_size: u32,
        extra: &[(&str, &str)],
    ) -> Res<Vec<T>> {
        let page_size = page_size.max(1);
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            let json = self
                .client
                .invoke_with_params(url, page_size, offset, extra)
                .await?;
            let page: Page<T> = decode_page(json)?;
            let received = page.items.len();
            debug!(%url, offset, received, "fetched offset page");

            items.extend(page.items);
            offset += page_size;
            if received < page_size as usize {
                break;
            }
        }

        Ok(items)
    }

    /// Cursor mode: requests `url`, then follows each page's `next` link
    /// verbatim until a page has none.
    pub async fn by_cursor<T: DeserializeOwned>(&self, url: &str) -> Res<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());

        while let Some(page_url) = next {
            let response = self.client.invoke(&page_url).await?;
            let page: Page<T> = decode_page(response.json)?;
            debug!(url = %page_url, received = page.items.len(), "fetched cursor page");

            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }
}

/// Turns a list response into a page, surfacing error payloads the client
/// handed back after exhausting its retries.
pub fn decode_page<T: DeserializeOwned>(json: Value) -> Res<Page<T>> {
    if let Some(err) = ApiError::from_payload(&json) {
        return Err(err.into());
    }
    Ok(serde_json::from_value(json)?)
}
