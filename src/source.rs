//! Remote proxy list sources.

use crate::error::SourceUnavailable;
use crate::identity::DEFAULT_USER_AGENT;
use crate::proxy::ProxyEndpoint;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Rows of the legacy free-proxy-list.net layout.
const ROW_SELECTOR: &str = "#proxylisttable > tbody > tr";
/// Rows of any table, for the current layout.
const ROW_SELECTOR_FALLBACK: &str = "table tbody tr";

const ANONYMITY_CELL: usize = 4;
const HTTPS_CELL: usize = 6;

/// Something that can produce a fresh batch of candidate proxies.
#[async_trait]
pub trait ProxySource: Send + Sync {
    /// Fetch the current list of eligible endpoints, in source order.
    async fn fetch(&self) -> Result<Vec<ProxyEndpoint>, SourceUnavailable>;

    /// Human-readable name used in logs.
    fn name(&self) -> &str;
}

/// Scrapes elite HTTPS proxies from a free-proxy-list.net style page.
#[derive(Debug)]
pub struct FreeProxyListSource {
    url: Url,
    client: Client,
}

impl FreeProxyListSource {
    /// Create a source for `url`, giving up on a fetch after `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SourceUnavailable> {
        let url = Url::parse(url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl ProxySource for FreeProxyListSource {
    async fn fetch(&self) -> Result<Vec<ProxyEndpoint>, SourceUnavailable> {
        debug!("Init proxies: getting proxy list from {}", self.url);

        let body = async {
            self.client
                .get(self.url.clone())
                .header("Accept-Language", "en-US,en;q=0.8")
                .header("User-Agent", DEFAULT_USER_AGENT)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        }
        .await
        .map_err(|e| {
            warn!("Failed to download proxy list from {}: {}", self.url, e);
            SourceUnavailable::from(e)
        })?;

        let proxies = parse_proxy_table(&body)?;
        debug!("Parsed {} elite proxies from {}", proxies.len(), self.url);
        Ok(proxies)
    }

    fn name(&self) -> &str {
        self.url.as_str()
    }
}

/// Extract `address:port` of every row that is an elite proxy with HTTPS.
///
/// Cells are `[address, port, code, country, anonymity, google, https, last checked]`.
pub(crate) fn parse_proxy_table(body: &str) -> Result<Vec<ProxyEndpoint>, SourceUnavailable> {
    let doc = Html::parse_document(body);
    let cell_selector = Selector::parse("td").map_err(|_| SourceUnavailable::MissingTable)?;

    let mut rows = Vec::new();
    for selector in [ROW_SELECTOR, ROW_SELECTOR_FALLBACK] {
        let selector = Selector::parse(selector).map_err(|_| SourceUnavailable::MissingTable)?;
        rows = doc.select(&selector).collect();
        if !rows.is_empty() {
            break;
        }
    }
    if rows.is_empty() {
        return Err(SourceUnavailable::MissingTable);
    }

    let proxies = rows
        .into_iter()
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() <= HTTPS_CELL {
                return None;
            }
            let elite = cells[ANONYMITY_CELL] == "elite proxy";
            let https = cells[HTTPS_CELL] == "yes";
            (elite && https).then(|| ProxyEndpoint::new(cells[0].clone(), cells[1].clone()))
        })
        .collect();

    Ok(proxies)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out queued batches and counts fetches.
    pub(crate) struct ScriptedSource {
        batches: Mutex<VecDeque<Result<Vec<ProxyEndpoint>, SourceUnavailable>>>,
        fetches: AtomicUsize,
    }

    impl ScriptedSource {
        pub(crate) fn new() -> Self {
            Self {
                batches: Mutex::new(VecDeque::new()),
                fetches: AtomicUsize::new(0),
            }
        }

        pub(crate) fn with_batch(self, hosts: &[&str]) -> Self {
            self.push_batch(hosts);
            self
        }

        pub(crate) fn push_batch(&self, hosts: &[&str]) {
            self.batches.lock().push_back(Ok(batch(hosts)));
        }

        pub(crate) fn push_failure(&self) {
            self.batches.lock().push_back(Err(SourceUnavailable::MissingTable));
        }

        pub(crate) fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    pub(crate) fn batch(hosts: &[&str]) -> Vec<ProxyEndpoint> {
        hosts.iter().map(|h| ProxyEndpoint::new(*h, "8080")).collect()
    }

    #[async_trait]
    impl ProxySource for std::sync::Arc<ScriptedSource> {
        async fn fetch(&self) -> Result<Vec<ProxyEndpoint>, SourceUnavailable> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.batches
                .lock()
                .pop_front()
                .unwrap_or(Err(SourceUnavailable::MissingTable))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }
}
