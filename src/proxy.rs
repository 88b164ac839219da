//! Proxy endpoint representation.

use std::fmt;

/// A proxy egress address handed out by the pool.
///
/// Popping an endpoint moves it out of the pool. Hand it back with
/// `ResourcePool::release_proxy` after a successful request, or drop it to
/// evict it from rotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyEndpoint {
    /// Host name or IP address.
    pub host: String,
    /// Port, kept as scraped.
    pub port: String,
}

impl ProxyEndpoint {
    /// Create an endpoint from its host and port.
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// Convert the endpoint to a reqwest::Proxy for all schemes.
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        reqwest::Proxy::all(format!("http://{}", self))
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
