use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;

/// Path of the monitor endpoint on the feed server.
pub const MONITOR_PATH: &str = "/monitor";

pub const HOST_ENV: &str = "STATUS_FEED_HOST";
pub const PORT_ENV: &str = "STATUS_FEED_PORT";

/// Where the feed server lives. Plays the role of the hosting page's
/// `location`: the endpoint reuses its hostname and port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub hostname: String,
    /// `None` means the scheme's default port.
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for PageLocation {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: Some(8080),
        }
    }
}

impl PageLocation {
    pub fn new(hostname: &str, port: Option<u16>) -> Result<Self, FeedError> {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return Err(FeedError::InvalidLocation("empty hostname".to_string()));
        }
        if !is_valid_hostname(hostname) {
            return Err(FeedError::InvalidLocation(format!(
                "bad hostname `{hostname}`"
            )));
        }
        Ok(Self {
            hostname: hostname.to_string(),
            port,
        })
    }

    /// Builds a location from user input; an empty port string means no port.
    pub fn parse(hostname: &str, port: &str) -> Result<Self, FeedError> {
        Self::new(hostname, parse_port(port)?)
    }

    /// Secure WebSocket URL of the monitor endpoint.
    pub fn monitor_url(&self) -> String {
        match self.port {
            Some(port) => format!("wss://{}:{}{}", self.hostname, port, MONITOR_PATH),
            None => format!("wss://{}{}", self.hostname, MONITOR_PATH),
        }
    }

    /// Applies hostname/port overrides. Values are already read from wherever
    /// they come from; a present but empty port clears the port.
    pub fn with_overrides(
        &self,
        hostname: Option<&str>,
        port: Option<&str>,
    ) -> Result<Self, FeedError> {
        let hostname = hostname.unwrap_or(&self.hostname);
        let port = match port {
            Some(p) => parse_port(p)?,
            None => self.port,
        };
        Self::new(hostname, port)
    }

    /// Applies `STATUS_FEED_HOST` / `STATUS_FEED_PORT` from the environment.
    pub fn with_env_overrides(&self) -> Result<Self, FeedError> {
        let host = std::env::var(HOST_ENV).ok();
        let port = std::env::var(PORT_ENV).ok();
        self.with_overrides(host.as_deref(), port.as_deref())
    }
}

/// Host part of an authority: a bracketed IPv6 literal, or a name/IPv4 address
/// without port, userinfo or path characters.
fn is_valid_hostname(hostname: &str) -> bool {
    if let Some(inner) = hostname
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
    {
        return inner.parse::<Ipv6Addr>().is_ok();
    }
    !hostname.contains(['/', ' ', '?', '#', ':', '@', '[', ']', '\\'])
}

fn parse_port(port: &str) -> Result<Option<u16>, FeedError> {
    let port = port.trim();
    if port.is_empty() {
        return Ok(None);
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(FeedError::InvalidLocation(format!("bad port `{port}`"))),
        Ok(p) => Ok(Some(p)),
    }
}
