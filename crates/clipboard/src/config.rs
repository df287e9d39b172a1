//! Clipboard client configuration.

/// Hosts (and their subdomains) clipboard fragments may be fetched from.
pub const DEFAULT_ALLOWED_HOSTS: [&str; 3] = ["officeapps.live.com", "microsoft.com", "office.com"];

pub const DEFAULT_USER_AGENT: &str = concat!("ppt-clipboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardConfig {
    /// Host names accepted as-is or as a parent domain.
    pub allowed_hosts: Vec<String>,
    /// Reject anything but `https` URLs.
    pub require_https: bool,
    pub user_agent: String,
}

impl ClipboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the host allow-list.
    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_require_https(mut self, require: bool) -> Self {
        self.require_https = require;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Whether `host` equals an allow-listed host or is a subdomain of one.
    pub fn is_host_allowed(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            require_https: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
