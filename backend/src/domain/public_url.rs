//! Public base URL used to turn stored avatar paths into absolute links.
//!
//! Port 443 maps to `https://host` and port 80 to `http://host`. Port 8000
//! is the TLS-terminated development deployment and keeps both the scheme
//! and the port (`https://host:8000`). Any other port is served over plain
//! HTTP with the port spelled out.

use std::fmt;

/// Default public host name.
pub const DEFAULT_PUBLIC_HOST: &str = "localhost";
/// Default public port.
pub const DEFAULT_PUBLIC_PORT: u16 = 8000;

/// Host and port clients use to reach the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl {
    host: String,
    port: u16,
}

impl Default for PublicUrl {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_HOST, DEFAULT_PUBLIC_PORT)
    }
}

impl PublicUrl {
    /// Build from a host name and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base URL without a trailing slash.
    ///
    /// # Examples
    /// ```
    /// use profile_service::domain::PublicUrl;
    ///
    /// assert_eq!(PublicUrl::new("example.com", 443).base_url(), "https://example.com");
    /// assert_eq!(PublicUrl::new("localhost", 8080).base_url(), "http://localhost:8080");
    /// ```
    pub fn base_url(&self) -> String {
        match self.port {
            443 => format!("https://{}", self.host),
            80 => format!("http://{}", self.host),
            8000 => format!("https://{}:8000", self.host),
            port => format!("http://{}:{port}", self.host),
        }
    }

    /// Absolute URL for a server-relative path.
    pub fn static_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url())
        } else {
            format!("{}/{path}", self.base_url())
        }
    }
}

impl fmt::Display for PublicUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(443, "https://chat.example")]
    #[case(80, "http://chat.example")]
    #[case(8000, "https://chat.example:8000")]
    #[case(8080, "http://chat.example:8080")]
    #[case(3000, "http://chat.example:3000")]
    fn base_url_follows_port_rules(#[case] port: u16, #[case] expected: &str) {
        assert_eq!(PublicUrl::new("chat.example", port).base_url(), expected);
    }

    #[rstest]
    #[case("/static/avatars/a.png")]
    #[case("static/avatars/a.png")]
    fn static_url_joins_with_single_slash(#[case] path: &str) {
        let url = PublicUrl::new("localhost", 80);
        assert_eq!(url.static_url(path), "http://localhost/static/avatars/a.png");
    }

    #[rstest]
    fn default_points_at_local_development() {
        assert_eq!(PublicUrl::default().to_string(), "https://localhost:8000");
    }
}
