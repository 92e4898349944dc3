//! Target endpoint definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A network endpoint monitored by the engine.
///
/// Identity is the `(ip, port, hostname)` triple; a missing hostname falls
/// back to the ip string for keying, so `("10.0.0.1", 80, None)` and
/// `("10.0.0.1", 80, Some("10.0.0.1"))` name the same target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target IP address (or address string the socket layer can connect to)
    pub ip: String,

    /// Target port
    pub port: u16,

    /// Optional hostname, part of the target identity and the default
    /// `Host:` header for active HTTP probes
    #[serde(default)]
    pub hostname: Option<String>,

    /// Optional `Host:` header override for active HTTP probes; not part of
    /// the target identity
    #[serde(default)]
    pub hostheader: Option<String>,
}

impl Target {
    /// Create a new target.
    pub fn new(ip: impl Into<String>, port: u16, hostname: Option<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            hostname,
            hostheader: None,
        }
    }

    /// Set the `Host:` header override used by active HTTP probes.
    pub fn with_hostheader(mut self, hostheader: impl Into<String>) -> Self {
        self.hostheader = Some(hostheader.into());
        self
    }

    /// Hostname used for keying; falls back to the ip string.
    pub fn hostname_or_ip(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.ip)
    }

    /// Whether this target is the `(ip, port, hostname)` triple.
    pub fn matches(&self, ip: &str, port: u16, hostname: Option<&str>) -> bool {
        self.ip == ip && self.port == port && self.hostname_or_ip() == hostname.unwrap_or(ip)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hostname {
            Some(ref hostname) if hostname != &self.ip => {
                write!(f, "{}:{} ({})", self.ip, self.port, hostname)
            }
            _ => write!(f, "{}:{}", self.ip, self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_fallback() {
        let bare = Target::new("10.0.0.1", 80, None);
        assert_eq!(bare.hostname_or_ip(), "10.0.0.1");

        let named = Target::new("10.0.0.1", 80, Some("app.internal".to_string()));
        assert_eq!(named.hostname_or_ip(), "app.internal");
    }

    #[test]
    fn test_matches_triple() {
        let target = Target::new("10.0.0.1", 80, None);

        assert!(target.matches("10.0.0.1", 80, None));
        assert!(target.matches("10.0.0.1", 80, Some("10.0.0.1")));
        assert!(!target.matches("10.0.0.1", 81, None));
        assert!(!target.matches("10.0.0.2", 80, None));
        assert!(!target.matches("10.0.0.1", 80, Some("app.internal")));

        let named = Target::new("10.0.0.1", 80, Some("app.internal".to_string()));
        assert!(named.matches("10.0.0.1", 80, Some("app.internal")));
        assert!(!named.matches("10.0.0.1", 80, None));
    }

    #[test]
    fn test_hostheader_not_identity() {
        let plain = Target::new("10.0.0.1", 80, None);
        let with_header = Target::new("10.0.0.1", 80, None).with_hostheader("api.example.com");

        assert!(with_header.matches(&plain.ip, plain.port, plain.hostname.as_deref()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Target::new("10.0.0.1", 80, None).to_string(), "10.0.0.1:80");
        assert_eq!(
            Target::new("10.0.0.1", 80, Some("app.internal".to_string())).to_string(),
            "10.0.0.1:80 (app.internal)"
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let target = Target::new("10.0.0.1", 8080, Some("app.internal".to_string()))
            .with_hostheader("api.example.com");

        let json = serde_json::to_string(&target).unwrap();
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);
    }
}
