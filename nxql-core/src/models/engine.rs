//! Engine directory entries.

use serde::{Deserialize, Serialize};

/// An engine host as listed by the portal's directory endpoint.
///
/// The address is opaque: it is only ever used to build a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engine {
    /// Host name, optionally with an explicit `:port`.
    pub address: String,
    /// Display name, when the portal provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Engine {
    /// Creates an engine entry from an address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    /// Returns `host:port`, appending `default_port` when the address has none.
    pub fn authority(&self, default_port: u16) -> String {
        if has_explicit_port(&self.address) {
            self.address.clone()
        } else {
            format!("{}:{}", self.address, default_port)
        }
    }

    /// Returns the display name, falling back to the address.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}

fn has_explicit_port(address: &str) -> bool {
    // Bracketed IPv6 literals carry colons of their own.
    let host_end = address.rfind(']').map_or(0, |i| i + 1);
    address[host_end..]
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_appends_default_port() {
        let engine = Engine::new("engine-1.example.com");
        assert_eq!(engine.authority(1671), "engine-1.example.com:1671");
    }

    #[test]
    fn test_authority_keeps_explicit_port() {
        let engine = Engine::new("engine-1.example.com:8443");
        assert_eq!(engine.authority(1671), "engine-1.example.com:8443");

        let v6 = Engine::new("[::1]:9000");
        assert_eq!(v6.authority(1671), "[::1]:9000");

        let bare_v6 = Engine::new("[::1]");
        assert_eq!(bare_v6.authority(443), "[::1]:443");
    }

    #[test]
    fn test_label_prefers_name() {
        let mut engine = Engine::new("10.0.0.5");
        assert_eq!(engine.label(), "10.0.0.5");
        engine.name = Some("emea".to_string());
        assert_eq!(engine.label(), "emea");
    }
}
