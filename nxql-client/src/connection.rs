//! Connection state and portal host normalization.
//!
//! A [`Connection`] is everything a query batch needs: the normalized portal
//! address, the engine port, the resolved engine list and the shared HTTP
//! client. It is built in one piece by [`Connection::establish`] and never
//! mutated afterwards.

use std::fmt;
use std::time::Duration;

use nxql_core::Engine;
use tracing::{debug, info, instrument};
use url::Url;

use crate::directory;
use crate::error::QueryError;
use crate::host::http::{Credential, DEFAULT_TIMEOUT_SECS, HttpClient, Scheme};

/// Default portal port.
pub const DEFAULT_PORTAL_PORT: u16 = 443;

/// Engine port for cloud-hosted deployments.
pub const CLOUD_ENGINE_PORT: u16 = 443;

/// Engine port for on-premise deployments.
pub const ON_PREMISE_ENGINE_PORT: u16 = 1671;

/// Domain suffix of cloud-hosted deployments.
const CLOUD_DOMAIN_SUFFIX: &str = ".nexthink.cloud";

// ============================================================================
// Connect Options
// ============================================================================

/// Input to the connect operation.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Portal host, optionally with scheme prefix, `:port` and trailing path.
    pub host: String,
    /// Credential sent on every request.
    pub credential: Credential,
    /// Portal port, used when the host has no embedded port.
    pub portal_port: Option<u16>,
    /// Engine port; `None` or `Some(0)` infers it from the host.
    pub engine_port: Option<u16>,
    /// Disable certificate verification for this connection.
    pub skip_cert_validation: bool,
    /// Client-wide request timeout.
    pub timeout: Duration,
    /// URL scheme for portal and engines.
    pub scheme: Scheme,
}

impl ConnectOptions {
    /// Creates options with defaults for everything but host and credential.
    pub fn new(host: impl Into<String>, credential: Credential) -> Self {
        Self {
            host: host.into(),
            credential,
            portal_port: None,
            engine_port: None,
            skip_cert_validation: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            scheme: Scheme::default(),
        }
    }

    /// Sets the portal port.
    #[must_use]
    pub fn with_portal_port(mut self, port: u16) -> Self {
        self.portal_port = Some(port);
        self
    }

    /// Sets the engine port.
    #[must_use]
    pub fn with_engine_port(mut self, port: u16) -> Self {
        self.engine_port = Some(port);
        self
    }

    /// Disables certificate verification.
    #[must_use]
    pub fn skip_cert_validation(mut self, skip: bool) -> Self {
        self.skip_cert_validation = skip;
        self
    }

    /// Sets the client-wide request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the URL scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }
}

// ============================================================================
// Portal Address
// ============================================================================

/// Normalized portal `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalAddress {
    /// Lowercase host name without scheme, port or path.
    pub host: String,
    /// Portal port.
    pub port: u16,
}

impl PortalAddress {
    /// Normalizes a user-supplied host.
    ///
    /// A `http://` or `https://` prefix and anything after the first `/` are
    /// dropped. An embedded `:port` wins over `default_port`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidHost`] if no host remains.
    pub fn parse(input: &str, default_port: Option<u16>) -> Result<Self, QueryError> {
        let trimmed = input.trim();
        let without_scheme = strip_scheme(trimmed);
        let authority = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();

        if authority.is_empty() {
            return Err(QueryError::InvalidHost(input.to_string()));
        }

        // A non-special scheme keeps explicit default ports visible.
        let url = Url::parse(&format!("nxql://{authority}"))
            .map_err(|e| QueryError::InvalidHost(format!("{input}: {e}")))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| QueryError::InvalidHost(input.to_string()))?
            .to_ascii_lowercase();
        let port = url
            .port()
            .or(default_port)
            .unwrap_or(DEFAULT_PORTAL_PORT);

        Ok(Self { host, port })
    }

    /// Returns true if the host belongs to a cloud-hosted deployment.
    pub fn is_cloud(&self) -> bool {
        self.host.ends_with(CLOUD_DOMAIN_SUFFIX)
    }

    /// Resolves the engine port: explicit non-zero value, else inferred.
    pub fn engine_port(&self, explicit: Option<u16>) -> u16 {
        match explicit {
            Some(port) if port != 0 => port,
            _ if self.is_cloud() => CLOUD_ENGINE_PORT,
            _ => ON_PREMISE_ENGINE_PORT,
        }
    }
}

impl fmt::Display for PortalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn strip_scheme(host: &str) -> &str {
    for prefix in ["https://", "http://"] {
        if let Some(rest) = host
            .get(..prefix.len())
            .filter(|head| head.eq_ignore_ascii_case(prefix))
            .and_then(|_| host.get(prefix.len()..))
        {
            return rest;
        }
    }
    host
}

// ============================================================================
// Connection
// ============================================================================

/// An established connection to a portal and its engines.
#[derive(Debug, Clone)]
pub struct Connection {
    portal: PortalAddress,
    engine_port: u16,
    username: String,
    engines: Vec<Engine>,
    scheme: Scheme,
    http: HttpClient,
}

impl Connection {
    /// Normalizes the options, builds the HTTP client and resolves engines.
    ///
    /// # Errors
    ///
    /// Fails if the host is invalid, the client cannot be built, or the
    /// portal does not return a non-empty engine list.
    #[instrument(skip(options), fields(host = %options.host))]
    pub async fn establish(options: ConnectOptions) -> Result<Self, QueryError> {
        let portal = PortalAddress::parse(&options.host, options.portal_port)?;
        let engine_port = portal.engine_port(options.engine_port);
        debug!(portal = %portal, engine_port, "Normalized portal address");

        let http = HttpClient::new(
            &options.credential,
            options.timeout,
            options.skip_cert_validation,
        )?;

        let engines =
            directory::resolve_engines(&http, options.scheme, &portal, options.timeout).await?;

        info!(portal = %portal, engines = engines.len(), "Connected");

        Ok(Self {
            portal,
            engine_port,
            username: options.credential.username,
            engines,
            scheme: options.scheme,
            http,
        })
    }

    /// Builds a connection for an already known engine list, skipping the
    /// directory lookup.
    ///
    /// Engine-targeted calls on a connection without engines fail with
    /// [`QueryError::NotConnected`].
    ///
    /// # Errors
    ///
    /// Fails if the host is invalid or the client cannot be built.
    pub fn with_engines(options: ConnectOptions, engines: Vec<Engine>) -> Result<Self, QueryError> {
        let portal = PortalAddress::parse(&options.host, options.portal_port)?;
        let engine_port = portal.engine_port(options.engine_port);
        let http = HttpClient::new(
            &options.credential,
            options.timeout,
            options.skip_cert_validation,
        )?;

        Ok(Self {
            portal,
            engine_port,
            username: options.credential.username,
            engines,
            scheme: options.scheme,
            http,
        })
    }

    /// Normalized portal address.
    pub fn portal(&self) -> &PortalAddress {
        &self.portal
    }

    /// Port used for engines whose address has none.
    pub fn engine_port(&self) -> u16 {
        self.engine_port
    }

    /// Account the connection authenticates as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Resolved engines, in directory order.
    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    /// URL scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Shared HTTP client.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_host_defaults() {
        let portal = PortalAddress::parse("demo.pac.nexthink.cloud", None).unwrap();
        assert_eq!(portal.to_string(), "demo.pac.nexthink.cloud:443");
        assert!(portal.is_cloud());
        assert_eq!(portal.engine_port(None), 443);
    }

    #[test]
    fn test_on_premise_engine_port() {
        let portal = PortalAddress::parse("portal.corp.local", None).unwrap();
        assert!(!portal.is_cloud());
        assert_eq!(portal.engine_port(None), 1671);
        assert_eq!(portal.engine_port(Some(0)), 1671);
        assert_eq!(portal.engine_port(Some(8443)), 8443);
    }

    #[test]
    fn test_scheme_and_path_are_stripped() {
        let portal = PortalAddress::parse("HTTPS://Portal.Corp.Local/console/", None).unwrap();
        assert_eq!(portal.to_string(), "portal.corp.local:443");

        let portal = PortalAddress::parse("http://portal.corp.local", Some(8443)).unwrap();
        assert_eq!(portal.to_string(), "portal.corp.local:8443");
    }

    #[test]
    fn test_embedded_port_wins() {
        let portal = PortalAddress::parse("portal.corp.local:9443", Some(8443)).unwrap();
        assert_eq!(portal.port, 9443);

        let portal = PortalAddress::parse("https://portal.corp.local:443", Some(8443)).unwrap();
        assert_eq!(portal.port, 443);
    }

    #[test]
    fn test_same_host_normalizes_consistently() {
        let forms = [
            "demo.pac.nexthink.cloud",
            "https://demo.pac.nexthink.cloud",
            "demo.pac.nexthink.cloud:443",
            "https://DEMO.pac.nexthink.cloud:443/",
        ];
        for form in forms {
            let portal = PortalAddress::parse(form, None).unwrap();
            assert_eq!(portal.to_string(), "demo.pac.nexthink.cloud:443", "for {form}");
        }
    }

    #[test]
    fn test_empty_host_is_invalid() {
        assert!(matches!(
            PortalAddress::parse("  ", None),
            Err(QueryError::InvalidHost(_))
        ));
        assert!(matches!(
            PortalAddress::parse("https:///path", None),
            Err(QueryError::InvalidHost(_))
        ));
    }

    #[test]
    fn test_non_ascii_host_near_scheme_length() {
        // 'ä' straddles the byte length of both scheme prefixes.
        for input in ["portalsä.corp.local", "portaä.corp.local", "httpä"] {
            let portal = PortalAddress::parse(input, None).unwrap();
            assert_eq!(portal.port, 443);
            assert_eq!(portal.engine_port(None), 1671);
        }

        let portal = PortalAddress::parse("https://ä.corp.local:8443", None).unwrap();
        assert!(portal.host.ends_with(".corp.local"));
        assert!(!portal.host.contains("//"));
        assert_eq!(portal.port, 8443);
    }

    #[test]
    fn test_connect_options_builder() {
        let options = ConnectOptions::new("portal", Credential::new("u", "p"))
            .with_portal_port(8443)
            .with_engine_port(1671)
            .skip_cert_validation(true)
            .with_scheme(Scheme::Http);
        assert_eq!(options.portal_port, Some(8443));
        assert_eq!(options.engine_port, Some(1671));
        assert!(options.skip_cert_validation);
        assert_eq!(options.scheme, Scheme::Http);
    }
}
