//! # Endpoint
//!
//! A reachable peer, identified by a URI (`scheme://host[:port][/path]`).
//!
//! Equality and hashing use the address only: two endpoints built
//! independently from the same address are interchangeable.

use crate::errors::EndpointError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Network address of a peer in the overlay.
///
/// # Example
///
/// ```rust
/// use shared_types::Endpoint;
///
/// let a = Endpoint::parse("tcp://10.0.0.1:7400").unwrap();
/// let b: Endpoint = "tcp://10.0.0.1:7400".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.port(), Some(7400));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    address: Url,
}

impl Endpoint {
    /// Parse an endpoint from a URI string.
    ///
    /// # Errors
    ///
    /// Returns `EndpointError` if the string is not a URI or has no host.
    pub fn parse(address: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(address).map_err(|e| EndpointError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Build an endpoint from an already parsed URL.
    pub fn from_url(address: Url) -> Result<Self, EndpointError> {
        if address.host_str().map_or(true, str::is_empty) {
            return Err(EndpointError::MissingHost(address.to_string()));
        }
        Ok(Self { address })
    }

    /// Endpoint for a TCP socket address.
    pub fn tcp(addr: std::net::SocketAddr) -> Result<Self, EndpointError> {
        Self::parse(&format!("tcp://{addr}"))
    }

    /// The full underlying address.
    #[must_use]
    pub fn address(&self) -> &Url {
        &self.address
    }

    /// URI scheme, e.g. `tcp` or `mem`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.address.scheme()
    }

    /// Host component.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.address.host_str()
    }

    /// Port component, if one was given.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.address.port()
    }

    /// Path component (empty when none was given).
    #[must_use]
    pub fn path(&self) -> &str {
        self.address.path()
    }

    /// `host:port` form suitable for socket connection, if both are present.
    #[must_use]
    pub fn authority(&self) -> Option<String> {
        let host = self.host()?;
        let port = self.port()?;
        Some(format!("{host}:{port}"))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.address.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;
    use std::hash::{Hash, Hasher};

    fn hash_of(endpoint: &Endpoint) -> u64 {
        let mut hasher = DefaultHasher::new();
        endpoint.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_addresses_are_equal_and_hash_identically() {
        let a = Endpoint::parse("tcp://192.168.1.10:7400/overlay").unwrap();
        let b = Endpoint::parse("tcp://192.168.1.10:7400/overlay").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_different_ports_are_distinct() {
        let a = Endpoint::parse("tcp://192.168.1.10:7400").unwrap();
        let b = Endpoint::parse("tcp://192.168.1.10:7401").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_components() {
        let e = Endpoint::parse("mem://node-a/hypercube").unwrap();
        assert_eq!(e.scheme(), "mem");
        assert_eq!(e.host(), Some("node-a"));
        assert_eq!(e.port(), None);
        assert_eq!(e.path(), "/hypercube");
        assert_eq!(e.authority(), None);
    }

    #[test]
    fn test_tcp_constructor_matches_parse() {
        let addr: std::net::SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let e = Endpoint::tcp(addr).unwrap();
        assert_eq!(e, Endpoint::parse("tcp://127.0.0.1:9000").unwrap());
        assert_eq!(e.authority().as_deref(), Some("127.0.0.1:9000"));
    }

    #[test]
    fn test_rejects_invalid_addresses() {
        assert!(matches!(
            Endpoint::parse("not a uri"),
            Err(EndpointError::InvalidAddress { .. })
        ));
        assert!(matches!(
            Endpoint::parse("mailto:someone@example.com"),
            Err(EndpointError::MissingHost(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip_preserves_identity() {
        let e = Endpoint::parse("tcp://10.1.2.3:7400").unwrap();
        let bytes = bincode::serialize(&e).unwrap();
        let back: Endpoint = bincode::deserialize(&bytes).unwrap();
        assert_eq!(e, back);
        assert_eq!(hash_of(&e), hash_of(&back));
    }
}
