//! Hub address parsing.
//!
//! Operators name a hub as `<ipv4>` or `<ipv4>:<port>`; everything downstream
//! works with the resolved [`Authority`].

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::CoreError;

/// Port of the hub's live log endpoint when none is given.
pub const DEFAULT_LIVE_LOG_PORT: u16 = 9495;

/// Split `input` into an IPv4 address and an optional port.
pub fn parse_ip_and_port(input: &str) -> Result<(Ipv4Addr, Option<u16>), CoreError> {
    let input = input.trim();
    let mut parts = input.split(':');
    let host = parts.next().unwrap_or_default();
    let port = parts.next();

    if parts.next().is_some() {
        return Err(CoreError::InvalidAddress(format!(
            "'{}' is not in <ipv4>[:<port>] format",
            input
        )));
    }

    let ip: Ipv4Addr = host.parse().map_err(|_| {
        CoreError::InvalidAddress(format!("'{}' is not a valid IPv4 address", host))
    })?;

    let port = port.map(|p| parse_port(p)).transpose()?;

    Ok((ip, port))
}

fn parse_port(port: &str) -> Result<u16, CoreError> {
    let invalid = || CoreError::InvalidAddress(format!("'{}' is not a valid port", port));

    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(p) => Ok(p),
    }
}

/// The `host:port` pair identifying a hub's live log endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Authority {
    host: Ipv4Addr,
    port: u16,
}

impl Authority {
    pub fn new(host: Ipv4Addr, port: u16) -> Self {
        Self { host, port }
    }

    /// Parse operator input, falling back to `default_port` when no port is given.
    pub fn resolve(input: &str, default_port: u16) -> Result<Self, CoreError> {
        let (host, port) = parse_ip_and_port(input)?;
        Ok(Self::new(host, port.unwrap_or(default_port)))
    }

    pub fn host(&self) -> Ipv4Addr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base HTTPS URL of the hub's local API.
    pub fn base_url(&self) -> String {
        format!("https://{}/", self)
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip_only() {
        let (ip, port) = parse_ip_and_port("192.168.1.20").unwrap();
        assert_eq!(ip, Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(port, None);
    }

    #[test]
    fn test_parse_ip_and_port() {
        let (ip, port) = parse_ip_and_port("10.0.0.5:9000").unwrap();
        assert_eq!(ip, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(port, Some(9000));
    }

    #[test]
    fn test_parse_rejects_bad_host() {
        assert!(parse_ip_and_port("hub.local").is_err());
        assert!(parse_ip_and_port("256.1.1.1").is_err());
        assert!(parse_ip_and_port("10.0.0").is_err());
        assert!(parse_ip_and_port("").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        assert!(parse_ip_and_port("10.0.0.5:").is_err());
        assert!(parse_ip_and_port("10.0.0.5:0").is_err());
        assert!(parse_ip_and_port("10.0.0.5:-1").is_err());
        assert!(parse_ip_and_port("10.0.0.5:+80").is_err());
        assert!(parse_ip_and_port("10.0.0.5:70000").is_err());
        assert!(parse_ip_and_port("10.0.0.5:abc").is_err());
        assert!(parse_ip_and_port("10.0.0.5:80:81").is_err());
    }

    #[test]
    fn test_resolve_applies_default_port_only_when_missing() {
        let authority = Authority::resolve("10.0.0.5", DEFAULT_LIVE_LOG_PORT).unwrap();
        assert_eq!(authority.to_string(), "10.0.0.5:9495");

        let authority = Authority::resolve("10.0.0.5:8080", DEFAULT_LIVE_LOG_PORT).unwrap();
        assert_eq!(authority.port(), 8080);
        assert_eq!(authority.host(), Ipv4Addr::new(10, 0, 0, 5));
    }

    #[test]
    fn test_resolve_round_trips_ip() {
        for input in ["1.2.3.4", "127.0.0.1:1", "255.255.255.255:65535"] {
            let authority = Authority::resolve(input, DEFAULT_LIVE_LOG_PORT).unwrap();
            let ip = input.split(':').next().unwrap();
            assert_eq!(authority.host().to_string(), ip);
        }
    }

    #[test]
    fn test_base_url() {
        let authority = Authority::new(Ipv4Addr::new(10, 0, 0, 5), 9495);
        assert_eq!(authority.base_url(), "https://10.0.0.5:9495/");
    }
}
