// ── Source address allowlist ──
//
// Static list of single addresses and CIDR blocks, built once at startup.
// Every lookup normalizes IPv4-mapped IPv6 first, so a dual-stack listener
// reporting `::ffff:10.0.0.5` matches a plain `10.0.0.5` rule.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnetwork::{IpNetwork, Ipv4Network};

use crate::error::CoreError;

/// Offset of the embedded IPv4 prefix inside `::ffff:0:0/96`.
const MAPPED_PREFIX: u8 = 96;

/// One allowlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowRule {
    Address(IpAddr),
    Network(IpNetwork),
}

impl AllowRule {
    pub fn matches(&self, addr: IpAddr) -> bool {
        match self {
            Self::Address(a) => *a == addr,
            Self::Network(net) => net.contains(addr),
        }
    }
}

impl FromStr for AllowRule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = |reason: String| CoreError::Config {
            message: format!("invalid allowlist entry '{raw}': {reason}"),
        };

        if raw.contains('/') {
            let net: IpNetwork = raw.parse().map_err(|e| invalid(format!("{e}")))?;
            return Ok(Self::Network(normalize_network(net)));
        }

        let addr = parse_addr(raw).ok_or_else(|| invalid("not an IP address".into()))?;
        Ok(Self::Address(addr))
    }
}

impl fmt::Display for AllowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "{a}"),
            Self::Network(n) => write!(f, "{n}"),
        }
    }
}

/// Ordered set of allow rules. Any match grants access; no rules, no access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessList {
    rules: Vec<AllowRule>,
}

impl AccessList {
    /// Parse every entry, failing on the first invalid one.
    pub fn parse<I, S>(entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = entries
            .into_iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<AllowRule>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[AllowRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn permits(&self, addr: IpAddr) -> bool {
        let addr = normalize_addr(addr);
        self.rules.iter().any(|rule| rule.matches(addr))
    }

    /// String form of [`permits`](Self::permits). Unparseable input is denied.
    pub fn is_allowed(&self, source: &str) -> bool {
        parse_addr(source).is_some_and(|addr| self.permits(addr))
    }

    /// The first rule granting `addr`, for diagnostics.
    pub fn matching_rule(&self, addr: IpAddr) -> Option<&AllowRule> {
        let addr = normalize_addr(addr);
        self.rules.iter().find(|rule| rule.matches(addr))
    }

    /// String form of [`matching_rule`](Self::matching_rule).
    pub fn rule_for(&self, source: &str) -> Option<&AllowRule> {
        parse_addr(source).and_then(|addr| self.matching_rule(addr))
    }
}

/// Parse a bare address, a bracketed IPv6 address or a socket address.
fn parse_addr(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    if let Ok(addr) = raw.parse::<IpAddr>() {
        return Some(normalize_addr(addr));
    }
    if let Ok(sock) = raw.parse::<SocketAddr>() {
        return Some(normalize_addr(sock.ip()));
    }
    raw.strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .and_then(|r| r.parse::<IpAddr>().ok())
        .map(normalize_addr)
}

fn normalize_addr(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
        IpAddr::V4(_) => addr,
    }
}

fn normalize_network(net: IpNetwork) -> IpNetwork {
    match net {
        IpNetwork::V6(v6) if v6.prefix() >= MAPPED_PREFIX => v6
            .network()
            .to_ipv4_mapped()
            .and_then(|v4| Ipv4Network::new(v4, v6.prefix() - MAPPED_PREFIX).ok())
            .map_or(net, IpNetwork::V4),
        _ => net,
    }
}
