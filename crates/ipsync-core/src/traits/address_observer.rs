// # Address Observer Trait
//
// Defines the interface for reading the public addresses bound to a named
// network interface, plus the scope predicates that decide which candidate
// addresses qualify as public.
//
// ## Implementations
//
// - Netlink-based (Linux): `ipsync-ip-netlink` crate
//
// Observers enumerate; they make no decisions about whether DNS needs an
// update. That is owned by the reconciler.

use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Best-effort public addresses observed on an interface
///
/// A `None` family means no qualifying address was bound to the interface,
/// which is an ordinary outcome (link down, v6-only network, ...), not an
/// error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservedAddrs {
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

/// Trait for address observer implementations
///
/// `observe` fails only when interface enumeration itself fails (socket or
/// permission errors). An interface name that matches nothing yields empty
/// [`ObservedAddrs`].
#[async_trait]
pub trait AddressObserver: Send + Sync {
    /// Enumerate `interface` and return its qualifying public addresses
    async fn observe(&self, interface: &str) -> Result<ObservedAddrs, crate::Error>;
}

/// Whether an IPv4 address is usable as a public DNS record target
///
/// Rejects unspecified, loopback, link-local (169.254/16) and RFC1918
/// private ranges.
pub fn is_global_v4(ip: Ipv4Addr) -> bool {
    !(ip.is_unspecified() || ip.is_loopback() || ip.is_link_local() || ip.is_private())
}

/// Whether an IPv6 address is usable as a public DNS record target
///
/// Rejects unspecified, loopback, unicast link-local (fe80::/10) and
/// interface-local multicast (ff01::/16). Unique-local addresses (fc00::/7)
/// are accepted even though they are not globally routable.
pub fn is_global_v6(ip: Ipv6Addr) -> bool {
    !(ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_unicast_link_local()
        || is_interface_local_multicast(ip))
}

fn is_interface_local_multicast(ip: Ipv6Addr) -> bool {
    ip.is_multicast() && (ip.segments()[0] & 0x000f) == 0x0001
}

/// First qualifying IPv4 address among the interface's candidates
pub fn first_global_v4(candidates: &[Ipv4Addr]) -> Option<Ipv4Addr> {
    candidates.iter().copied().find(|ip| is_global_v4(*ip))
}

/// First qualifying IPv6 address among the interface's candidates
pub fn first_global_v6(candidates: &[Ipv6Addr]) -> Option<Ipv6Addr> {
    candidates.iter().copied().find(|ip| is_global_v6(*ip))
}
