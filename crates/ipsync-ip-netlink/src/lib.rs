// # Netlink Address Observer
//
// This crate provides an rtnetlink-based `AddressObserver` for Linux.
//
// ## Behavior
//
// Each observation opens a fresh netlink connection, resolves the interface
// by name, dumps its addresses and picks the first global-scope candidate
// per family (the scope predicates live in ipsync-core). A name that
// matches no interface yields empty addresses; only socket-level failures
// are errors.
//
// ## Platform Support
//
// Netlink is Linux-only. On other platforms `observe` fails outright so the
// daemon reports a clear message instead of silently doing nothing.

use async_trait::async_trait;
use ipsync_core::Result;
use ipsync_core::traits::{AddressObserver, ObservedAddrs};

/// Address observer backed by rtnetlink
#[derive(Debug, Clone, Copy, Default)]
pub struct NetlinkObserver;

impl NetlinkObserver {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl AddressObserver for NetlinkObserver {
    async fn observe(&self, interface: &str) -> Result<ObservedAddrs> {
        linux::observe(interface).await
    }
}

#[cfg(not(target_os = "linux"))]
#[async_trait]
impl AddressObserver for NetlinkObserver {
    async fn observe(&self, _interface: &str) -> Result<ObservedAddrs> {
        Err(ipsync_core::Error::observe(
            "the netlink address observer is only supported on Linux",
        ))
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use futures::TryStreamExt;
    use ipsync_core::traits::{ObservedAddrs, first_global_v4, first_global_v6};
    use ipsync_core::{Error, Result};
    use rtnetlink::packet_route::address::AddressAttribute;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use tracing::debug;

    pub(super) async fn observe(interface: &str) -> Result<ObservedAddrs> {
        let (connection, handle, _) = rtnetlink::new_connection()
            .map_err(|e| Error::observe(format!("failed to open netlink socket: {e}")))?;
        tokio::spawn(connection);

        let link = match handle
            .link()
            .get()
            .match_name(interface.to_string())
            .execute()
            .try_next()
            .await
        {
            Ok(link) => link,
            // A name that matches nothing is an empty observation, not an error
            Err(rtnetlink::Error::NetlinkError(ref err)) if err.raw_code() == -libc::ENODEV => {
                None
            }
            Err(e) => {
                return Err(Error::observe(format!(
                    "failed to query interface {interface}: {e}"
                )));
            }
        };

        let Some(link) = link else {
            debug!(interface, "interface not found");
            return Ok(ObservedAddrs::default());
        };

        let mut dump = handle
            .address()
            .get()
            .set_link_index_filter(link.header.index)
            .execute();

        let mut v4s: Vec<Ipv4Addr> = Vec::new();
        let mut v6s: Vec<Ipv6Addr> = Vec::new();

        while let Some(message) = dump.try_next().await.map_err(|e| {
            Error::observe(format!("failed to enumerate addresses on {interface}: {e}"))
        })? {
            for attribute in message.attributes {
                match attribute {
                    AddressAttribute::Address(IpAddr::V4(ip)) => v4s.push(ip),
                    AddressAttribute::Address(IpAddr::V6(ip)) => v6s.push(ip),
                    _ => {}
                }
            }
        }

        debug!(
            interface,
            v4_candidates = v4s.len(),
            v6_candidates = v6s.len(),
            "enumerated interface addresses"
        );

        Ok(ObservedAddrs {
            ipv4: first_global_v4(&v4s),
            ipv6: first_global_v6(&v6s),
        })
    }
}
