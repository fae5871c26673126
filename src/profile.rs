//! Persisted Wi-Fi client profiles.
//!
//! A profile is identified by a small numeric slot and carries everything
//! needed to join one network: SSID, passphrase, a priority byte (lower
//! joins first), and the IP setup. After a successful bring-up the resolved
//! addresses are written back into the profile's slot, so a later
//! [`ProfileStore::get`](crate::ProfileStore::get) sees them.

use serde::{Deserialize, Serialize};

use crate::ip_config::{IpManagement, Ipv4Settings};
use crate::{Error, Result};

/// Maximum number of persisted client profiles.
pub const MAX_CLIENT_PROFILES: usize = 8;

/// Priority assigned to profiles whose fetch failed, so they sort last.
pub const LOWEST_PRECEDENCE: u8 = u8::MAX;

/// Numeric profile slot, `0..MAX_CLIENT_PROFILES`.
pub type ProfileId = u8;

/// Network SSID (up to 32 characters).
pub type Ssid = heapless::String<32>;

/// Network passphrase (up to 64 characters).
pub type Passphrase = heapless::String<64>;

/// The IP half of a client profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpSetup {
    pub management: IpManagement,
    /// Addresses to apply when `management` is [`IpManagement::StaticIp`].
    pub static_v4: Ipv4Settings,
    /// Addresses in effect after a successful bring-up.
    pub resolved_v4: Option<Ipv4Settings>,
}

impl IpSetup {
    /// Plain DHCP setup with no addresses resolved yet.
    #[must_use]
    pub const fn dhcp() -> Self {
        Self {
            management: IpManagement::Dhcp,
            static_v4: Ipv4Settings {
                address: core::net::Ipv4Addr::UNSPECIFIED,
                netmask: core::net::Ipv4Addr::UNSPECIFIED,
                gateway: core::net::Ipv4Addr::UNSPECIFIED,
            },
            resolved_v4: None,
        }
    }

    /// Static setup using `settings`.
    #[must_use]
    pub const fn static_ip(settings: Ipv4Settings) -> Self {
        Self {
            management: IpManagement::StaticIp,
            static_v4: settings,
            resolved_v4: None,
        }
    }
}

/// A persisted Wi-Fi client profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub ssid: Ssid,
    pub passphrase: Passphrase,
    /// Lower value joins first.
    pub priority: u8,
    pub ip: IpSetup,
}

impl ClientProfile {
    /// Build a profile from string slices.
    ///
    /// # Errors
    ///
    /// [`Error::ProfileFieldTooLong`] if the SSID or passphrase does not fit
    /// its fixed capacity.
    pub fn new(ssid: &str, passphrase: &str, priority: u8, ip: IpSetup) -> Result<Self> {
        let ssid = Ssid::try_from(ssid).map_err(|()| Error::ProfileFieldTooLong)?;
        let passphrase = Passphrase::try_from(passphrase).map_err(|()| Error::ProfileFieldTooLong)?;
        Ok(Self {
            ssid,
            passphrase,
            priority,
            ip,
        })
    }
}
