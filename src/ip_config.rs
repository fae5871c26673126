//! IP management modes, IPv4 settings, and the offload/bypass/dual-stack
//! operating mode derived from the boot configuration.

use core::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How addresses for an interface are obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpManagement {
    /// Addresses come from the profile's static settings.
    StaticIp,
    /// Plain DHCP client.
    Dhcp,
    /// DHCP requesting a previously held address.
    DhcpReserved,
    /// DHCP carrying the device hostname.
    DhcpWithHostname,
    /// DHCP with vendor-specific options; only the NWP understands these.
    VendorDhcp,
}

impl IpManagement {
    /// Whether this mode is one of the DHCP variants.
    #[must_use]
    pub const fn is_dhcp(self) -> bool {
        !matches!(self, Self::StaticIp)
    }
}

/// IPv4 address, netmask and gateway for one interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Settings {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

impl Default for Ipv4Settings {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::UNSPECIFIED,
            netmask: Ipv4Addr::UNSPECIFIED,
            gateway: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Which stack owns IP management for the device.
///
/// The three modes are mutually exclusive per boot configuration; see
/// [`StackMode::from_feature_flags`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackMode {
    /// The NWP manages IP entirely; no host stack is involved.
    Offload,
    /// The host stack manages IP; the NWP only passes raw frames.
    Bypass,
    /// The NWP manages IP and the result is mirrored into the host stack.
    DualStack,
}

impl StackMode {
    /// Derive the stack mode from the boot-configuration feature flags.
    ///
    /// Setting both flags is a configuration error, not a silently-resolved
    /// state.
    ///
    /// # Errors
    ///
    /// [`Error::ConflictingStackModes`] when both flags are set.
    pub const fn from_feature_flags(bypass: bool, dual_stack: bool) -> Result<Self> {
        match (bypass, dual_stack) {
            (true, true) => Err(Error::ConflictingStackModes),
            (true, false) => Ok(Self::Bypass),
            (false, true) => Ok(Self::DualStack),
            (false, false) => Ok(Self::Offload),
        }
    }
}

/// Network interface role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    Client,
    AccessPoint,
}

impl Interface {
    pub(crate) const COUNT: usize = 2;

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Client => 0,
            Self::AccessPoint => 1,
        }
    }
}
