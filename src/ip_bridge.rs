//! Applies a profile's IP configuration to the offloaded network processor,
//! the host-side stack, or both, depending on the operating mode.
//!
//! The three operating modes route bring-up differently:
//!
//! - **Offload**: the NWP owns addressing; the host stack is never touched.
//! - **Bypass**: the host stack performs DHCP or applies static addresses;
//!   the NWP is not asked to manage IP.
//! - **Dual-stack**: the NWP performs the configuration and the resolved
//!   addresses are mirrored into the host stack so both views agree.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embassy_time::{Duration, with_timeout};

use crate::ip_config::{Interface, IpManagement, Ipv4Settings, StackMode};
use crate::profile::IpSetup;
use crate::{Error, Result};

/// Default bound on host-side DHCP acquisition.
pub const DHCP_DEADLINE: Duration = Duration::from_secs(30);

/// IP configuration on the offloaded network processor.
pub trait NwpIp {
    /// Apply `setup` for `interface` and return the resolved addresses.
    ///
    /// # Errors
    ///
    /// Driver-specific; treated as a recoverable bring-up failure.
    async fn configure(&self, interface: Interface, setup: &IpSetup) -> Result<Ipv4Settings>;
}

/// IP state of the local host stack's interface.
pub trait HostIp {
    /// Start the DHCP client and wait until an address is supplied.
    ///
    /// The bridge bounds this wait with its DHCP deadline; implementations
    /// need not enforce their own timeout.
    ///
    /// # Errors
    ///
    /// Stack-specific; treated as a recoverable bring-up failure.
    async fn acquire_dhcp(&self) -> Result<Ipv4Settings>;

    /// Assign `settings` directly and mark the interface up.
    fn adopt(&self, settings: &Ipv4Settings);

    /// Stop DHCP and mark the interface down.
    fn link_down(&self);
}

/// Host stack placeholder for offload-only configurations.
pub struct NoHostStack;

impl HostIp for NoHostStack {
    async fn acquire_dhcp(&self) -> Result<Ipv4Settings> {
        Err(Error::HostStackRequired)
    }

    fn adopt(&self, _settings: &Ipv4Settings) {}

    fn link_down(&self) {}
}

/// Bring-up/bring-down routing for one device.
pub struct IpBridge<'d, N, H> {
    mode: StackMode,
    nwp: &'d N,
    host: Option<&'d H>,
    dhcp_deadline: Duration,
    // management mode last applied per interface, client then AP
    management: Mutex<CriticalSectionRawMutex, RefCell<[IpManagement; Interface::COUNT]>>,
}

impl<'d, N: NwpIp, H: HostIp> IpBridge<'d, N, H> {
    /// Create a bridge for `mode`.
    ///
    /// # Errors
    ///
    /// [`Error::HostStackRequired`] if `mode` is bypass or dual-stack and
    /// no host stack was supplied. Offload-only ignores `host`.
    pub fn new(mode: StackMode, nwp: &'d N, host: Option<&'d H>) -> Result<Self> {
        if !matches!(mode, StackMode::Offload) && host.is_none() {
            return Err(Error::HostStackRequired);
        }
        Ok(Self {
            mode,
            nwp,
            host,
            dhcp_deadline: DHCP_DEADLINE,
            management: Mutex::new(RefCell::new([IpManagement::Dhcp; Interface::COUNT])),
        })
    }

    /// Derive the operating mode from the boot-configuration feature flags,
    /// then construct.
    ///
    /// # Errors
    ///
    /// [`Error::ConflictingStackModes`] when both flags are set, before any
    /// network activity begins; otherwise as [`IpBridge::new`].
    pub fn from_feature_flags(
        bypass: bool,
        dual_stack: bool,
        nwp: &'d N,
        host: Option<&'d H>,
    ) -> Result<Self> {
        Self::new(StackMode::from_feature_flags(bypass, dual_stack)?, nwp, host)
    }

    /// Replace the default bound on host-side DHCP acquisition.
    #[must_use]
    pub const fn with_dhcp_deadline(mut self, deadline: Duration) -> Self {
        self.dhcp_deadline = deadline;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> StackMode {
        self.mode
    }

    fn host(&self) -> Result<&'d H> {
        self.host.ok_or(Error::HostStackRequired)
    }

    /// Bring the client interface up per the profile's management mode,
    /// filling `setup.resolved_v4` on success.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIpManagement`] for NWP-only DHCP variants in bypass
    /// mode; [`Error::DhcpTimeout`] if host DHCP misses the deadline; or the
    /// underlying stack's error.
    pub async fn bring_up(&self, interface: Interface, setup: &mut IpSetup) -> Result<()> {
        let resolved = match self.mode {
            StackMode::Offload => self.nwp.configure(interface, setup).await?,
            StackMode::DualStack => {
                // the NWP owns the lease; mirror the result into the host stack
                let resolved = self.nwp.configure(interface, setup).await?;
                self.host()?.adopt(&resolved);
                resolved
            }
            StackMode::Bypass => match setup.management {
                IpManagement::Dhcp => {
                    let host = self.host()?;
                    with_timeout(self.dhcp_deadline, host.acquire_dhcp())
                        .await
                        .map_err(|_| Error::DhcpTimeout)??
                }
                IpManagement::StaticIp => {
                    self.host()?.adopt(&setup.static_v4);
                    setup.static_v4
                }
                // reserved/hostname/vendor DHCP exist only on the NWP
                IpManagement::DhcpReserved
                | IpManagement::DhcpWithHostname
                | IpManagement::VendorDhcp => return Err(Error::InvalidIpManagement),
            },
        };
        debug!("ip bridge: {:?} up, management {:?}", interface, setup.management);
        setup.resolved_v4 = Some(resolved);
        self.record_management(interface, setup.management);
        Ok(())
    }

    /// Validate and apply an access-point profile's IP configuration.
    ///
    /// # Errors
    ///
    /// [`Error::ApUnavailableInBypass`] in bypass mode;
    /// [`Error::InvalidIpManagement`] for any DHCP variant, since the AP
    /// role supports static addressing only.
    pub async fn bring_up_ap(&self, setup: &mut IpSetup) -> Result<()> {
        if matches!(self.mode, StackMode::Bypass) {
            return Err(Error::ApUnavailableInBypass);
        }
        // AP + DHCP client and AP + link-local are not supported
        if setup.management.is_dhcp() {
            return Err(Error::InvalidIpManagement);
        }
        let resolved = self.nwp.configure(Interface::AccessPoint, setup).await?;
        setup.resolved_v4 = Some(resolved);
        self.record_management(Interface::AccessPoint, setup.management);
        Ok(())
    }

    /// Take `interface` down, stopping host DHCP in bypass/dual-stack, and
    /// reset its management bookkeeping to DHCP.
    pub fn bring_down(&self, interface: Interface) {
        if !matches!(self.mode, StackMode::Offload) {
            if let Some(host) = self.host {
                host.link_down();
            }
        }
        debug!("ip bridge: {:?} down", interface);
        self.record_management(interface, IpManagement::Dhcp);
    }

    /// Management mode last applied to `interface`.
    pub fn ip_management(&self, interface: Interface) -> IpManagement {
        self.management.lock(|state| state.borrow()[interface.index()])
    }

    fn record_management(&self, interface: Interface, management: IpManagement) {
        self.management
            .lock(|state| state.borrow_mut()[interface.index()] = management);
    }
}
