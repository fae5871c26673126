//! Radio association seam.

use embassy_time::Duration;

use crate::Result;
use crate::ip_config::Interface;
use crate::profile::ClientProfile;

/// Radio power/performance posture; selects the auto-join retry budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PerformanceProfile {
    /// Single pass over the sorted profiles.
    LowPower,
    /// Full configured pass count.
    HighPerformance,
}

/// Issues connect/disconnect requests to the Wi-Fi radio.
pub trait Associator {
    /// Associate with the profile's network, blocking up to `timeout`.
    ///
    /// # Errors
    ///
    /// Any error is treated as a recoverable per-profile failure by the
    /// coordinator.
    async fn connect(
        &self,
        interface: Interface,
        profile: &ClientProfile,
        timeout: Duration,
    ) -> Result<()>;

    /// Drop the current association on `interface`.
    ///
    /// # Errors
    ///
    /// Driver-specific.
    async fn disconnect(&self, interface: Interface) -> Result<()>;

    /// Current power/performance posture of the radio.
    fn performance_profile(&self) -> PerformanceProfile;
}
