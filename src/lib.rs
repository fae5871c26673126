//! Network bring-up and auto-join coordination for Wi-Fi modules with an
//! offloaded TCP/IP stack.
//!
//! The radio, profile persistence, the offloaded network processor (NWP)
//! and the optional host-side IP stack are trait seams; this crate owns the
//! coordination between them:
//!
//! - [`IpBridge`] routes DHCP/static bring-up to the NWP, the host stack,
//!   or both, per the offload / bypass / dual-stack operating mode.
//! - [`AutoJoin`] is a background coordinator that reacts to disconnect and
//!   connect-failure events by re-sorting the stored profiles and retrying
//!   association in priority order.
//!
//! # Examples
//!
//! ```ignore
//! use net_kit::{
//!     AutoJoin, AutoJoinNotifier, Interface, IpBridge, JoinPolicy, StackMode,
//! };
//!
//! static NOTIFIER: AutoJoinNotifier = AutoJoinNotifier::new();
//!
//! // store, radio and nwp implement the ProfileStore, Associator and
//! // NwpIp seams for the target hardware
//! let bridge = IpBridge::new(StackMode::Offload, &nwp, None)?;
//! let coordinator = AutoJoin::new(&NOTIFIER, &store, &radio, &bridge, JoinPolicy::default());
//!
//! // spawn `coordinator.run()` on the executor, then:
//! let profile = coordinator.auto_join(Interface::Client).await?;
//! ```
#![no_std]
#![allow(
    async_fn_in_trait,
    reason = "single-threaded executors; no Send bound wanted on the seams"
)]

// This must go first so the other modules see its macros.
mod fmt;

mod association;
mod auto_join;
mod error;
mod ip_bridge;
mod ip_config;
mod profile;
mod profile_store;
pub mod sorter;

// Re-export commonly used items
pub use association::{Associator, PerformanceProfile};
pub use auto_join::{AutoJoin, AutoJoinNotifier, JoinPolicy, JoinProgress, LinkEvent, NetMessage};
pub use error::{Error, Result};
pub use ip_bridge::{DHCP_DEADLINE, HostIp, IpBridge, NoHostStack, NwpIp};
pub use ip_config::{Interface, IpManagement, Ipv4Settings, StackMode};
pub use profile::{
    ClientProfile, IpSetup, LOWEST_PRECEDENCE, MAX_CLIENT_PROFILES, Passphrase, ProfileId, Ssid,
};
pub use profile_store::{ProfileStore, StaticProfileStore};
