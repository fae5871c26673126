//! Background coordinator that re-joins the best-priority known network
//! after a disconnect or connect failure.
//!
//! The coordinator is one long-lived future ([`AutoJoin::run`]) the
//! application spawns on its executor, the same shape as
//! `cyw43::Runner::run`. It blocks on a FIFO message channel when idle;
//! a disconnect or connect-failure message starts a join cycle:
//!
//! 1. fetch and sort the stored profiles by ascending priority,
//! 2. attempt association + IP bring-up for each profile in order,
//! 3. if a whole pass fails, back off and repeat up to the retry budget
//!    (one pass in low-power mode, the configured count otherwise),
//! 4. signal the outcome so a blocked [`AutoJoin::auto_join`] caller wakes.
//!
//! Per-profile failures are logged and swallowed; only the aggregate
//! outcome surfaces. Progress notifications (`InProgress`, then
//! `Connected` or `Failed`) are delivered through a bounded event channel
//! instead of a registered callback.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

use crate::association::{Associator, PerformanceProfile};
use crate::ip_bridge::{HostIp, IpBridge, NwpIp};
use crate::ip_config::Interface;
use crate::profile::{ClientProfile, MAX_CLIENT_PROFILES, ProfileId};
use crate::profile_store::ProfileStore;
use crate::sorter;
use crate::{Error, Result};

/// Link-state change reported by the radio event path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    Connect,
    Disconnect,
    ConnectFailure,
}

/// Message consumed by the coordinator's queue, strictly in FIFO order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetMessage {
    /// Link-state change on `interface`.
    Link {
        interface: Interface,
        event: LinkEvent,
    },
    /// Tear the coordinator down; [`AutoJoin::run`] returns after this.
    Shutdown,
}

/// Auto-join progress, in the order a caller observes it: exactly one
/// `InProgress` per sorting pass, one terminal event per join cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinProgress {
    InProgress,
    Connected,
    Failed,
}

/// Terminal outcome of one join cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JoinOutcome {
    Connected(ProfileId),
    Exhausted,
    Stopped,
}

/// Retry/backoff policy for the coordinator.
#[derive(Clone, Copy, Debug)]
pub struct JoinPolicy {
    /// Per-profile association timeout handed to the driver.
    pub connect_timeout: Duration,
    /// Full passes over the sorted list in high-performance mode.
    pub retry_passes: u8,
    /// Delay between passes.
    pub retry_backoff: Duration,
}

impl JoinPolicy {
    /// Pass budget for the radio's current posture.
    #[must_use]
    pub const fn passes_for(&self, posture: PerformanceProfile) -> u8 {
        match posture {
            PerformanceProfile::LowPower => 1,
            PerformanceProfile::HighPerformance => self.retry_passes,
        }
    }
}

impl Default for JoinPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            retry_passes: 3,
            retry_backoff: Duration::from_secs(3),
        }
    }
}

const MESSAGE_DEPTH: usize = 4;
// one InProgress plus one terminal per cycle; sized for a few queued cycles
const PROGRESS_DEPTH: usize = 8;

type Messages = Channel<CriticalSectionRawMutex, NetMessage, MESSAGE_DEPTH>;
type Progress = Channel<CriticalSectionRawMutex, JoinProgress, PROGRESS_DEPTH>;
type Outcome = Signal<CriticalSectionRawMutex, JoinOutcome>;

/// Queue/flag set backing one coordinator.
///
/// Created once as a `static` and shared between the coordinator future and
/// every caller; repeated [`AutoJoin::auto_join`] calls reuse it.
pub struct AutoJoinNotifier {
    messages: Messages,
    progress: Progress,
    outcome: Outcome,
    stopped: AtomicBool,
}

impl AutoJoinNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Channel::new(),
            progress: Channel::new(),
            outcome: Signal::new(),
            stopped: AtomicBool::new(false),
        }
    }
}

impl Default for AutoJoinNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Auto-join coordinator over a profile store, a radio driver, and the IP
/// configuration bridge.
pub struct AutoJoin<'d, S, A, N, H> {
    resources: &'static AutoJoinNotifier,
    store: &'d S,
    driver: &'d A,
    bridge: &'d IpBridge<'d, N, H>,
    policy: JoinPolicy,
}

impl<'d, S, A, N, H> AutoJoin<'d, S, A, N, H>
where
    S: ProfileStore,
    A: Associator,
    N: NwpIp,
    H: HostIp,
{
    pub fn new(
        resources: &'static AutoJoinNotifier,
        store: &'d S,
        driver: &'d A,
        bridge: &'d IpBridge<'d, N, H>,
        policy: JoinPolicy,
    ) -> Self {
        Self {
            resources,
            store,
            driver,
            bridge,
            policy,
        }
    }

    /// Report a link-state change from the radio event path.
    ///
    /// Non-blocking, so it is callable from callback context; the message
    /// lands in the coordinator's FIFO queue.
    ///
    /// # Errors
    ///
    /// [`Error::QueueFull`] if the coordinator is too far behind.
    pub fn notify_link_event(&self, interface: Interface, event: LinkEvent) -> Result<()> {
        self.resources
            .messages
            .try_send(NetMessage::Link { interface, event })
            .map_err(|_| Error::QueueFull)
    }

    /// Request coordinator teardown. Irreversible: [`AutoJoin::run`] returns
    /// once the message is processed and a blocked caller is released with
    /// [`Error::CoordinatorStopped`].
    ///
    /// # Errors
    ///
    /// [`Error::QueueFull`] if the request could not be queued.
    pub fn shutdown(&self) -> Result<()> {
        self.resources
            .messages
            .try_send(NetMessage::Shutdown)
            .map_err(|_| Error::QueueFull)
    }

    /// Wait for the next progress notification.
    pub async fn progress(&self) -> JoinProgress {
        self.resources.progress.receive().await
    }

    /// Take a pending progress notification without waiting.
    pub fn try_progress(&self) -> Option<JoinProgress> {
        self.resources.progress.try_receive().ok()
    }

    /// Connect to the best-priority stored profile.
    ///
    /// Blocks until a profile associates and completes IP bring-up (returns
    /// that profile, resolved addresses filled in) or the retry budget is
    /// exhausted. The coordinator future must be running.
    ///
    /// # Errors
    ///
    /// [`Error::AutoJoinExhausted`] when every profile failed across every
    /// retry pass; [`Error::CoordinatorStopped`] after [`AutoJoin::shutdown`].
    pub async fn auto_join(&self, interface: Interface) -> Result<ClientProfile> {
        self.resources.outcome.reset();
        // the stopped flag is raised before the Stopped signal, so checking
        // it after the reset cannot lose a teardown that already happened
        if self.resources.stopped.load(Ordering::Acquire) {
            return Err(Error::CoordinatorStopped);
        }
        // the trigger is indistinguishable from a disconnect: nothing is
        // associated yet and a fresh sorting pass is wanted
        self.resources
            .messages
            .send(NetMessage::Link {
                interface,
                event: LinkEvent::Disconnect,
            })
            .await;
        match self.resources.outcome.wait().await {
            JoinOutcome::Connected(id) => self.store.get(id),
            JoinOutcome::Exhausted => Err(Error::AutoJoinExhausted),
            JoinOutcome::Stopped => Err(Error::CoordinatorStopped),
        }
    }

    /// Coordinator task body. Spawn once; returns only after
    /// [`AutoJoin::shutdown`].
    pub async fn run(&self) {
        loop {
            match self.resources.messages.receive().await {
                NetMessage::Shutdown => {
                    info!("auto-join: shutting down");
                    self.resources.stopped.store(true, Ordering::Release);
                    self.resources.outcome.signal(JoinOutcome::Stopped);
                    return;
                }
                NetMessage::Link {
                    event: LinkEvent::Connect,
                    ..
                } => {
                    // already associated; nothing to coordinate
                }
                NetMessage::Link { interface, .. } => {
                    let outcome = self.rejoin(interface).await;
                    self.resources.outcome.signal(outcome);
                }
            }
        }
    }

    /// One full join cycle: sort once, then iterate the same order across
    /// every retry pass.
    async fn rejoin(&self, interface: Interface) -> JoinOutcome {
        let mut ranks = sorter::collect_ranks::<_, MAX_CLIENT_PROFILES>(self.store);
        sorter::sort_by_priority(&mut ranks);
        self.notify_progress(JoinProgress::InProgress);

        let passes = self.policy.passes_for(self.driver.performance_profile());
        for pass in 1..=passes {
            info!("auto-join: pass {}/{}", pass, passes);
            for &(id, priority) in &ranks {
                match self.try_profile(interface, id).await {
                    Ok(()) => {
                        info!("auto-join: profile {} up", id);
                        self.notify_progress(JoinProgress::Connected);
                        return JoinOutcome::Connected(id);
                    }
                    Err(err) => {
                        warn!(
                            "auto-join: profile {} (priority {}) failed: {:?}",
                            id, priority, err
                        );
                    }
                }
            }
            if pass < passes {
                Timer::after(self.policy.retry_backoff).await;
            }
        }
        warn!("auto-join: exhausted after {} passes", passes);
        self.notify_progress(JoinProgress::Failed);
        JoinOutcome::Exhausted
    }

    async fn try_profile(&self, interface: Interface, id: ProfileId) -> Result<()> {
        let mut profile = self.store.get(id)?;
        self.driver
            .connect(interface, &profile, self.policy.connect_timeout)
            .await?;
        self.bridge.bring_up(interface, &mut profile.ip).await?;
        // write the resolved addresses back so callers see them
        self.store.set(id, &profile)
    }

    fn notify_progress(&self, event: JoinProgress) {
        // overflow drops the event rather than blocking the coordinator
        let _ = self.resources.progress.try_send(event);
    }
}
