use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Configuration errors are detected synchronously, before any network
/// activity begins. Transient errors (association, bring-up, DHCP) are
/// recoverable inside the coordinator; only `AutoJoinExhausted` surfaces
/// once every profile and retry pass has failed.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[display("bypass and dual-stack modes are mutually exclusive")]
    ConflictingStackModes,

    #[display("IP management mode is not valid for this interface role")]
    InvalidIpManagement,

    #[display("operating mode requires a host IP stack")]
    HostStackRequired,

    #[display("access-point role is not available in bypass mode")]
    ApUnavailableInBypass,

    #[display("profile field exceeds its capacity")]
    ProfileFieldTooLong,

    #[display("no profile stored under the requested ID")]
    ProfileNotFound,

    #[display("profile store has no slot for the requested ID")]
    ProfileStoreFull,

    #[display("association with the access point failed")]
    AssociationFailed,

    #[display("IP bring-up failed")]
    IpBringUpFailed,

    #[display("DHCP did not supply an address before the deadline")]
    DhcpTimeout,

    #[display("every profile failed across every retry pass")]
    AutoJoinExhausted,

    #[display("coordinator message queue is full")]
    QueueFull,

    #[display("coordinator has been shut down")]
    CoordinatorStopped,
}
