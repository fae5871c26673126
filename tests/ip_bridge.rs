//! Host-level tests for the IP configuration bridge.

use core::cell::RefCell;
use core::net::Ipv4Addr;

use embassy_futures::block_on;
use embassy_time::{Duration, Timer};
use net_kit::{
    Error, HostIp, Interface, IpBridge, IpManagement, IpSetup, Ipv4Settings, NoHostStack, NwpIp,
    Result, StackMode,
};

fn settings(last_octet: u8) -> Ipv4Settings {
    Ipv4Settings {
        address: Ipv4Addr::new(10, 0, 0, last_octet),
        netmask: Ipv4Addr::new(255, 255, 255, 0),
        gateway: Ipv4Addr::new(10, 0, 0, 1),
    }
}

/// NWP that always resolves 10.0.0.77 and counts configure calls.
#[derive(Default)]
struct FakeNwp {
    configured: RefCell<u32>,
}

impl NwpIp for FakeNwp {
    async fn configure(&self, _interface: Interface, _setup: &IpSetup) -> Result<Ipv4Settings> {
        *self.configured.borrow_mut() += 1;
        Ok(settings(77))
    }
}

/// Host stack that leases 10.0.0.50 and records adopted addresses.
#[derive(Default)]
struct FakeHost {
    adopted: RefCell<Option<Ipv4Settings>>,
    dhcp_runs: RefCell<u32>,
    downs: RefCell<u32>,
}

impl HostIp for FakeHost {
    async fn acquire_dhcp(&self) -> Result<Ipv4Settings> {
        *self.dhcp_runs.borrow_mut() += 1;
        Ok(settings(50))
    }

    fn adopt(&self, settings: &Ipv4Settings) {
        *self.adopted.borrow_mut() = Some(*settings);
    }

    fn link_down(&self) {
        *self.downs.borrow_mut() += 1;
    }
}

/// Host stack whose DHCP client never finishes.
struct StuckHost;

impl HostIp for StuckHost {
    async fn acquire_dhcp(&self) -> Result<Ipv4Settings> {
        loop {
            Timer::after(Duration::from_millis(10)).await;
        }
    }

    fn adopt(&self, _settings: &Ipv4Settings) {}

    fn link_down(&self) {}
}

#[test]
fn conflicting_flags_are_rejected_before_any_activity() {
    assert_eq!(
        StackMode::from_feature_flags(true, true),
        Err(Error::ConflictingStackModes)
    );

    let nwp = FakeNwp::default();
    let host = FakeHost::default();
    let bridge = IpBridge::from_feature_flags(true, true, &nwp, Some(&host));
    assert!(matches!(bridge, Err(Error::ConflictingStackModes)));
    assert_eq!(*nwp.configured.borrow(), 0);
    assert_eq!(*host.dhcp_runs.borrow(), 0);
}

#[test]
fn flag_combinations_map_to_modes() {
    assert_eq!(StackMode::from_feature_flags(false, false), Ok(StackMode::Offload));
    assert_eq!(StackMode::from_feature_flags(true, false), Ok(StackMode::Bypass));
    assert_eq!(StackMode::from_feature_flags(false, true), Ok(StackMode::DualStack));
}

#[test]
fn bypass_without_host_stack_is_rejected() {
    let nwp = FakeNwp::default();
    let bridge: Result<IpBridge<'_, _, NoHostStack>> =
        IpBridge::new(StackMode::Bypass, &nwp, None);
    assert!(matches!(bridge, Err(Error::HostStackRequired)));
}

#[test]
fn offload_touches_only_the_nwp() {
    let nwp = FakeNwp::default();
    let bridge: IpBridge<'_, _, NoHostStack> =
        IpBridge::new(StackMode::Offload, &nwp, None).expect("offload needs no host");

    let mut setup = IpSetup::dhcp();
    block_on(bridge.bring_up(Interface::Client, &mut setup)).expect("bring-up");

    assert_eq!(setup.resolved_v4, Some(settings(77)));
    assert_eq!(*nwp.configured.borrow(), 1);
    assert_eq!(bridge.ip_management(Interface::Client), IpManagement::Dhcp);
}

#[test]
fn bypass_dhcp_runs_on_the_host_stack() {
    let nwp = FakeNwp::default();
    let host = FakeHost::default();
    let bridge = IpBridge::new(StackMode::Bypass, &nwp, Some(&host)).expect("host supplied");

    let mut setup = IpSetup::dhcp();
    block_on(bridge.bring_up(Interface::Client, &mut setup)).expect("bring-up");

    assert_eq!(setup.resolved_v4, Some(settings(50)));
    assert_eq!(*host.dhcp_runs.borrow(), 1);
    // the NWP is not asked to manage IP
    assert_eq!(*nwp.configured.borrow(), 0);
}

#[test]
fn bypass_static_applies_addresses_directly() {
    let nwp = FakeNwp::default();
    let host = FakeHost::default();
    let bridge = IpBridge::new(StackMode::Bypass, &nwp, Some(&host)).expect("host supplied");

    let mut setup = IpSetup::static_ip(settings(9));
    block_on(bridge.bring_up(Interface::Client, &mut setup)).expect("bring-up");

    assert_eq!(*host.adopted.borrow(), Some(settings(9)));
    assert_eq!(setup.resolved_v4, Some(settings(9)));
    assert_eq!(*nwp.configured.borrow(), 0);
    assert_eq!(
        bridge.ip_management(Interface::Client),
        IpManagement::StaticIp
    );
}

#[test]
fn bypass_rejects_nwp_only_dhcp_variants() {
    let nwp = FakeNwp::default();
    let host = FakeHost::default();
    let bridge = IpBridge::new(StackMode::Bypass, &nwp, Some(&host)).expect("host supplied");

    for management in [
        IpManagement::DhcpReserved,
        IpManagement::DhcpWithHostname,
        IpManagement::VendorDhcp,
    ] {
        let mut setup = IpSetup::dhcp();
        setup.management = management;
        let result = block_on(bridge.bring_up(Interface::Client, &mut setup));
        assert_eq!(result, Err(Error::InvalidIpManagement));
        assert_eq!(setup.resolved_v4, None);
    }
}

#[test]
fn dual_stack_mirrors_the_nwp_lease_into_the_host() {
    let nwp = FakeNwp::default();
    let host = FakeHost::default();
    let bridge = IpBridge::new(StackMode::DualStack, &nwp, Some(&host)).expect("host supplied");

    let mut setup = IpSetup::dhcp();
    block_on(bridge.bring_up(Interface::Client, &mut setup)).expect("bring-up");

    assert_eq!(*nwp.configured.borrow(), 1);
    assert_eq!(*host.adopted.borrow(), Some(settings(77)));
    assert_eq!(setup.resolved_v4, Some(settings(77)));
    // both views agree
    assert_eq!(*host.dhcp_runs.borrow(), 0);
}

#[test]
fn host_dhcp_is_bounded_by_the_deadline() {
    let nwp = FakeNwp::default();
    let host = StuckHost;
    let bridge = IpBridge::new(StackMode::Bypass, &nwp, Some(&host))
        .expect("host supplied")
        .with_dhcp_deadline(Duration::from_millis(5));

    let mut setup = IpSetup::dhcp();
    let result = block_on(bridge.bring_up(Interface::Client, &mut setup));
    assert_eq!(result, Err(Error::DhcpTimeout));
    assert_eq!(setup.resolved_v4, None);
}

#[test]
fn ap_role_rejects_client_style_dhcp() {
    let nwp = FakeNwp::default();
    let bridge: IpBridge<'_, _, NoHostStack> =
        IpBridge::new(StackMode::Offload, &nwp, None).expect("offload needs no host");

    let mut setup = IpSetup::dhcp();
    let result = block_on(bridge.bring_up_ap(&mut setup));
    assert_eq!(result, Err(Error::InvalidIpManagement));
    // rejected before any network activity
    assert_eq!(*nwp.configured.borrow(), 0);
}

#[test]
fn ap_role_accepts_static_addresses() {
    let nwp = FakeNwp::default();
    let bridge: IpBridge<'_, _, NoHostStack> =
        IpBridge::new(StackMode::Offload, &nwp, None).expect("offload needs no host");

    let mut setup = IpSetup::static_ip(settings(2));
    block_on(bridge.bring_up_ap(&mut setup)).expect("bring-up");
    assert_eq!(setup.resolved_v4, Some(settings(77)));
    assert_eq!(
        bridge.ip_management(Interface::AccessPoint),
        IpManagement::StaticIp
    );
}

#[test]
fn ap_role_is_unavailable_in_bypass() {
    let nwp = FakeNwp::default();
    let host = FakeHost::default();
    let bridge = IpBridge::new(StackMode::Bypass, &nwp, Some(&host)).expect("host supplied");

    let mut setup = IpSetup::static_ip(settings(2));
    let result = block_on(bridge.bring_up_ap(&mut setup));
    assert_eq!(result, Err(Error::ApUnavailableInBypass));
}

#[test]
fn bring_down_stops_the_host_link_and_resets_bookkeeping() {
    let nwp = FakeNwp::default();
    let host = FakeHost::default();
    let bridge = IpBridge::new(StackMode::Bypass, &nwp, Some(&host)).expect("host supplied");

    let mut setup = IpSetup::static_ip(settings(9));
    block_on(bridge.bring_up(Interface::Client, &mut setup)).expect("bring-up");
    assert_eq!(
        bridge.ip_management(Interface::Client),
        IpManagement::StaticIp
    );

    bridge.bring_down(Interface::Client);
    assert_eq!(*host.downs.borrow(), 1);
    assert_eq!(bridge.ip_management(Interface::Client), IpManagement::Dhcp);
}

#[test]
fn bring_down_in_offload_leaves_the_host_alone() {
    let nwp = FakeNwp::default();
    let bridge: IpBridge<'_, _, NoHostStack> =
        IpBridge::new(StackMode::Offload, &nwp, None).expect("offload needs no host");
    // no host stack to stop; only the bookkeeping resets
    bridge.bring_down(Interface::Client);
    assert_eq!(bridge.ip_management(Interface::Client), IpManagement::Dhcp);
}
