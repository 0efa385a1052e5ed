use crate::dns::DnsError;
use crate::platform::{InterfaceDirectory, InterfaceDnsService};
use std::net::{IpAddr, Ipv4Addr};

/// Only IPv4 is captured. IPv4-mapped IPv6 addresses are unwrapped, anything
/// else of the other family is dropped.
pub(crate) fn canonical_v4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

pub(crate) fn push_unique(acc: &mut Vec<Ipv4Addr>, ip: IpAddr) {
    if let Some(v4) = canonical_v4(ip) {
        // the accumulator is bounded by the host's interface count
        if !acc.contains(&v4) {
            acc.push(v4);
        }
    }
}

/// Collects the DNS servers of every interface except `managed`, keeping the
/// first occurrence of each address in scan order.
pub fn collect_original_servers<B>(managed: &str, backend: &B) -> Result<Vec<Ipv4Addr>, DnsError>
where
    B: InterfaceDirectory + InterfaceDnsService + ?Sized,
{
    let ifaces = backend.list_interfaces().map_err(DnsError::Enumeration)?;
    let mut servers = Vec::new();
    for iface in ifaces {
        if iface.name == managed {
            continue;
        }
        let id = backend
            .resolve_identifier(iface.index)
            .map_err(|e| DnsError::query(&iface.name, e))?;
        let dns = backend
            .dns_servers(id)
            .map_err(|e| DnsError::query(&iface.name, e))?;
        for ip in dns {
            push_unique(&mut servers, ip);
        }
    }
    Ok(servers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::DnsErrorKind;
    use crate::platform::mock::MockInterfaces;

    fn v4(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn test_dedup_in_scan_order() {
        let backend = MockInterfaces::new()
            .with_iface("A", 1, &["10.8.0.1"])
            .with_iface("B", 2, &["1.1.1.1", "8.8.8.8"])
            .with_iface("C", 3, &["8.8.8.8", "9.9.9.9"]);
        let servers = collect_original_servers("A", &backend).unwrap();
        assert_eq!(servers, vec![v4("1.1.1.1"), v4("8.8.8.8"), v4("9.9.9.9")]);
    }

    #[test]
    fn test_managed_interface_never_queried() {
        let backend = MockInterfaces::new()
            .with_iface("eth0", 2, &["192.168.1.1"])
            .with_iface("tun0", 7, &["10.8.0.1", "192.168.1.1"]);
        let servers = collect_original_servers("tun0", &backend).unwrap();
        assert_eq!(servers, vec![v4("192.168.1.1")]);
        assert!(!backend.queried.borrow().contains(&backend.luid_of(7)));
    }

    #[test]
    fn test_equality_by_value() {
        let backend = MockInterfaces::new()
            .with_iface("eth0", 2, &["1.1.1.1"])
            .with_iface("wlan0", 3, &["::ffff:1.1.1.1", "1.0.0.1"]);
        let servers = collect_original_servers("tun0", &backend).unwrap();
        assert_eq!(servers, vec![v4("1.1.1.1"), v4("1.0.0.1")]);
    }

    #[test]
    fn test_other_family_dropped() {
        let backend = MockInterfaces::new()
            .with_iface("eth0", 2, &["2606:4700:4700::1111", "1.1.1.1"])
            .with_iface("eth1", 3, &["fe80::1"]);
        let servers = collect_original_servers("tun0", &backend).unwrap();
        assert_eq!(servers, vec![v4("1.1.1.1")]);
    }

    #[test]
    fn test_no_other_interfaces() {
        let backend = MockInterfaces::new().with_iface("tun0", 1, &["10.0.0.1"]);
        assert!(collect_original_servers("tun0", &backend)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_failure_aborts() {
        let mut backend = MockInterfaces::new().with_iface("eth0", 2, &["1.1.1.1"]);
        backend.fail_list = true;
        let err = collect_original_servers("tun0", &backend).unwrap_err();
        assert_eq!(err.kind(), DnsErrorKind::EnumerationFailure);
    }

    #[test]
    fn test_query_failure_names_interface() {
        let mut backend = MockInterfaces::new()
            .with_iface("eth0", 2, &["1.1.1.1"])
            .with_iface("wlan0", 3, &["8.8.8.8"]);
        backend.fail_query = vec![3];
        let err = collect_original_servers("tun0", &backend).unwrap_err();
        assert_eq!(err.kind(), DnsErrorKind::QueryFailure);
        assert!(err.to_string().contains("wlan0"));
    }

    #[test]
    fn test_stale_index_is_query_failure() {
        let mut backend = MockInterfaces::new().with_iface("eth0", 2, &["1.1.1.1"]);
        backend.fail_resolve = vec![2];
        let err = collect_original_servers("tun0", &backend).unwrap_err();
        assert_eq!(err.kind(), DnsErrorKind::QueryFailure);
        assert!(backend.queried.borrow().is_empty());
    }
}
