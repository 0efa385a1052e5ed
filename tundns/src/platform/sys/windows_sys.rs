use crate::platform::{AddressFamily, InterfaceInfo};
use std::ffi::OsStr;
use std::io;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::os::windows::ffi::OsStrExt;
use windows::core::{GUID, PWSTR};
use windows::Win32::Foundation::{ERROR_BUFFER_OVERFLOW, NO_ERROR, WIN32_ERROR};
use windows::Win32::NetworkManagement::IpHelper::{
    ConvertInterfaceIndexToLuid, ConvertInterfaceLuidToGuid, GetAdaptersAddresses,
    SetInterfaceDnsSettings, DNS_INTERFACE_SETTINGS, DNS_INTERFACE_SETTINGS_VERSION1,
    DNS_SETTING_IPV6, DNS_SETTING_NAMESERVER, DNS_SETTING_SEARCHLIST, GAA_FLAG_SKIP_ANYCAST,
    GAA_FLAG_SKIP_MULTICAST, GAA_FLAG_SKIP_UNICAST, IP_ADAPTER_ADDRESSES_LH,
};
use windows::Win32::NetworkManagement::Ndis::NET_LUID_LH;
use windows::Win32::Networking::WinSock::{
    AF_INET, AF_INET6, AF_UNSPEC, SOCKADDR, SOCKADDR_IN, SOCKADDR_IN6,
};

fn win32_err(code: WIN32_ERROR, msg: &str) -> io::Error {
    let os = io::Error::from_raw_os_error(code.0 as i32);
    io::Error::new(os.kind(), format!("{}: {}", msg, os))
}

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

pub fn luid_from_index(index: u32) -> io::Result<u64> {
    let mut luid = NET_LUID_LH::default();
    let ret = unsafe { ConvertInterfaceIndexToLuid(index, &mut luid) };
    if ret != NO_ERROR {
        return Err(win32_err(ret, "Failed to convert interface index to LUID"));
    }
    Ok(unsafe { luid.Value })
}

fn guid_from_luid(luid: u64) -> io::Result<GUID> {
    let luid = NET_LUID_LH { Value: luid };
    let mut guid = GUID::zeroed();
    let ret = unsafe { ConvertInterfaceLuidToGuid(&luid, &mut guid) };
    if ret != NO_ERROR {
        return Err(win32_err(ret, "Failed to convert interface LUID to GUID"));
    }
    Ok(guid)
}

unsafe fn sockaddr_to_ip(sa: *const SOCKADDR) -> Option<IpAddr> {
    if sa.is_null() {
        return None;
    }
    unsafe {
        match (*sa).sa_family {
            AF_INET => {
                let v4 = &*(sa as *const SOCKADDR_IN);
                Some(IpAddr::V4(Ipv4Addr::from(u32::from_be(
                    v4.sin_addr.S_un.S_addr,
                ))))
            }
            AF_INET6 => {
                let v6 = &*(sa as *const SOCKADDR_IN6);
                Some(IpAddr::V6(Ipv6Addr::from(v6.sin6_addr.u.Byte)))
            }
            _ => None,
        }
    }
}

// The returned buffer holds the linked list of IP_ADAPTER_ADDRESSES_LH entries.
fn adapter_addresses() -> io::Result<Vec<u64>> {
    let flags = GAA_FLAG_SKIP_UNICAST | GAA_FLAG_SKIP_ANYCAST | GAA_FLAG_SKIP_MULTICAST;
    let mut size: u32 = 16 * 1024;
    loop {
        let mut buf: Vec<u64> = vec![0; (size as usize).div_ceil(8)];
        let ret = unsafe {
            GetAdaptersAddresses(
                AF_UNSPEC.0 as u32,
                flags,
                None,
                Some(buf.as_mut_ptr() as *mut IP_ADAPTER_ADDRESSES_LH),
                &mut size,
            )
        };
        if ret == ERROR_BUFFER_OVERFLOW.0 {
            continue;
        }
        if ret != NO_ERROR.0 {
            return Err(win32_err(WIN32_ERROR(ret), "Failed to get adapter addresses"));
        }
        return Ok(buf);
    }
}

/// Interfaces by friendly name (e.g. `wg0`), the name users configure.
pub fn list_interfaces() -> io::Result<Vec<InterfaceInfo>> {
    let buf = adapter_addresses()?;
    let mut ifaces = Vec::new();
    let mut cur = buf.as_ptr() as *const IP_ADAPTER_ADDRESSES_LH;
    while !cur.is_null() {
        let adapter = unsafe { &*cur };
        let name = unsafe { adapter.FriendlyName.to_string() }
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?;
        // IfIndex is zero when IPv4 is disabled on the adapter
        let index = match unsafe { adapter.Anonymous1.Anonymous.IfIndex } {
            0 => adapter.Ipv6IfIndex,
            index => index,
        };
        ifaces.push(InterfaceInfo { name, index });
        cur = adapter.Next;
    }
    Ok(ifaces)
}

pub fn get_interface_dns(luid: u64) -> io::Result<Vec<IpAddr>> {
    let buf = adapter_addresses()?;
    let mut cur = buf.as_ptr() as *const IP_ADAPTER_ADDRESSES_LH;
    while !cur.is_null() {
        let adapter = unsafe { &*cur };
        if unsafe { adapter.Luid.Value } == luid {
            let mut servers = Vec::new();
            let mut dns = adapter.FirstDnsServerAddress;
            while !dns.is_null() {
                let entry = unsafe { &*dns };
                if let Some(ip) = unsafe { sockaddr_to_ip(entry.Address.lpSockaddr) } {
                    servers.push(ip);
                }
                dns = entry.Next;
            }
            return Ok(servers);
        }
        cur = adapter.Next;
    }
    Err(io::Error::new(
        ErrorKind::NotFound,
        format!("No adapter with LUID {:#x}", luid),
    ))
}

pub fn set_interface_dns(
    luid: u64,
    family: AddressFamily,
    servers: &[IpAddr],
    suffixes: &[String],
) -> io::Result<()> {
    let guid = guid_from_luid(luid)?;
    let mut name_server = wide(
        &servers
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(","),
    );
    let mut search_list = wide(&suffixes.join(","));
    let mut flags = (DNS_SETTING_NAMESERVER | DNS_SETTING_SEARCHLIST) as u64;
    if family == AddressFamily::Ipv6 {
        flags |= DNS_SETTING_IPV6 as u64;
    }
    let settings = DNS_INTERFACE_SETTINGS {
        Version: DNS_INTERFACE_SETTINGS_VERSION1,
        Flags: flags,
        NameServer: PWSTR(name_server.as_mut_ptr()),
        SearchList: PWSTR(search_list.as_mut_ptr()),
        ..Default::default()
    };
    let ret = unsafe { SetInterfaceDnsSettings(guid, &settings) };
    if ret != NO_ERROR {
        return Err(win32_err(ret, "Failed to set interface DNS settings"));
    }
    Ok(())
}
