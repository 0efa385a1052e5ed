use crate::platform::{AddressFamily, InterfaceInfo};
use std::io;
use std::io::ErrorKind;
use std::net::IpAddr;

// Interface-scoped DNS only exists on Windows; unix hosts go through the
// resolver-file or network-service configurators instead.
fn unsupported(op: &str) -> io::Error {
    io::Error::new(
        ErrorKind::Unsupported,
        format!("{} is not available on {}", op, std::env::consts::OS),
    )
}

pub fn list_interfaces() -> io::Result<Vec<InterfaceInfo>> {
    Ok(pnet_datalink::interfaces()
        .into_iter()
        .map(|iface| InterfaceInfo {
            name: iface.name,
            index: iface.index,
        })
        .collect())
}

pub fn luid_from_index(_index: u32) -> io::Result<u64> {
    Err(unsupported("interface LUID lookup"))
}

pub fn get_interface_dns(_luid: u64) -> io::Result<Vec<IpAddr>> {
    Err(unsupported("per-interface DNS query"))
}

pub fn set_interface_dns(
    _luid: u64,
    _family: AddressFamily,
    _servers: &[IpAddr],
    _suffixes: &[String],
) -> io::Result<()> {
    Err(unsupported("per-interface DNS configuration"))
}
