use std::ffi::OsStr;
use std::io;
use std::io::ErrorKind;
use std::net::IpAddr;
use std::process::{Command, Stdio};

mod sys;
pub use sys::*;

#[cfg(test)]
pub(crate) mod mock;

/// A host network interface as reported by the interface directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub index: u32,
}

/// Opaque low-level interface identifier. On Windows this is the LUID value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    // Not captured nor applied yet; kept so that the apply path can grow a second family.
    Ipv6,
}

/// Enumerates interfaces and resolves their low-level identifiers.
pub trait InterfaceDirectory {
    fn list_interfaces(&self) -> io::Result<Vec<InterfaceInfo>>;

    fn resolve_identifier(&self, index: u32) -> io::Result<InterfaceId>;

    fn find_interface(&self, name: &str) -> io::Result<InterfaceInfo> {
        self.list_interfaces()?
            .into_iter()
            .find(|iface| iface.name == name)
            .ok_or_else(|| {
                io::Error::new(
                    ErrorKind::NotFound,
                    format!("interface {} not found", name),
                )
            })
    }
}

/// Reads and writes the DNS configuration of a single interface.
pub trait InterfaceDnsService {
    fn dns_servers(&self, id: InterfaceId) -> io::Result<Vec<IpAddr>>;

    fn set_dns(
        &self,
        id: InterfaceId,
        family: AddressFamily,
        servers: &[IpAddr],
        suffixes: &[String],
    ) -> io::Result<()>;
}

/// The host's own interfaces, backed by the per-target `sys` module.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceDirectory for SystemInterfaces {
    fn list_interfaces(&self) -> io::Result<Vec<InterfaceInfo>> {
        sys::list_interfaces()
    }

    fn resolve_identifier(&self, index: u32) -> io::Result<InterfaceId> {
        sys::luid_from_index(index).map(InterfaceId)
    }
}

impl InterfaceDnsService for SystemInterfaces {
    fn dns_servers(&self, id: InterfaceId) -> io::Result<Vec<IpAddr>> {
        sys::get_interface_dns(id.0)
    }

    fn set_dns(
        &self,
        id: InterfaceId,
        family: AddressFamily,
        servers: &[IpAddr],
        suffixes: &[String],
    ) -> io::Result<()> {
        sys::set_interface_dns(id.0, family, servers, suffixes)
    }
}

/// Runs external configuration tools such as `networksetup`.
pub trait CommandRunner {
    /// Runs `cmd` and returns its stdout. A non-zero exit is an error.
    fn output(&self, cmd: &str, args: &[String]) -> io::Result<String>;

    fn run(&self, cmd: &str, args: &[String]) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommands;

impl CommandRunner for SystemCommands {
    fn output(&self, cmd: &str, args: &[String]) -> io::Result<String> {
        get_command_output(cmd, args)
    }

    fn run(&self, cmd: &str, args: &[String]) -> io::Result<()> {
        run_command(cmd, args)
    }
}

pub fn run_command<I, S>(cmd: &str, args: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut handle = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let status = handle.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            ErrorKind::Other,
            format!("{} exit status: {}", cmd, status),
        ))
    }
}

pub fn get_command_output<I, S>(cmd: &str, args: I) -> io::Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;
    if output.status.success() {
        String::from_utf8(output.stdout).map_err(|e| io::Error::new(ErrorKind::Other, e))
    } else {
        Err(io::Error::new(
            ErrorKind::Other,
            format!("{} exit status: {}", cmd, output.status),
        ))
    }
}
