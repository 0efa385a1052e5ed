use crate::platform::{
    AddressFamily, CommandRunner, InterfaceDirectory, InterfaceDnsService, InterfaceId,
    InterfaceInfo,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::io::ErrorKind;
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDnsCall {
    pub id: InterfaceId,
    pub family: AddressFamily,
    pub servers: Vec<IpAddr>,
    pub suffixes: Vec<String>,
}

/// In-memory interface table that records every DNS mutation.
#[derive(Default)]
pub struct MockInterfaces {
    ifaces: Vec<(InterfaceInfo, Vec<IpAddr>)>,
    pub fail_list: bool,
    pub fail_resolve: Vec<u32>,
    pub fail_query: Vec<u32>,
    pub fail_set: bool,
    pub queried: RefCell<Vec<InterfaceId>>,
    pub set_calls: RefCell<Vec<SetDnsCall>>,
}

impl MockInterfaces {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_iface(mut self, name: &str, index: u32, dns: &[&str]) -> Self {
        let dns = dns.iter().map(|s| s.parse().unwrap()).collect();
        self.ifaces.push((
            InterfaceInfo {
                name: name.to_string(),
                index,
            },
            dns,
        ));
        self
    }

    pub fn luid_of(&self, index: u32) -> InterfaceId {
        InterfaceId(0x1000 + index as u64)
    }
}

impl InterfaceDirectory for MockInterfaces {
    fn list_interfaces(&self) -> io::Result<Vec<InterfaceInfo>> {
        if self.fail_list {
            return Err(io::Error::new(ErrorKind::PermissionDenied, "list denied"));
        }
        Ok(self.ifaces.iter().map(|(info, _)| info.clone()).collect())
    }

    fn resolve_identifier(&self, index: u32) -> io::Result<InterfaceId> {
        if self.fail_resolve.contains(&index)
            || !self.ifaces.iter().any(|(info, _)| info.index == index)
        {
            return Err(io::Error::new(ErrorKind::NotFound, "stale index"));
        }
        Ok(self.luid_of(index))
    }
}

impl InterfaceDnsService for MockInterfaces {
    fn dns_servers(&self, id: InterfaceId) -> io::Result<Vec<IpAddr>> {
        self.queried.borrow_mut().push(id);
        let (info, dns) = self
            .ifaces
            .iter()
            .find(|(info, _)| self.luid_of(info.index) == id)
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "unknown luid"))?;
        if self.fail_query.contains(&info.index) {
            return Err(io::Error::new(ErrorKind::Other, "query failed"));
        }
        Ok(dns.clone())
    }

    fn set_dns(
        &self,
        id: InterfaceId,
        family: AddressFamily,
        servers: &[IpAddr],
        suffixes: &[String],
    ) -> io::Result<()> {
        self.set_calls.borrow_mut().push(SetDnsCall {
            id,
            family,
            servers: servers.to_vec(),
            suffixes: suffixes.to_vec(),
        });
        if self.fail_set {
            return Err(io::Error::new(ErrorKind::Other, "set rejected"));
        }
        Ok(())
    }
}

/// Canned command replies keyed by the space-joined argument list.
#[derive(Default)]
pub struct MockCommands {
    outputs: HashMap<String, String>,
    pub fail: Vec<String>,
    pub runs: RefCell<Vec<String>>,
}

impl MockCommands {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_output(mut self, args: &str, output: &str) -> Self {
        self.outputs.insert(args.to_string(), output.to_string());
        self
    }

    pub fn failing(mut self, args: &str) -> Self {
        self.fail.push(args.to_string());
        self
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.borrow().clone()
    }
}

impl CommandRunner for MockCommands {
    fn output(&self, _cmd: &str, args: &[String]) -> io::Result<String> {
        let key = args.join(" ");
        if self.fail.contains(&key) {
            return Err(io::Error::new(ErrorKind::Other, "exit status: 1"));
        }
        self.outputs
            .get(&key)
            .cloned()
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, key))
    }

    fn run(&self, _cmd: &str, args: &[String]) -> io::Result<()> {
        let key = args.join(" ");
        self.runs.borrow_mut().push(key.clone());
        if self.fail.contains(&key) {
            return Err(io::Error::new(ErrorKind::Other, "exit status: 1"));
        }
        Ok(())
    }
}
