use crate::dns::snapshot::collect_original_servers;
use crate::dns::{DnsConfigurator, DnsError, DnsMethod, DnsOverride, DnsState};
use crate::platform::{
    AddressFamily, InterfaceDirectory, InterfaceDnsService, InterfaceId, InterfaceInfo,
};
use std::net::{IpAddr, Ipv4Addr};

/// Interface-scoped DNS configuration, where the managed interface owns its
/// DNS settings and they disappear together with it.
pub struct DnsHandler<B> {
    name: String,
    iface: Option<InterfaceInfo>,
    overrides: DnsOverride,
    orig_dns_servers: Vec<Ipv4Addr>,
    state: DnsState,
    backend: B,
}

impl<B> DnsHandler<B>
where
    B: InterfaceDirectory + InterfaceDnsService,
{
    /// Captures the DNS servers of every other interface right away; the
    /// snapshot is never refreshed afterwards.
    pub fn new(name: &str, overrides: DnsOverride, backend: B) -> Result<Self, DnsError> {
        let orig_dns_servers = collect_original_servers(name, &backend)?;
        tracing::debug!(
            "Captured {} original DNS servers besides {}",
            orig_dns_servers.len(),
            name
        );
        Ok(Self {
            name: name.to_string(),
            iface: None,
            overrides,
            orig_dns_servers,
            state: DnsState::Constructed,
            backend,
        })
    }

    /// Binds the interface record once the managed interface exists. Without
    /// it, `set` looks the interface up by name.
    pub fn bind_interface(&mut self, iface: InterfaceInfo) {
        self.iface = Some(iface);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn resolve_managed(&self) -> Result<InterfaceId, DnsError> {
        let index = match &self.iface {
            Some(iface) => iface.index,
            None => {
                self.backend
                    .find_interface(&self.name)
                    .map_err(|e| DnsError::resolution(&self.name, e))?
                    .index
            }
        };
        self.backend
            .resolve_identifier(index)
            .map_err(|e| DnsError::resolution(&self.name, e))
    }
}

impl<B> DnsConfigurator for DnsHandler<B>
where
    B: InterfaceDirectory + InterfaceDnsService,
{
    fn method(&self) -> DnsMethod {
        DnsMethod::Interface
    }

    fn interface_name(&self) -> &str {
        &self.name
    }

    fn original_servers(&self) -> &[Ipv4Addr] {
        &self.orig_dns_servers
    }

    fn state(&self) -> DnsState {
        self.state
    }

    fn set(&mut self) -> Result<(), DnsError> {
        if self.overrides.is_empty() {
            return Ok(());
        }
        if self.state == DnsState::Released {
            return Err(DnsError::Released(self.name.clone()));
        }
        let id = self.resolve_managed()?;
        // pushes the captured snapshot, not the override servers
        let servers: Vec<IpAddr> = self
            .orig_dns_servers
            .iter()
            .map(|ip| IpAddr::V4(*ip))
            .collect();
        self.backend
            .set_dns(id, AddressFamily::Ipv4, &servers, &self.overrides.suffixes)
            .map_err(|e| DnsError::apply(&self.name, e))?;
        tracing::info!(
            "Applied {} DNS servers and {} suffixes to {}",
            servers.len(),
            self.overrides.suffixes.len(),
            self.name
        );
        self.state = DnsState::Configured;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), DnsError> {
        // DNS settings live on the interface and go away with its teardown.
        self.state = DnsState::Released;
        Ok(())
    }
}
