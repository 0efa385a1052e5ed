use crate::dns::snapshot::push_unique;
use crate::dns::{DnsConfigurator, DnsError, DnsMethod, DnsOverride, DnsState};
use crate::platform::{CommandRunner, SystemCommands};
use std::io;
use std::net::{IpAddr, Ipv4Addr};

const NETWORKSETUP: &str = "networksetup";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ServiceDns {
    service: String,
    servers: Vec<String>,
    search: Vec<String>,
}

/// macOS keeps DNS per network service rather than per interface, so the
/// override is written to every enabled service and each one is put back on
/// `restore`.
pub struct NetworkServiceHandler<R: CommandRunner = SystemCommands> {
    name: String,
    overrides: DnsOverride,
    old_dns: Vec<ServiceDns>,
    orig_dns_servers: Vec<Ipv4Addr>,
    state: DnsState,
    runner: R,
}

impl<R: CommandRunner> NetworkServiceHandler<R> {
    pub fn new(name: &str, overrides: DnsOverride, runner: R) -> Result<Self, DnsError> {
        let services = runner
            .output(NETWORKSETUP, &args(["-listallnetworkservices"]))
            .map(|out| parse_services(&out))
            .map_err(DnsError::Enumeration)?;
        let mut old_dns = Vec::new();
        for service in services {
            let servers = runner
                .output(NETWORKSETUP, &args(["-getdnsservers", service.as_str()]))
                .map_err(|e| DnsError::query(&service, e))?;
            let search = runner
                .output(NETWORKSETUP, &args(["-getsearchdomains", service.as_str()]))
                .map_err(|e| DnsError::query(&service, e))?;
            old_dns.push(ServiceDns {
                service,
                servers: parse_list(&servers),
                search: parse_list(&search),
            });
        }
        let orig_dns_servers = snapshot(&old_dns);
        tracing::debug!(
            "Captured {} original DNS servers from {} network services",
            orig_dns_servers.len(),
            old_dns.len()
        );
        Ok(Self {
            name: name.to_string(),
            overrides,
            old_dns,
            orig_dns_servers,
            state: DnsState::Constructed,
            runner,
        })
    }

    fn set_service(
        &self,
        service: &str,
        servers: &[String],
        search: &[String],
    ) -> io::Result<()> {
        let mut cmd = args(["-setdnsservers", service]);
        cmd.extend(list_or_empty(servers));
        self.runner.run(NETWORKSETUP, &cmd)?;
        let mut cmd = args(["-setsearchdomains", service]);
        cmd.extend(list_or_empty(search));
        self.runner.run(NETWORKSETUP, &cmd)
    }
}

fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn parse_services(output: &str) -> Vec<String> {
    output
        .lines()
        // both the header notice and disabled services contain '*'
        .filter(|s| !s.is_empty() && !s.contains('*'))
        .map(String::from)
        .collect()
}

// "There aren't any DNS Servers set on Wi-Fi."
fn parse_list(output: &str) -> Vec<String> {
    if output.starts_with("There") {
        return Vec::new();
    }
    output
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn snapshot(old_dns: &[ServiceDns]) -> Vec<Ipv4Addr> {
    let mut servers = Vec::new();
    for entry in old_dns {
        for ip in entry.servers.iter().filter_map(|s| s.parse::<IpAddr>().ok()) {
            push_unique(&mut servers, ip);
        }
    }
    servers
}

fn list_or_empty(items: &[String]) -> Vec<String> {
    if items.is_empty() {
        vec!["Empty".to_string()]
    } else {
        items.to_vec()
    }
}

impl<R: CommandRunner> DnsConfigurator for NetworkServiceHandler<R> {
    fn method(&self) -> DnsMethod {
        DnsMethod::NetworkService
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
        let servers: Vec<String> = if self.overrides.servers.is_empty() {
            self.orig_dns_servers.iter().map(|ip| ip.to_string()).collect()
        } else {
            self.overrides.servers.iter().map(|ip| ip.to_string()).collect()
        };
        // any service may already carry the override once one has been written
        self.state = DnsState::Configured;
        for entry in self.old_dns.iter() {
            self.set_service(&entry.service, &servers, &self.overrides.suffixes)
                .map_err(|e| DnsError::apply(&self.name, e))?;
        }
        tracing::info!(
            "Applied DNS for {} to {} network services",
            self.name,
            self.old_dns.len()
        );
        Ok(())
    }

    fn restore(&mut self) -> Result<(), DnsError> {
        if self.state == DnsState::Configured {
            for entry in self.old_dns.iter() {
                self.set_service(&entry.service, &entry.servers, &entry.search)
                    .map_err(|e| DnsError::restore(&self.name, e))?;
            }
            tracing::info!("Restored DNS of {} network services", self.old_dns.len());
        }
        self.state = DnsState::Released;
        Ok(())
    }
}
