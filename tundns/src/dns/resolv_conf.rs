use crate::dns::snapshot::push_unique;
use crate::dns::{DnsConfigurator, DnsError, DnsMethod, DnsOverride, DnsState};
use std::fmt::Write;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

pub const RESOLV_CONF: &str = "/etc/resolv.conf";

/// Host-wide resolver file. Unlike the interface-scoped handler, the override
/// outlives the managed interface, so `restore` writes the original file back.
pub struct ResolvConfHandler {
    name: String,
    path: PathBuf,
    overrides: DnsOverride,
    original_content: String,
    orig_dns_servers: Vec<Ipv4Addr>,
    state: DnsState,
}

impl ResolvConfHandler {
    pub fn new(name: &str, overrides: DnsOverride, path: &Path) -> Result<Self, DnsError> {
        let original_content =
            fs::read_to_string(path).map_err(|e| DnsError::query(name, e))?;
        let orig_dns_servers = parse_nameservers(&original_content);
        tracing::debug!(
            "Captured {} original DNS servers from {}",
            orig_dns_servers.len(),
            path.display()
        );
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            overrides,
            original_content,
            orig_dns_servers,
            state: DnsState::Constructed,
        })
    }

    fn render(&self) -> String {
        let servers: Vec<IpAddr> = if self.overrides.servers.is_empty() {
            self.orig_dns_servers.iter().map(|ip| IpAddr::V4(*ip)).collect()
        } else {
            self.overrides.servers.clone()
        };
        let mut out = format!("# Generated by tundns for {}\n", self.name);
        for ip in servers {
            let _ = writeln!(out, "nameserver {}", ip);
        }
        if !self.overrides.suffixes.is_empty() {
            let _ = writeln!(out, "search {}", self.overrides.suffixes.join(" "));
        }
        out
    }
}

pub(crate) fn parse_nameservers(content: &str) -> Vec<Ipv4Addr> {
    let mut servers = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let mut words = line.split_whitespace();
        if words.next() != Some("nameserver") {
            continue;
        }
        // scoped IPv6 entries like fe80::1%eth0 do not parse and are skipped
        if let Some(Ok(ip)) = words.next().map(str::parse::<IpAddr>) {
            push_unique(&mut servers, ip);
        }
    }
    servers
}

impl DnsConfigurator for ResolvConfHandler {
    fn method(&self) -> DnsMethod {
        DnsMethod::ResolvConf
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
        fs::write(&self.path, self.render()).map_err(|e| DnsError::apply(&self.name, e))?;
        tracing::info!("Wrote DNS configuration for {} to {}", self.name, self.path.display());
        self.state = DnsState::Configured;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), DnsError> {
        if self.state == DnsState::Configured {
            fs::write(&self.path, &self.original_content)
                .map_err(|e| DnsError::restore(&self.name, e))?;
            tracing::info!("Restored {}", self.path.display());
        }
        self.state = DnsState::Released;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::DnsErrorKind;
    use std::io::Write as _;

    const ORIGINAL: &str = "# managed by NetworkManager\n\
        search lan\n\
        nameserver 192.168.1.1\n\
        nameserver fe80::1%wlan0\n\
        nameserver 2001:4860:4860::8888\n\
        ; nameserver 4.4.4.4\n\
        nameserver 1.1.1.1\n\
        nameserver 192.168.1.1\n\
        options edns0\n";

    fn resolv_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ORIGINAL.as_bytes()).unwrap();
        file
    }

    fn v4(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_nameservers() {
        assert_eq!(
            parse_nameservers(ORIGINAL),
            vec![v4("192.168.1.1"), v4("1.1.1.1")]
        );
        assert!(parse_nameservers("").is_empty());
        assert!(parse_nameservers("nameserver\nnameserver bogus\n").is_empty());
    }

    #[test]
    fn test_set_and_restore() {
        let file = resolv_file();
        let mut handler = ResolvConfHandler::new(
            "tun0",
            DnsOverride::new(
                vec!["10.8.0.1".parse().unwrap()],
                vec!["corp.example".to_string(), "example.net".to_string()],
            ),
            file.path(),
        )
        .unwrap();
        handler.set().unwrap();
        assert_eq!(
            fs::read_to_string(file.path()).unwrap(),
            "# Generated by tundns for tun0\nnameserver 10.8.0.1\nsearch corp.example example.net\n"
        );
        assert_eq!(handler.state(), DnsState::Configured);

        handler.restore().unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), ORIGINAL);
        assert_eq!(handler.state(), DnsState::Released);

        let err = handler.set().unwrap_err();
        assert_eq!(err.kind(), DnsErrorKind::Released);
        assert_eq!(fs::read_to_string(file.path()).unwrap(), ORIGINAL);
    }

    #[test]
    fn test_suffixes_only_falls_back_to_snapshot() {
        let file = resolv_file();
        let mut handler = ResolvConfHandler::new(
            "tun0",
            DnsOverride::new(vec![], vec!["corp.example".to_string()]),
            file.path(),
        )
        .unwrap();
        handler.set().unwrap();
        assert_eq!(
            fs::read_to_string(file.path()).unwrap(),
            "# Generated by tundns for tun0\nnameserver 192.168.1.1\nnameserver 1.1.1.1\nsearch corp.example\n"
        );
    }

    #[test]
    fn test_empty_config_leaves_file_untouched() {
        let file = resolv_file();
        let mut handler =
            ResolvConfHandler::new("tun0", DnsOverride::default(), file.path()).unwrap();
        handler.set().unwrap();
        assert_eq!(handler.state(), DnsState::Constructed);
        handler.restore().unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), ORIGINAL);
        assert_eq!(handler.state(), DnsState::Released);
    }

    #[test]
    fn test_apply_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolv.conf");
        fs::write(&path, ORIGINAL).unwrap();
        let mut handler = ResolvConfHandler::new(
            "tun0",
            DnsOverride::new(vec!["10.8.0.1".parse().unwrap()], vec![]),
            &path,
        )
        .unwrap();
        // a directory in place of the file makes the write fail
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        let err = handler.set().unwrap_err();
        assert_eq!(err.kind(), DnsErrorKind::ApplyFailure);
        assert!(err.to_string().contains("tun0"));
        assert_eq!(handler.state(), DnsState::Constructed);
    }
}
