//! DNS configuration for the managed (tunnel) interface.
//!
//! Every configurator captures the DNS servers the host is using before the
//! managed interface takes over, applies the override configuration with
//! [`DnsConfigurator::set`] and releases it with [`DnsConfigurator::restore`].
//! Which configurator is used is decided at runtime by [`create_configurator`].
//!
//! Configurators are not meant to be shared: callers must serialize `set` and
//! `restore`. All calls block on the OS and carry no timeout.

mod error;
mod handler;
mod network_service;
mod resolv_conf;
mod snapshot;

pub use error::*;
pub use handler::DnsHandler;
pub use network_service::NetworkServiceHandler;
pub use resolv_conf::{ResolvConfHandler, RESOLV_CONF};
pub use snapshot::collect_original_servers;

use crate::config::DnsConfig;
use crate::platform::{SystemCommands, SystemInterfaces};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

/// Caller-requested servers and search suffixes for the managed interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsOverride {
    pub servers: Vec<IpAddr>,
    pub suffixes: Vec<String>,
}

impl DnsOverride {
    pub fn new(servers: Vec<IpAddr>, suffixes: Vec<String>) -> Self {
        Self { servers, suffixes }
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty() && self.suffixes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsState {
    Constructed,
    Configured,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            _ => Platform::Other,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DnsMethod {
    #[default]
    Auto,
    /// DNS is a property of the managed interface and dies with it.
    Interface,
    /// Host-wide resolver file.
    ResolvConf,
    /// Per network service through `networksetup`.
    NetworkService,
}

impl DnsMethod {
    pub fn resolve(self, platform: Platform) -> DnsMethod {
        match (self, platform) {
            (DnsMethod::Auto, Platform::Windows) => DnsMethod::Interface,
            (DnsMethod::Auto, Platform::MacOs) => DnsMethod::NetworkService,
            (DnsMethod::Auto, Platform::Other) => DnsMethod::ResolvConf,
            (method, _) => method,
        }
    }
}

pub trait DnsConfigurator {
    fn method(&self) -> DnsMethod;

    fn interface_name(&self) -> &str;

    /// DNS servers captured from the rest of the host at construction.
    fn original_servers(&self) -> &[Ipv4Addr];

    fn state(&self) -> DnsState;

    /// Applies the override configuration. A no-op when neither servers nor
    /// suffixes were requested.
    fn set(&mut self) -> Result<(), DnsError>;

    /// Leaves no DNS override in effect that outlives the managed interface.
    fn restore(&mut self) -> Result<(), DnsError>;
}

pub fn create_configurator(config: &DnsConfig) -> Result<Box<dyn DnsConfigurator>, DnsError> {
    create_for_platform(config, Platform::current())
}

pub fn create_for_platform(
    config: &DnsConfig,
    platform: Platform,
) -> Result<Box<dyn DnsConfigurator>, DnsError> {
    let overrides = config.overrides();
    let method = config.method.resolve(platform);
    tracing::debug!(
        "Using {:?} DNS configurator for {} on {:?}",
        method,
        config.interface,
        platform
    );
    let configurator: Box<dyn DnsConfigurator> = match method {
        DnsMethod::Interface => Box::new(DnsHandler::new(
            &config.interface,
            overrides,
            SystemInterfaces,
        )?),
        DnsMethod::NetworkService => Box::new(NetworkServiceHandler::new(
            &config.interface,
            overrides,
            SystemCommands,
        )?),
        DnsMethod::ResolvConf | DnsMethod::Auto => Box::new(ResolvConfHandler::new(
            &config.interface,
            overrides,
            config
                .resolv_conf
                .as_deref()
                .unwrap_or(Path::new(RESOLV_CONF)),
        )?),
    };
    Ok(configurator)
}
