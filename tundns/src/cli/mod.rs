use crate::ProgramArgs;
use anyhow::anyhow;
use clap::{Args, CommandFactory, Subcommand, ValueHint};
use is_root::is_root;
use std::io::BufRead;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::mpsc;
use tundns::config::DnsConfig;
use tundns::dns::{create_configurator, DnsConfigurator, DnsMethod};

#[derive(Debug, Args)]
pub(crate) struct TargetOptions {
    /// Path of a YAML configuration file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Managed interface; overrides the configuration file
    #[arg(short, long, value_hint = ValueHint::Other)]
    pub interface: Option<String>,
    /// How DNS is configured on this host
    #[arg(short, long, value_enum)]
    pub method: Option<DnsMethod>,
    /// Resolver file for the resolv-conf method
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub resolv_conf: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct RunOptions {
    #[command(flatten)]
    pub target: TargetOptions,
    /// DNS server to set; may be repeated
    #[arg(long = "dns", value_hint = ValueHint::Other)]
    pub dns: Vec<IpAddr>,
    /// Search suffix to set; may be repeated
    #[arg(long = "search", value_hint = ValueHint::Other)]
    pub search: Vec<String>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub(crate) enum PromptOptions {
    Bash,
    Zsh,
    Fish,
}

#[derive(Debug, Subcommand)]
pub(crate) enum SubCommand {
    /// Print the DNS servers in use by the rest of the host
    Snapshot(TargetOptions),
    /// Apply DNS for the managed interface and restore it on Enter, EOF or Ctrl-C
    Run(RunOptions),
    /// Generate auto-completion profiles for shells
    #[command(subcommand)]
    Prompt(PromptOptions),
}

pub(crate) fn build_config(
    target: TargetOptions,
    dns: Vec<IpAddr>,
    search: Vec<String>,
) -> anyhow::Result<DnsConfig> {
    let mut config = match (&target.config, &target.interface) {
        (Some(path), _) => DnsConfig::load(path)?,
        (None, Some(interface)) => DnsConfig {
            interface: interface.clone(),
            dns: vec![],
            search: vec![],
            method: DnsMethod::Auto,
            resolv_conf: None,
        },
        (None, None) => return Err(anyhow!("either --config or --interface is required")),
    };
    if let Some(interface) = target.interface {
        config.interface = interface;
    }
    if !dns.is_empty() {
        config.dns = dns;
    }
    if !search.is_empty() {
        config.search = search;
    }
    if let Some(method) = target.method {
        config.method = method;
    }
    if target.resolv_conf.is_some() {
        config.resolv_conf = target.resolv_conf;
    }
    config.validate()?;
    Ok(config)
}

/// Sets DNS, blocks in `wait`, then restores. A failed `set` may have been
/// partially applied, so it is rolled back before its error is returned.
pub(crate) fn apply_until(
    configurator: &mut dyn DnsConfigurator,
    wait: impl FnOnce(),
) -> anyhow::Result<()> {
    if let Err(e) = configurator.set() {
        if let Err(restore_err) = configurator.restore() {
            tracing::warn!("Failed to roll back DNS: {}", restore_err);
        }
        return Err(e.into());
    }
    println!(
        "DNS configured for {}; press Enter or Ctrl-C to restore",
        configurator.interface_name()
    );
    wait();
    configurator.restore()?;
    Ok(())
}

pub(crate) fn run(cmd: SubCommand) -> anyhow::Result<()> {
    match cmd {
        SubCommand::Snapshot(target) => {
            let config = build_config(target, vec![], vec![])?;
            let configurator = create_configurator(&config)?;
            for ip in configurator.original_servers() {
                println!("{}", ip);
            }
            Ok(())
        }
        SubCommand::Run(opt) => {
            if !is_root() {
                return Err(anyhow!("Must be run with root/admin privilege"));
            }
            let config = build_config(opt.target, opt.dns, opt.search)?;
            let mut configurator = create_configurator(&config)?;
            // installed before set so that an interrupt cannot skip the restore
            let (tx, rx) = mpsc::channel();
            let stdin_tx = tx.clone();
            ctrlc::set_handler(move || {
                let _ = tx.send(());
            })?;
            apply_until(configurator.as_mut(), move || {
                std::thread::spawn(move || {
                    let mut line = String::new();
                    let _ = std::io::stdin().lock().read_line(&mut line);
                    let _ = stdin_tx.send(());
                });
                let _ = rx.recv();
            })?;
            tracing::info!("Exiting...");
            Ok(())
        }
        SubCommand::Prompt(shell) => {
            let generator = match shell {
                PromptOptions::Bash => clap_complete::Shell::Bash,
                PromptOptions::Zsh => clap_complete::Shell::Zsh,
                PromptOptions::Fish => clap_complete::Shell::Fish,
            };
            let mut command = ProgramArgs::command();
            let bin_name = command.get_name().to_string();
            clap_complete::generate(generator, &mut command, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}
