use anyhow::Context;
use clap::Parser;

use crate::config::{Cli, Config};
use crate::dispatcher::AlState;
use crate::error::{ConfigError, ExitCode};
use crate::event_loop::EventLoop;
use crate::platform::PlatformIO;
use crate::platform_linux::{discover_interface_names, LinuxPlatform};

/// Entry point used by the `map1905d` binary; kept separate from `main.rs`
/// so integration tests can drive it without spawning a process.
pub fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(e);
        }
    };

    init_logging(config.verbosity);

    let interface_names = discover_interface_names();
    if interface_names.is_empty() {
        log::error!("no usable interfaces were reported by the platform");
        return ExitCode::NoInterfaces;
    }

    match run(config, interface_names) {
        Ok(()) => ExitCode::Normal,
        Err(code) => code,
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn run(config: Config, interface_names: Vec<String>) -> Result<(), ExitCode> {
    let platform = LinuxPlatform::new(&interface_names).map_err(|e| {
        log::error!("failed to open platform interfaces: {e}");
        ExitCode::InterfaceError
    })?;

    let mut state = AlState::new(config.clone());
    let now_ns = platform.clock_monotonic_ns();
    let local = state.network.insert_device(config.al_mac_address, now_ns);
    state.network.local_device = Some(local);

    for name in &interface_names {
        let info = platform.interface_info(name).map_err(|e| {
            log::error!("failed to query interface {name}: {e}");
            ExitCode::InterfaceError
        })?;
        let iface_idx = state.network.ensure_interface(info.mac_address);
        state.network.attach_interface_to_device(local, iface_idx);
        if let Some(iface) = state.network.interfaces.get_mut(iface_idx) {
            iface.name = Some(name.clone());
            iface.is_secured = info.is_secured;
            iface.power_state = info.power_state;
            iface.media_type = info.media_type;
        }
    }

    if config.registrar_interface_name.is_some() {
        state.network.registrar.device = Some(local);
        state.network.registrar.is_multi_ap = true;
    }

    platform.register_event_source(crate::platform::TimerKind::Discovery, &60_000u64.to_be_bytes()).map_err(|e| {
        log::error!("failed to arm discovery timer: {e}");
        ExitCode::InterfaceError
    })?;
    platform
        .register_event_source(crate::platform::TimerKind::GarbageCollector, &70_000u64.to_be_bytes())
        .map_err(|e| {
            log::error!("failed to arm garbage collector timer: {e}");
            ExitCode::InterfaceError
        })?;

    log::info!(
        "map1905d starting: al_mac={} interfaces={} map_whole_network={}",
        config.al_mac_address,
        interface_names.len(),
        config.map_whole_network
    );

    let mut event_loop = EventLoop::new(platform, state);
    event_loop.run().map_err(anyhow::Error::from).context("running the event loop").map_err(|e| {
        log::error!("{e:#}");
        ExitCode::OsFailure
    })
}

impl From<ConfigError> for ExitCode {
    fn from(_: ConfigError) -> ExitCode {
        ExitCode::InvalidArguments
    }
}
