use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use volwatch::config::Cli;
use volwatch::console::{menu, select_device};
use volwatch::kernel::cancel::{spawn_signal_listener, supervise, Shutdown, FORCED_EXIT_CODE};
use volwatch::kernel::sink::CsvLogSink;
use volwatch::services::upnp::interfaces::{find_by_name, ipv4_interfaces};
use volwatch::services::upnp::{DiscoveryConfig, UpnpDirectory};
use volwatch::{RunConfig, Sampler};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    // 2. Validate configuration before touching the network
    let policy = cli.policy()?;
    tracing::info!("Effective configuration:\n{}", cli.dump());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    // 3. Choose interface
    let interfaces = ipv4_interfaces().context("Failed to enumerate network interfaces")?;
    let interface = match &cli.interface {
        Some(name) => match find_by_name(&interfaces, name) {
            Some(iface) => iface.clone(),
            None => bail!("No usable IPv4 interface named {name}"),
        },
        None => {
            let idx = menu::choose(&mut input, &mut output, "Choose a network interface", &interfaces)?;
            interfaces[idx].clone()
        }
    };

    // 4. Discover and choose device
    writeln!(output, "Searching for UPnP renderers on {interface}...")?;
    let discovery = DiscoveryConfig {
        interface,
        search_target: cli.search_target.clone(),
        timeout: cli.discovery_timeout(),
        request_timeout: cli.request_timeout(),
    };
    let directory = UpnpDirectory::discover(&discovery)
        .await
        .context("Device discovery failed")?;
    let (name, device) = select_device(&directory, cli.device, &mut input, &mut output).await?;

    if policy.enabled {
        writeln!(output, "Punishment enabled!")?;
        writeln!(
            output,
            "If volume exceeds {} it will be lowered to {}",
            policy.threshold, policy.ideal
        )?;
    }
    writeln!(output, "Logging volume for {name}")?;

    // 5. Open the log and start sampling
    let sink = CsvLogSink::open(&cli.log_file)?;
    let config = RunConfig::new(sink)
        .with_period(cli.period())
        .with_policy(policy)
        .with_correction_failure(cli.correction_failure());

    let mut signals = spawn_signal_listener().context("Failed to install signal handlers")?;
    let token = CancellationToken::new();
    let sampler = Sampler::new(device, config);
    let task = tokio::spawn(sampler.run(token.clone()));

    // 6. Wait for a signal (or a fatal tick) and report
    match supervise(token, task, &mut signals).await? {
        Shutdown::Stopped { reason, output: Ok(summary) } => {
            tracing::info!(
                "Closing after {:?}: {} samples, {} corrections ({} failed)",
                reason,
                summary.ticks,
                summary.corrections,
                summary.failed_corrections
            );
            Ok(())
        }
        Shutdown::Stopped { output: Err(e), .. } | Shutdown::Finished(Err(e)) => {
            tracing::error!("Sampling stopped: {}", e);
            Err(e.into())
        }
        Shutdown::Finished(Ok(summary)) => {
            tracing::warn!("Sampler ended without a stop request after {} samples", summary.ticks);
            Ok(())
        }
        Shutdown::Forced { reason } => {
            tracing::error!("Forced exit on second {:?}", reason);
            std::process::exit(FORCED_EXIT_CODE);
        }
    }
}
