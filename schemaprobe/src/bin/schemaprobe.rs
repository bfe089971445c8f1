mod config;

use std::process;

use clap::Parser;
use log::{error, info};
use tokio::runtime::{Builder, Runtime};

use schemaprobe::kafka::KafkaConnector;
use schemaprobe::runner::{self, ProbeConfig};
use schemaprobe::serdes::HttpRegistryConnector;
use schemaprobe::shutdown::Shutdown;
use schemaprobe::{logger, BANNER};

use config::ProbeOptions;

pub const LOG: &str = "schemaprobe";

const INFO: &str = "
Schemaprobe consumes a topic through a schema registry backed
deserializer and prints the key and one value field of every message.
Stop it with Ctrl-C.";

#[derive(Debug, Parser)]
#[clap(name = "Schemaprobe command-line interface")]
#[clap(about = INFO, before_help = BANNER, disable_version_flag = true)]
struct AppOptions {
    #[clap(flatten)]
    probe: ProbeOptions,
}

fn main() {
    let app = AppOptions::parse();
    let config: ProbeConfig = app.probe.into();

    logger::init(&config.log);
    info!(target: LOG, "{}", BANNER);

    // trap ctrl-c and let the poll loop stop on its next check
    let sd = Shutdown::new();
    let runtime = match listen_for_interrupt(sd.clone()) {
        Ok(rt) => Some(rt),
        Err(e) => {
            error!(target: LOG, "Unable to trap interrupt signal: {}", e);
            None
        }
    };

    let code = match runner::run(&config, &sd, &KafkaConnector, &HttpRegistryConnector) {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    };

    if let Some(rt) = runtime {
        rt.shutdown_background();
    }
    process::exit(code);
}

fn listen_for_interrupt(sd: Shutdown) -> std::io::Result<Runtime> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("schemaprobe-signal")
        .enable_all()
        .build()?;

    runtime.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                if sd.begin() {
                    info!(target: LOG, "Interrupt received, stopping after the current poll...");
                }
            }
            Err(e) => error!(target: LOG, "Unable to listen for interrupt: {}", e),
        }
    });

    Ok(runtime)
}
