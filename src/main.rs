use clap::Parser;
use color_eyre::Result;
use tokio::sync::mpsc;
use tracing::{info, Level};
use wifi_provisioner::{
    catalog,
    cli::{Cli, Commands},
    config::LinkConfig,
    credentials::WifiCredentials,
    events::Event,
    logging,
    session::SessionController,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if let Commands::ExampleConfig = cli.command {
        println!("{}", LinkConfig::example().serialize_pretty());

        return Ok(());
    }

    logging::init(Level::INFO, cli.log_dir.map(|dir| (Level::DEBUG, dir))).await;

    match cli.command {
        Commands::ExampleConfig => unreachable!("Handled above"),

        Commands::Ports => {
            let ports = catalog::available_ports();

            if ports.is_empty() {
                println!("No serial ports found.");
            } else {
                for port in ports {
                    println!("{port}");
                }
            }
        }

        Commands::Provision {
            port,
            baud,
            ssid,
            password,
            watch,
        } => {
            let mut config = cli
                .config
                .map(LinkConfig::new_from_path)
                .unwrap_or_else(|| LinkConfig::new(""));

            if let Some(port) = port {
                config.port = port;
            }
            if let Some(baud) = baud {
                config.baud = baud;
            }

            let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

            // The consumer stamps events on arrival; the core does not.
            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    println!("[{}] {event}", chrono::Local::now().format("%H:%M:%S"));
                }
            });

            let mut session = SessionController::new(tx);

            session.open(config).await?;
            session.send(&WifiCredentials::new(ssid, password)).await?;

            if watch {
                tokio::signal::ctrl_c().await?;
                info!("Ctrl-C, quitting");
            }

            session.close().await;
            drop(session);

            let _ = printer.await;
        }
    }

    logging::shutdown();

    Ok(())
}
