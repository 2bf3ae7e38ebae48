mod commands;
mod terminal;

use commands::{CommandLine, discover};
use maki_common::config::Config;
use terminal::{logging, print};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging();

    let cfg: Config = commands.into_config()?;
    print::banner(cfg.quiet);

    let cancel: CancellationToken = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    discover::discover(&cfg, &cancel).await
}

/// The first Ctrl-C stops workers from claiming new targets; hosts already
/// being probed still finish.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing hosts already in flight...");
            cancel.cancel();
        }
    });
}
