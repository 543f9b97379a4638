use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use editor_bridge::{logging, replay, BridgeConfig};

/// Replay a scripted editing session and print what the bridge posts to the host
#[derive(Debug, Parser)]
#[command(name = "bridge-replay", version)]
struct Args {
    /// JSON-lines script; reads stdin when omitted
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = BridgeConfig::from_env()?;
    logging::init(&config.log_filter);

    let stdout = io::stdout().lock();
    let summary = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| anyhow::anyhow!("cannot open {}: {e}", path.display()))?;
            replay::run_script(config, BufReader::new(file), stdout)?
        }
        None => replay::run_script(config, io::stdin().lock(), stdout)?,
    };

    tracing::info!(
        steps = summary.steps,
        messages = summary.messages,
        engines_built = summary.engines_built,
        attachments_loaded = summary.attachments_loaded,
        "replay finished"
    );
    Ok(())
}
