//! devcap: capture an interactive SSH session into an escaped YAML fixture.
//!
//! Connects to a device, replays a command list, and records the raw
//! terminal output of each command as an escaped block scalar. The operator
//! stays in the loop the whole time: received output echoes live, local
//! keystrokes pass through to the device, and Esc skips ahead to the next
//! command.

mod cmdset;
mod keys;
mod term;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use devcap_capture::{
    start_reader_thread, Collector, CollectorConfig, SequenceReport, Sequencer,
};
use devcap_ssh::{SshSession, SshTarget};
use devcap_yaml::DocumentWriter;

/// Capture an interactive SSH session into an escaped YAML fixture.
#[derive(Parser)]
#[command(name = "devcap", version)]
struct Cli {
    /// Remote endpoint as [user@]host
    target: String,

    /// File with the commands to run, one per line
    #[arg(short, long, value_name = "FILE")]
    cmdset: PathBuf,

    /// Write the YAML document here (omit to discard it)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Idle timeout between commands, in seconds
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            log::info!(
                "captured {} command(s){}",
                report.commands_sent,
                if report.disconnected {
                    " before the connection closed"
                } else {
                    ""
                }
            );
        }
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<SequenceReport, Box<dyn std::error::Error>> {
    let target = SshTarget::parse(&cli.target)?;
    let commands = cmdset::load(&cli.cmdset)
        .map_err(|e| format!("failed to read {}: {e}", cli.cmdset.display()))?;
    let output = match &cli.output {
        Some(path) => Some(
            File::create(path).map_err(|e| format!("failed to create {}: {e}", path.display()))?,
        ),
        None => None,
    };
    let config = CollectorConfig {
        idle_timeout: Duration::from_secs(cli.timeout),
        ..CollectorConfig::default()
    };

    let mut session = SshSession::spawn(&target)?;
    let (reader, writer) = session.split()?;

    let (data_tx, data_rx) = mpsc::channel(64);
    start_reader_thread(reader, data_tx);

    let (key_tx, key_rx) = mpsc::channel(16);
    let raw = match term::RawModeGuard::enable() {
        Ok(guard) => Some(guard),
        // Not running on a terminal; capture still works, passthrough
        // degrades to line-buffered input.
        Err(e) => {
            log::warn!("raw mode unavailable: {e}");
            None
        }
    };
    keys::start_key_thread(config.tick, key_tx);

    let collector = Collector::new(data_rx, key_rx, config);
    let mut sequencer = Sequencer::new(collector, writer);
    let mut doc = DocumentWriter::new(output);

    let result = sequencer.run(&commands, &mut doc, &mut io::stdout()).await;

    // Restore the terminal before anything else prints.
    drop(raw);
    session.close();

    let report = result?;
    if report.disconnected {
        println!("### Connection closed before the command list finished");
    }
    Ok(report)
}
