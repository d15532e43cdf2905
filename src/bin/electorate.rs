use clap::Parser;
use log::info;

use electorate::{Config, Election};

/// Runs a single leader-election node over UDP.
#[derive(Parser, Debug)]
#[command(name = "electorate", about = "Leader-election node over an unreliable datagram transport")]
struct Args {
    /// Address to bind and listen on.
    #[arg(long, default_value = "0.0.0.0:55031")]
    listen: String,

    /// Address of a peer in the initial cluster. May be repeated.
    #[arg(long = "cluster")]
    cluster: Vec<String>,

    /// Drop datagrams from senders outside the known peer set.
    #[arg(long)]
    accept_unknown_senders: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet: only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Warn
        } else {
            match self.verbose {
                0 => log::LevelFilter::Info,
                1 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    env_logger::Builder::new().filter_level(args.log_level()).init();

    let config = Config {
        listen_addr: args.listen.clone(),
        cluster: args.cluster.clone(),
        accept_unknown_senders: args.accept_unknown_senders,
        ..Config::default()
    };

    let node = match Election::new(config) {
        Ok(node) => node,
        Err(err) => {
            eprintln!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = node.run().await {
        eprintln!("failed to start: {}", err);
        std::process::exit(1);
    }
    info!("listening on {}", node.local_addr());

    if let Err(err) = tokio::signal::ctrl_c().await {
        eprintln!("failed to wait for ctrl-c: {}", err);
    }
    info!("shutting down");
    node.stop();
}
