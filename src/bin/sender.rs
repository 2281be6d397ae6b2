use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use filebeam::fileio::FileList;
use filebeam::net::{self, LossySocket};
use filebeam::session::sender;
use filebeam::Error;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Validated CLI surface for the sender binary (§6.2). Window size and ACK
/// timeout stay the `const`s in `session::sender`; only the per-run knobs
/// (remote address, file list, loss probability) are CLI-configurable.
struct Config {
    remote_host: String,
    remote_port: u16,
    list_path: PathBuf,
    loss_probability: f64,
}

impl Config {
    fn from_args(args: &[String]) -> Result<Self, Error> {
        if args.len() != 5 {
            return Err(Error::Args(format!(
                "usage: {} <remote-host> <remote-port> <file-list> <loss-percent>",
                args.first().map(String::as_str).unwrap_or("sender")
            )));
        }

        let remote_host = args[1].clone();
        let remote_port: u16 = args[2]
            .parse()
            .map_err(|_| Error::Args(format!("invalid port: {}", args[2])))?;
        let list_path = PathBuf::from(&args[3]);
        let loss_percent: f64 = args[4]
            .parse()
            .map_err(|_| Error::Args(format!("invalid loss probability: {}", args[4])))?;
        if !loss_percent.is_finite() || !(0.0..=100.0).contains(&loss_percent) {
            return Err(Error::Args(format!(
                "loss probability must be in 0..=100, got {loss_percent}"
            )));
        }

        Ok(Config {
            remote_host,
            remote_port,
            list_path,
            loss_probability: (loss_percent / 100.0).clamp(0.0, 1.0),
        })
    }

    fn resolve_target(&self) -> Result<SocketAddr, Error> {
        net::resolve_host(&self.remote_host, self.remote_port)
    }
}

fn run() -> Result<(), Error> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_args(&args)?;

    log::info!("loss probability set to {:.4}", config.loss_probability);

    let target = config.resolve_target()?;
    let mut socket = LossySocket::bind(0, config.loss_probability)?;
    let files = FileList::open(&config.list_path)?;

    sender::run(&mut socket, target, files, sender::ACK_TIMEOUT)
}
