use std::path::PathBuf;
use std::process::ExitCode;

use filebeam::fileio::SearchHandler;
use filebeam::net::LossySocket;
use filebeam::session::receiver;
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

/// Validated CLI surface for the receiver binary (§6.2). The receiver never
/// configures a loss probability of its own; only the sender's CLI exposes
/// one (see the loss-shim note in the spec this crate implements).
struct Config {
    local_port: u16,
    search_dir: PathBuf,
    match_log_path: PathBuf,
}

impl Config {
    fn from_args(args: &[String]) -> Result<Self, Error> {
        if args.len() != 4 {
            return Err(Error::Args(format!(
                "usage: {} <local-port> <search-dir> <match-log>",
                args.first().map(String::as_str).unwrap_or("receiver")
            )));
        }

        let local_port: u16 = args[1]
            .parse()
            .map_err(|_| Error::Args(format!("invalid port: {}", args[1])))?;
        let search_dir = PathBuf::from(&args[2]);
        let match_log_path = PathBuf::from(&args[3]);

        Ok(Config {
            local_port,
            search_dir,
            match_log_path,
        })
    }
}

fn run() -> Result<(), Error> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_args(&args)?;

    let mut socket = LossySocket::bind(config.local_port, 0.0)?;
    let mut search = SearchHandler::new(&config.search_dir, &config.match_log_path)?;

    log::info!(
        "listening on port {}, searching in {:?}",
        config.local_port,
        config.search_dir
    );
    receiver::run(&mut socket, &mut search)
}
