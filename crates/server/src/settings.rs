use std::time::Duration;

use log::LevelFilter;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "docindex-server", about = "Concurrent document index and search server.")]
pub struct Settings {
    /// The TCP port to listen on.
    #[structopt(env)]
    pub port: u16,

    /// The log level filter; any logs above this level won't be displayed.
    #[structopt(long, default_value = "info", env)]
    pub log_level: LevelFilter,

    /// An optional file to send persistent logs to, in addition to stdout.
    #[structopt(long, env)]
    pub log_file: Option<String>,

    /// Milliseconds the worker sleeps after fully receiving a request and
    /// before dispatching it. Retained to smooth burst contention; see the
    /// protocol notes for why a default is kept even though this is
    /// configurable.
    #[structopt(long, default_value = "50", env)]
    pub artificial_delay_ms: u64,
}

impl Settings {
    pub fn artificial_delay(&self) -> Duration {
        Duration::from_millis(self.artificial_delay_ms)
    }
}
