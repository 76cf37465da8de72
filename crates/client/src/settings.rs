use log::LevelFilter;
use structopt::StructOpt;

/// The client has nothing to configure at startup besides logging — unlike
/// the server it's a purely command-driven REPL, with `connect`/`index`/
/// `search` all issued interactively.
#[derive(Debug, StructOpt)]
#[structopt(name = "docindex-client", about = "Interactive client for the docindex service.")]
pub struct Settings {
    /// The log level filter; any logs above this level won't be displayed.
    #[structopt(long, default_value = "info", env)]
    pub log_level: LevelFilter,

    /// An optional file to send persistent logs to, in addition to stdout.
    #[structopt(long, env)]
    pub log_file: Option<String>,
}
