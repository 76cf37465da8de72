use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use docindex_proto::logging;
use docindex_server::{Dispatcher, Settings};
use docindex_store::{IndexStore, Registry};
use log::error;
use structopt::StructOpt;

fn main() {
    let settings = Settings::from_args();

    if let Err(e) = logging::setup_logger(settings.log_level, &settings.log_file, true) {
        eprintln!("error setting up logging: {:?}", e);
        return;
    }

    if let Err(e) = run(settings) {
        eprintln!("error during server run: {:?}", e);
    }
}

fn run(settings: Settings) -> Result<()> {
    let store = Arc::new(IndexStore::new());
    let registry = Arc::new(Registry::new());
    let dispatcher = Arc::new(Dispatcher::new());
    let artificial_delay = settings.artificial_delay();

    let dispatcher_handle = {
        let dispatcher = Arc::clone(&dispatcher);
        let store = Arc::clone(&store);
        let registry = Arc::clone(&registry);
        let port = settings.port;
        thread::spawn(move || {
            if let Err(e) = dispatcher.run(port, store, registry, artificial_delay) {
                error!("dispatcher exited with error: {}", e);
            }
        })
    };

    read_commands(&dispatcher, &registry)?;

    dispatcher_handle
        .join()
        .map_err(|_| anyhow::anyhow!("dispatcher thread panicked"))?;

    println!("Server has shut down gracefully.");
    Ok(())
}

/// The server's `list` / `quit` command loop, read from standard input.
/// Worker threads for live connections are intentionally not joined here:
/// a worker blocked in `recv` cannot be interrupted short of closing its
/// socket (the known limitation noted in the protocol design).
fn read_commands(dispatcher: &Dispatcher, registry: &Registry) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> <list | quit>  ");
        io::stdout().flush().ok();

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim();

        if command == "quit" {
            dispatcher.shutdown();
            break;
        } else if command == "list" {
            let entries = registry.list();
            if entries.is_empty() {
                println!("No clients connected.");
            } else {
                for entry in entries {
                    println!("{}", entry);
                }
            }
        } else {
            println!("unrecognized command!");
        }
    }

    Ok(())
}
