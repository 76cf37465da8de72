use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use docindex_client::{index_folder, Client, Settings};
use docindex_proto::logging;
use log::warn;
use structopt::StructOpt;

fn main() {
    let settings = Settings::from_args();

    if let Err(e) = logging::setup_logger(settings.log_level, &settings.log_file, true) {
        eprintln!("error setting up logging: {:?}", e);
        return;
    }

    read_commands();
}

/// The client's `connect`/`index`/`search`/`quit` command loop, read from
/// standard input. Argument errors print a message and keep the loop going
/// rather than disconnecting or exiting.
fn read_commands() {
    let client = Client::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().ok();

        line.clear();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut parts = line.trim().split_whitespace();
        let command = match parts.next() {
            Some(c) => c,
            None => continue,
        };

        match command {
            "connect" => handle_connect(&client, parts.collect()),
            "index" => handle_index(&client, parts.collect()),
            "search" => handle_search(&client, parts.collect()),
            "quit" => {
                if let Err(e) = client.disconnect() {
                    warn!("error while disconnecting: {}", e);
                }
                break;
            },
            other => println!("unrecognized command: {}", other),
        }
    }
}

fn handle_connect(client: &Client, args: Vec<&str>) {
    let (ip, port) = match (args.first(), args.get(1)) {
        (Some(ip), Some(port)) => (*ip, *port),
        _ => {
            println!("usage: connect <server_ip> <server_port>");
            return;
        },
    };

    match client.connect(ip, port) {
        Ok(()) => println!("Connected to {}:{}", ip, port),
        Err(e) => println!("Failed to connect to {}:{}: {}", ip, port, e),
    }
}

fn handle_index(client: &Client, args: Vec<&str>) {
    let folder = match args.first() {
        Some(folder) if !folder.is_empty() => *folder,
        _ => {
            println!("usage: index <folder>");
            return;
        },
    };

    if !client.is_connected() {
        println!("Not connected to a server. Use `connect <server_ip> <server_port>` first.");
        return;
    }

    let result = index_folder(client, Path::new(folder));
    println!("Completed indexing {} bytes of data", result.total_bytes_read);
    println!("Completed indexing in {} seconds", result.execution_time_seconds);
}

fn handle_search(client: &Client, args: Vec<&str>) {
    if args.is_empty() {
        println!("usage: search <term1> <term2> ...");
        return;
    }

    if !client.is_connected() {
        println!("Not connected to a server. Use `connect <server_ip> <server_port>` first.");
        return;
    }

    let terms: Vec<String> = args.into_iter().map(|s| s.to_string()).collect();
    let started_at = Instant::now();
    let reply = match client.search(terms) {
        Ok(reply) => reply,
        Err(e) => {
            println!("Search failed: {}", e);
            return;
        },
    };
    // Whole seconds, truncated like the original's
    // `duration_cast<std::chrono::seconds>`, not fractional.
    let elapsed = started_at.elapsed().as_secs();

    println!("Search completed in {} seconds.", elapsed);
    if reply.documents.is_empty() {
        println!("No results found");
        return;
    }
    for doc in &reply.documents {
        println!("{}: {} (Frequency: {})", doc.client_id, doc.document_path, doc.frequency);
    }
}
