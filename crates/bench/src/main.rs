use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use docindex_client::{index_folder, Client};
use docindex_proto::logging;

/// Fixed probe query sequence run against the first connected client once
/// every dataset has been indexed. `AND` is split client-side into separate
/// search terms — the server never sees the literal word "AND".
const PROBE_QUERIES: &[&str] = &["at", "Worms", "distortion AND adaptation"];

fn main() {
    if let Err(e) = logging::setup_logger(log::LevelFilter::Info, &None, true) {
        eprintln!("error setting up logging: {:?}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().collect();
    let config = match Config::parse(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!(
                "Usage: {} <server_ip> <server_port> <num_clients> <dataset1> [<dataset2> ...]",
                args.first().map(String::as_str).unwrap_or("docindex-bench")
            );
            process::exit(1);
        },
    };

    run(config);
}

struct Config {
    server_ip: String,
    server_port: String,
    datasets: Vec<String>,
}

impl Config {
    fn parse(args: &[String]) -> Result<Config, String> {
        if args.len() < 5 {
            return Err("Error: not enough arguments.".to_string());
        }

        let server_ip = args[1].clone();
        let server_port = args[2].clone();
        let num_clients: usize = args[3]
            .parse()
            .map_err(|_| format!("Error: invalid client count '{}'.", args[3]))?;

        let datasets: Vec<String> = args[4..].to_vec();
        if datasets.len() != num_clients {
            return Err(
                "Error: number of client datasets does not match the number of clients."
                    .to_string(),
            );
        }

        Ok(Config { server_ip, server_port, datasets })
    }
}

fn run(config: Config) {
    let mut clients = Vec::with_capacity(config.datasets.len());
    for (i, _) in config.datasets.iter().enumerate() {
        let client = Arc::new(Client::new());
        if let Err(e) = client.connect(&config.server_ip, &config.server_port) {
            eprintln!("Error: failed to connect client {} to the server: {}", i + 1, e);
            process::exit(1);
        }
        clients.push(client);
    }

    let started_at = Instant::now();
    let total_bytes: u64 = thread::scope(|scope| {
        let handles: Vec<_> = clients
            .iter()
            .zip(config.datasets.iter())
            .map(|(client, dataset)| {
                let client = Arc::clone(client);
                let dataset = dataset.clone();
                scope.spawn(move || index_folder(&client, Path::new(&dataset)).total_bytes_read)
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap_or(0)).sum()
    });
    let total_time = started_at.elapsed().as_secs_f64();

    println!("\nCompleted indexing {} bytes of data", total_bytes);
    println!("Completed indexing in {} seconds", total_time);

    let probe_client = &clients[0];
    for query in PROBE_QUERIES {
        perform_search(probe_client, query);
    }
}

/// Runs one probe query, splitting on the literal ` AND ` into separate
/// search terms before sending, and printing results in the original
/// benchmark's `* <origin>: <path>:<frequency>` format.
fn perform_search(client: &Client, query: &str) {
    println!("\nSearching {}", query);
    let terms: Vec<String> = if query.contains(" AND ") {
        query.split(" AND ").map(str::to_string).collect()
    } else {
        vec![query.to_string()]
    };

    let started_at = Instant::now();
    let reply = match client.search(terms) {
        Ok(reply) => reply,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            return;
        },
    };
    let elapsed = started_at.elapsed().as_secs_f64();

    println!("Search completed in {} seconds", elapsed);
    println!(
        "Search results (top {} out of {}):",
        reply.documents.len(),
        reply.total_results
    );
    for doc in &reply.documents {
        println!("* {}: {}:{}", doc.client_id, doc.document_path, doc.frequency);
    }
}
