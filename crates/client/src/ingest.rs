use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam::queue::SegQueue;
use log::warn;

use crate::client::Client;

/// Fixed worker pool size, matching the reference implementation.
const WORKER_COUNT: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct IndexResult {
    pub total_bytes_read: u64,
    pub execution_time_seconds: u64,
}

/// Recursively walks `root`, tokenizes every regular file, and ships each
/// file's term counts to the server via `client`. A fixed pool of six
/// worker threads drains a pre-populated file queue; each worker does one
/// read-tokenize-send-await-ack cycle per file before popping the next
/// path, so files are never double-counted even though the pool is shared.
///
/// An unreadable file is logged and skipped, and its bytes are not counted
/// toward `total_bytes_read`. A failed send/ack is likewise skipped — the
/// client never retries a failed INDEX.
pub fn index_folder(client: &Client, root: &Path) -> IndexResult {
    let started_at = Instant::now();

    let queue = Arc::new(SegQueue::new());
    for path in walk_files(root) {
        queue.push(path);
    }

    let total_bytes_read = Arc::new(AtomicU64::new(0));

    thread::scope(|scope| {
        for _ in 0..WORKER_COUNT {
            let queue = Arc::clone(&queue);
            let total_bytes_read = Arc::clone(&total_bytes_read);
            scope.spawn(move || {
                worker_loop(client, &queue, &total_bytes_read);
            });
        }
    });

    IndexResult {
        total_bytes_read: total_bytes_read.load(Ordering::SeqCst),
        execution_time_seconds: started_at.elapsed().as_secs(),
    }
}

fn worker_loop(client: &Client, queue: &SegQueue<PathBuf>, total_bytes_read: &AtomicU64) {
    while let Some(path) = queue.pop() {
        let contents = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("skipping unreadable file {}: {}", path.display(), e);
                continue;
            },
        };

        let word_frequencies: std::collections::HashMap<String, i32> =
            docindex_proto::tokenize(&contents)
                .into_iter()
                .map(|(term, count)| (term, count as i32))
                .collect();

        let byte_len = contents.len() as u64;
        match client.send_index_request(path.display().to_string(), word_frequencies) {
            Ok(()) => {
                total_bytes_read.fetch_add(byte_len, Ordering::SeqCst);
            },
            Err(e) => {
                warn!("failed to index {}: {}", path.display(), e);
            },
        }
    }
}

fn walk_files(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;

    /// A minimal stand-in server that acks every INDEX frame it receives
    /// with the fixed acknowledgement string, enough to exercise
    /// `index_folder`'s send/ack loop without pulling in `docindex-server`.
    fn spawn_echo_ack_server() -> (u16, thread::JoinHandle<usize>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = 0;
            loop {
                match docindex_proto::frame::read_frame(&mut stream) {
                    Ok(_payload) => {
                        received += 1;
                        docindex_proto::write_frame(&mut stream, b"Index updated successfully")
                            .unwrap();
                    },
                    Err(_) => break,
                }
            }
            received
        });

        (port, handle)
    }

    #[test]
    fn walks_nested_directories_and_counts_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut f1 = std::fs::File::create(dir.path().join("a.txt")).unwrap();
        write!(f1, "foo foo bar").unwrap();

        let mut f2 = std::fs::File::create(dir.path().join("sub/b.txt")).unwrap();
        write!(f2, "alpha beta").unwrap();

        let (port, _server) = spawn_echo_ack_server();
        let client = Client::new();
        client.connect("127.0.0.1", &port.to_string()).unwrap();

        let result = index_folder(&client, dir.path());
        assert_eq!(result.total_bytes_read, 11 + 10);
    }

    #[test]
    fn skips_unreadable_paths_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        // An empty directory yields zero files and zero bytes; the queue
        // drains immediately and every worker exits cleanly.
        let client = Client::new();
        let result = index_folder(&client, dir.path());
        assert_eq!(result.total_bytes_read, 0);
    }
}
