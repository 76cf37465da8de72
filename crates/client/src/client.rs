use std::collections::HashMap;
use std::net::TcpStream;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Result};
use docindex_proto::{
    decode_search_reply, encode_index_request, encode_quit, encode_search_request, read_frame,
    write_frame, IndexRequest, SearchReply, SearchRequest,
};
use parking_lot::Mutex;

/// Owns the client-side TCP socket for the lifetime of one `connect`.
///
/// All socket access — from the interactive command loop and from every
/// ingestion worker thread — goes through `socket`, whose lock spans a full
/// send-then-await-reply cycle. This is the explicit socket-mutex design
/// that the protocol notes recommend in place of the original's unlocked
/// sharing across six worker threads.
pub struct Client {
    socket: Mutex<Option<TcpStream>>,
    connections_made: AtomicU64,
}

impl Client {
    pub fn new() -> Self {
        Self {
            socket: Mutex::new(None),
            connections_made: AtomicU64::new(0),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.socket.lock().is_some()
    }

    pub fn connect(&self, server_ip: &str, server_port: &str) -> Result<()> {
        let port: u16 = server_port
            .parse()
            .map_err(|_| anyhow!("invalid port: {}", server_port))?;
        let stream = TcpStream::connect((server_ip, port))?;
        *self.socket.lock() = Some(stream);
        self.connections_made.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// The wire-level `IndexRequest.client_id` this process reports for
    /// itself, a local identifier distinct from the server-assigned
    /// `client_name` in the registry (the worker derives `origin` from the
    /// connection, not from this field).
    fn local_client_id(&self) -> String {
        self.connections_made.load(Ordering::SeqCst).to_string()
    }

    /// Sends one `IndexRequest` and waits for the server's acknowledgement.
    /// Called by every ingestion worker; the socket mutex guarantees a
    /// worker's send and its matching ack are never interleaved with
    /// another worker's request on the same connection.
    pub fn send_index_request(
        &self,
        document_path: String,
        word_frequencies: HashMap<String, i32>,
    ) -> Result<()> {
        let request = IndexRequest {
            client_id: self.local_client_id(),
            document_path,
            word_frequencies,
        };

        let mut guard = self.socket.lock();
        let stream = guard.as_mut().ok_or_else(|| anyhow!("not connected"))?;
        write_frame(stream, &encode_index_request(&request))?;
        let ack = read_frame(stream)?;
        if ack.is_empty() {
            return Err(anyhow!("server sent an empty index acknowledgement"));
        }
        Ok(())
    }

    /// Sends a `SearchRequest` for `terms` and returns the reply. A
    /// length-0 reply frame (no matches) decodes to an empty `SearchReply`
    /// rather than an error.
    pub fn search(&self, terms: Vec<String>) -> Result<SearchReply> {
        let request = SearchRequest { terms };

        let mut guard = self.socket.lock();
        let stream = guard.as_mut().ok_or_else(|| anyhow!("not connected"))?;
        write_frame(stream, &encode_search_request(&request))?;
        let payload = read_frame(stream)?;
        if payload.is_empty() {
            return Ok(SearchReply {
                execution_time: 0.0,
                total_results: 0,
                documents: vec![],
            });
        }
        Ok(decode_search_reply(&payload)?)
    }

    /// Sends QUIT and closes the socket. A no-op if not connected.
    pub fn disconnect(&self) -> Result<()> {
        let mut guard = self.socket.lock();
        if let Some(mut stream) = guard.take() {
            write_frame(&mut stream, &encode_quit())?;
        }
        Ok(())
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
