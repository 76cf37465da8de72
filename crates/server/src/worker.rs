use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use docindex_proto::{
    encode_search_reply, read_request, write_frame, FrameError, IndexRequest, PayloadError,
    Request, INDEX_ACK,
};
use docindex_store::{IndexStore, Registry};
use hashbrown::HashMap;

use crate::search;

/// Runs the per-connection request loop: receive one frame, classify it,
/// dispatch, reply, loop. Returns when the peer disconnects or sends QUIT.
///
/// `connection_id` is this worker's key into the client registry, distinct
/// from the `client_name` string assigned on entry — this lets the worker
/// remove exactly its own entry without racing a same-named reconnect.
pub fn run(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    connection_id: u64,
    store: Arc<IndexStore>,
    registry: Arc<Registry>,
    artificial_delay: Duration,
) {
    let client_name = registry.add(connection_id, peer_addr.ip().to_string(), peer_addr.port());
    info!("{} connected from {}", client_name, peer_addr);

    loop {
        let maybe_request = match read_request(&mut stream) {
            Ok(maybe_request) => maybe_request,
            Err(FrameError::ConnectionClosed) => {
                info!("{} disconnected", client_name);
                break;
            },
            Err(e) => {
                warn!("{}: frame error, ending connection: {}", client_name, e);
                break;
            },
        };

        // The delay applies to every frame the worker fully receives,
        // including an unrecognised tag — it runs before dispatch, not
        // before classification.
        thread::sleep(artificial_delay);

        let request = match maybe_request {
            Some(request) => request,
            None => {
                warn!("{}: unrecognised frame tag, dropping and continuing", client_name);
                continue;
            },
        };

        match request {
            Ok(Request::Index(req)) => handle_index(&mut stream, &store, &client_name, req),
            Ok(Request::Search(req)) => {
                if let Err(e) = handle_search(&mut stream, &store, &req.terms) {
                    warn!("{}: failed to send search reply: {}", client_name, e);
                    break;
                }
            },
            Ok(Request::Quit) => {
                info!("{} sent QUIT", client_name);
                break;
            },
            Err(PayloadError::Decode(e)) => {
                warn!("{}: malformed request payload: {}", client_name, e);
            },
        }
    }

    registry.remove(connection_id);
}

fn handle_index(stream: &mut TcpStream, store: &IndexStore, client_name: &str, req: IndexRequest) {
    let document_id = store.put_document(req.document_path, client_name.to_string());

    let mut widened: HashMap<String, i64> = HashMap::with_capacity(req.word_frequencies.len());
    for (term, freq) in req.word_frequencies {
        widened.insert(term, freq as i64);
    }
    store.update_index(document_id, &widened);

    if let Err(e) = write_frame(stream, INDEX_ACK) {
        warn!("{}: failed to send index ack: {}", client_name, e);
    }
}

fn handle_search(
    stream: &mut TcpStream,
    store: &IndexStore,
    terms: &[String],
) -> Result<(), FrameError> {
    let reply = search::search(store, terms);

    if reply.documents.is_empty() {
        write_frame(stream, &[])
    } else {
        write_frame(stream, &encode_search_reply(&reply))
    }
}
