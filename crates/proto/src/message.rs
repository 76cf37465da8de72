use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame;

const INDEX_TAG: &[u8] = b"INDEX:";
const SEARCH_TAG: &[u8] = b"SEARCH:";
const QUIT_PAYLOAD: &[u8] = b"QUIT";

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Decode(#[from] Box<bincode::ErrorKind>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexRequest {
    pub client_id: String,
    pub document_path: String,
    pub word_frequencies: HashMap<String, i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchReplyDocument {
    pub document_path: String,
    pub frequency: i64,
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchReply {
    pub execution_time: f64,
    pub total_results: i32,
    pub documents: Vec<SearchReplyDocument>,
}

/// A request frame, classified by its wire tag.
///
/// `Quit` carries no body: its payload is the literal four bytes `QUIT`
/// with no colon, matched exactly (not by substring) so that an
/// `IndexRequest::document_path` containing the text "QUIT" can never be
/// misclassified.
pub enum Request {
    Index(IndexRequest),
    Search(SearchRequest),
    Quit,
}

/// Parses a raw frame payload into a tagged [`Request`].
///
/// Returns `None` for a tag this server doesn't recognise; the caller logs
/// and continues rather than treating this as fatal (spec: parse/format
/// failures never abort a connection).
pub fn decode_request(payload: &[u8]) -> Option<Result<Request, PayloadError>> {
    if payload == QUIT_PAYLOAD {
        return Some(Ok(Request::Quit));
    }

    if let Some(body) = payload.strip_prefix(INDEX_TAG) {
        return Some(bincode::deserialize(body).map(Request::Index).map_err(PayloadError::from));
    }

    if let Some(body) = payload.strip_prefix(SEARCH_TAG) {
        return Some(bincode::deserialize(body).map(Request::Search).map_err(PayloadError::from));
    }

    None
}

pub fn encode_index_request(req: &IndexRequest) -> Vec<u8> {
    let mut out = INDEX_TAG.to_vec();
    bincode::serialize_into(&mut out, req).expect("serializing IndexRequest is infallible");
    out
}

pub fn encode_search_request(req: &SearchRequest) -> Vec<u8> {
    let mut out = SEARCH_TAG.to_vec();
    bincode::serialize_into(&mut out, req).expect("serializing SearchRequest is infallible");
    out
}

pub fn encode_quit() -> Vec<u8> {
    QUIT_PAYLOAD.to_vec()
}

pub fn decode_search_reply(payload: &[u8]) -> Result<SearchReply, PayloadError> {
    bincode::deserialize(payload).map_err(PayloadError::from)
}

pub fn encode_search_reply(reply: &SearchReply) -> Vec<u8> {
    bincode::serialize(reply).expect("serializing SearchReply is infallible")
}

/// The human-readable acknowledgement the server sends on a successful
/// INDEX request. The client treats any non-empty byte string as success,
/// so the exact text is cosmetic.
pub const INDEX_ACK: &[u8] = b"Index updated successfully";

/// Reads one request frame from `reader` and classifies it.
pub fn read_request<R: std::io::Read>(
    reader: &mut R,
) -> Result<Option<Result<Request, PayloadError>>, frame::FrameError> {
    let payload = frame::read_frame(reader)?;
    Ok(decode_request(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_is_exact_match_not_substring() {
        let mut freqs = HashMap::new();
        freqs.insert("term".to_string(), 1);
        let sneaky = IndexRequest {
            client_id: "client_1".to_string(),
            document_path: "/tmp/QUIT_is_not_a_command".to_string(),
            word_frequencies: freqs,
        };
        let encoded = encode_index_request(&sneaky);

        match decode_request(&encoded) {
            Some(Ok(Request::Index(req))) => {
                assert_eq!(req.document_path, "/tmp/QUIT_is_not_a_command");
            }
            _ => panic!("expected an Index request, not a quit or parse error"),
        }
    }

    #[test]
    fn quit_payload_round_trips() {
        let encoded = encode_quit();
        assert!(matches!(decode_request(&encoded), Some(Ok(Request::Quit))));
    }

    #[test]
    fn index_request_round_trips() {
        let mut freqs = HashMap::new();
        freqs.insert("foo".to_string(), 2);
        freqs.insert("bar".to_string(), 1);
        let req = IndexRequest {
            client_id: "client_1".to_string(),
            document_path: "/a/b.txt".to_string(),
            word_frequencies: freqs,
        };
        let encoded = encode_index_request(&req);
        match decode_request(&encoded) {
            Some(Ok(Request::Index(decoded))) => assert_eq!(decoded, req),
            _ => panic!("expected Index request"),
        }
    }

    #[test]
    fn search_request_round_trips() {
        let req = SearchRequest {
            terms: vec!["alpha".to_string(), "beta".to_string()],
        };
        let encoded = encode_search_request(&req);
        match decode_request(&encoded) {
            Some(Ok(Request::Search(decoded))) => assert_eq!(decoded, req),
            _ => panic!("expected Search request"),
        }
    }

    #[test]
    fn search_reply_round_trips() {
        let reply = SearchReply {
            execution_time: 0.0,
            total_results: 1,
            documents: vec![SearchReplyDocument {
                document_path: "/p".to_string(),
                frequency: 4,
                client_id: "client_1".to_string(),
            }],
        };
        let encoded = encode_search_reply(&reply);
        let decoded = decode_search_reply(&encoded).unwrap();
        assert_eq!(decoded, reply);
    }

    #[test]
    fn unknown_tag_is_none() {
        assert!(decode_request(b"BOGUS:whatever").is_none());
    }
}
