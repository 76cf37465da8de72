pub mod frame;
pub mod logging;
pub mod message;
pub mod tokenize;

pub use frame::{read_frame, write_frame, FrameError};
pub use message::{
    decode_request, decode_search_reply, encode_index_request, encode_quit,
    encode_search_reply, encode_search_request, read_request, IndexRequest, PayloadError,
    Request, SearchReply, SearchReplyDocument, SearchRequest, INDEX_ACK,
};
pub use tokenize::tokenize;
