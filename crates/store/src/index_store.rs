use hashbrown::HashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// An immutable record of one INDEX event.
///
/// Ids are dense and monotonic (1, 2, 3, ...). Two INDEX requests for the
/// same path produce two distinct records with distinct ids — the store
/// holds events, not a deduplicated set of documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Document {
    pub document_id: u64,
    pub document_path: String,
    pub origin_client_name: String,
}

impl Document {
    /// The sentinel returned by [`IndexStore::get_document`] for an
    /// unknown id: an empty path and origin, never an error.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// One (document, frequency) entry in a term's postings list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub document_id: u64,
    pub frequency: i64,
}

/// The server's shared inverted index.
///
/// Two independent locks guard the two maps, acquired in a fixed order
/// (documents before postings, never both at once) so that `lookup_index`
/// can run concurrently with document registration:
///
/// - `put_document` takes only the documents lock.
/// - `update_index` takes only the postings lock.
/// - `lookup_index` takes the postings lock for the duration of a copy.
/// - `get_document` takes only the documents lock.
///
/// A single INDEX request calls `put_document` then `update_index`
/// sequentially, so the two locks are never held at once even then.
pub struct IndexStore {
    documents: Mutex<HashMap<u64, Document>>,
    postings: Mutex<HashMap<String, Vec<Posting>>>,
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            postings: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates the next dense id, records the document, and returns its
    /// id. Never fails.
    pub fn put_document(&self, path: String, origin: String) -> u64 {
        let mut documents = self.documents.lock();
        let document_id = documents.len() as u64 + 1;
        documents.insert(
            document_id,
            Document {
                document_id,
                document_path: path,
                origin_client_name: origin,
            },
        );
        document_id
    }

    /// Returns the record for `document_id`, or [`Document::empty`] if
    /// unknown.
    pub fn get_document(&self, document_id: u64) -> Document {
        self.documents
            .lock()
            .get(&document_id)
            .cloned()
            .unwrap_or_else(Document::empty)
    }

    /// Appends a posting to each term's list for entries with a positive
    /// frequency; entries with `freq <= 0` are dropped. Visible atomically
    /// per term: a concurrent `lookup_index` either sees all of this
    /// call's postings for a term or none of them.
    pub fn update_index(&self, document_id: u64, word_frequencies: &HashMap<String, i64>) {
        let mut postings = self.postings.lock();
        for (term, &freq) in word_frequencies.iter() {
            if freq <= 0 {
                continue;
            }
            postings
                .entry(term.clone())
                .or_insert_with(Vec::new)
                .push(Posting {
                    document_id,
                    frequency: freq,
                });
        }
    }

    /// Returns a snapshot copy of `term`'s postings list, or an empty
    /// vector if the term has never been indexed.
    pub fn lookup_index(&self, term: &str) -> Vec<Posting> {
        self.postings
            .lock()
            .get(term)
            .cloned()
            .unwrap_or_default()
    }

    /// The number of documents registered so far. Exposed for tests and
    /// diagnostics, not part of the spec's operation set.
    pub fn document_count(&self) -> u64 {
        self.documents.lock().len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn ids_are_dense_and_monotonic() {
        let store = IndexStore::new();
        let ids: Vec<u64> = (0..5)
            .map(|i| store.put_document(format!("/doc{i}"), "client_1".to_string()))
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(store.document_count(), 5);
    }

    #[test]
    fn unknown_document_id_returns_empty_sentinel() {
        let store = IndexStore::new();
        let doc = store.get_document(42);
        assert_eq!(doc, Document::empty());
    }

    #[test]
    fn postings_preserve_insertion_order_and_skip_nonpositive() {
        let store = IndexStore::new();
        let id1 = store.put_document("/a".to_string(), "client_1".to_string());
        let id2 = store.put_document("/b".to_string(), "client_1".to_string());

        let mut freqs = HashMap::new();
        freqs.insert("foo".to_string(), 2);
        freqs.insert("dropped".to_string(), 0);
        store.update_index(id1, &freqs);

        let mut freqs2 = HashMap::new();
        freqs2.insert("foo".to_string(), 1);
        store.update_index(id2, &freqs2);

        let postings = store.lookup_index("foo");
        assert_eq!(
            postings,
            vec![
                Posting { document_id: id1, frequency: 2 },
                Posting { document_id: id2, frequency: 1 },
            ]
        );
        assert!(store.lookup_index("dropped").is_empty());
    }

    #[test]
    fn lookup_of_unknown_term_is_empty() {
        let store = IndexStore::new();
        assert!(store.lookup_index("nonexistent").is_empty());
    }

    #[test]
    fn same_path_two_origins_yields_two_records() {
        let store = IndexStore::new();
        let id1 = store.put_document("/p".to_string(), "client_1".to_string());
        let id2 = store.put_document("/p".to_string(), "client_2".to_string());
        assert_ne!(id1, id2);
        assert_eq!(store.get_document(id1).origin_client_name, "client_1");
        assert_eq!(store.get_document(id2).origin_client_name, "client_2");
    }

    #[test]
    fn concurrent_indexing_preserves_invariants() {
        let store = Arc::new(IndexStore::new());
        let clients = 8;
        let docs_per_client = 25;

        let handles: Vec<_> = (0..clients)
            .map(|c| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for d in 0..docs_per_client {
                        let id = store.put_document(
                            format!("/client{c}/doc{d}"),
                            format!("client_{c}"),
                        );
                        let mut freqs = HashMap::new();
                        freqs.insert("shared".to_string(), 3);
                        store.update_index(id, &freqs);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.document_count(), clients * docs_per_client);

        let postings = store.lookup_index("shared");
        assert_eq!(postings.len() as u64, clients * docs_per_client);
        for p in &postings {
            let doc = store.get_document(p.document_id);
            assert!(!doc.document_path.is_empty());
        }

        let mut ids: Vec<u64> = postings.iter().map(|p| p.document_id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), sorted.len());
    }
}
