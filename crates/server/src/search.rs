use hashbrown::HashMap;

use docindex_proto::{SearchReply, SearchReplyDocument};
use docindex_store::IndexStore;

/// Runs a conjunctive (AND) search for `terms` against `store`.
///
/// Empty terms are skipped entirely (neither eliminate results nor
/// contribute to the combined map). The first non-empty term seeds the
/// running `document_id -> summed_frequency` map; each subsequent term
/// narrows it to documents that also carry that term, adding its
/// frequency. A term with no postings is skipped, not treated as
/// eliminating every result. Results are sorted by summed frequency
/// descending and truncated to the top 10.
pub fn search(store: &IndexStore, terms: &[String]) -> SearchReply {
    let mut combined: Option<HashMap<u64, i64>> = None;

    for term in terms.iter().filter(|t| !t.is_empty()) {
        let postings = store.lookup_index(term);
        if postings.is_empty() {
            continue;
        }

        combined = Some(match combined {
            None => postings
                .iter()
                .map(|p| (p.document_id, p.frequency))
                .collect(),
            Some(previous) => postings
                .iter()
                .filter_map(|p| {
                    previous
                        .get(&p.document_id)
                        .map(|&sum| (p.document_id, sum + p.frequency))
                })
                .collect(),
        });
    }

    let mut ranked: Vec<(u64, i64)> = combined.unwrap_or_default().into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(10);

    let documents: Vec<SearchReplyDocument> = ranked
        .into_iter()
        .map(|(document_id, frequency)| {
            let doc = store.get_document(document_id);
            SearchReplyDocument {
                document_path: doc.document_path,
                frequency,
                client_id: doc.origin_client_name,
            }
        })
        .collect();

    SearchReply {
        execution_time: 0.0,
        total_results: documents.len() as i32,
        documents,
    }
}
