use crate::error::{Error, Result};
use crate::index::{DocId, Model};
use crate::stats::term_frequency;
use crate::tokenizer::normalize;
use crate::vector::{cosine_similarity, magnitude, tfidf};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentView {
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub doc_id: DocId,
    pub document: DocumentView,
    pub similarity: f64,
    /// Normalized query tokens, duplicates included.
    pub query_terms: Vec<String>,
    /// The query tokens, in query order, that occur in this document.
    pub matching_terms: Vec<String>,
}

/// Rank every document of `model` against `query` by cosine similarity.
///
/// Only strictly positive scores are returned, best first. Equal scores keep
/// the model's document order. No truncation happens here.
pub fn search(query: &str, model: &Model) -> Result<Vec<SearchResult>> {
    if model.is_empty() {
        return Err(Error::EmptyModel);
    }

    let query_tokens = normalize(query);
    let query_tf = term_frequency(&query_tokens);
    let query_vec = tfidf(&query_tf, &model.idf);
    let query_mag = magnitude(&query_vec);

    let mut results: Vec<SearchResult> = Vec::new();
    for (doc_id, doc) in &model.documents {
        let similarity = cosine_similarity(&query_vec, query_mag, &doc.vector, doc.magnitude);
        if similarity <= 0.0 {
            continue;
        }
        let matching_terms = query_tokens
            .iter()
            .filter(|term| doc.tf.get(term.as_str()).is_some_and(|&count| count > 0))
            .cloned()
            .collect();
        results.push(SearchResult {
            doc_id: doc_id.clone(),
            document: DocumentView {
                name: doc.name.clone(),
                content: doc.content.clone(),
                doc_type: doc.doc_type.clone(),
            },
            similarity,
            query_terms: query_tokens.clone(),
            matching_terms,
        });
    }

    // `sort_by` is stable, so ties stay in document order.
    results.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    tracing::debug!(query, hits = results.len(), "search complete");
    Ok(results)
}
