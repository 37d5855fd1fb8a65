use crate::error::{Error, Result};
use crate::stats::{distinct_terms, inverse_document_frequency, term_frequency, Idf, TermFrequency};
use crate::tokenizer::normalize;
use crate::vector::{magnitude, tfidf, WeightVector};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

pub type DocId = String;

/// A document as handed over by a text-extraction collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub name: String,
    /// Plain text, already extracted.
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

impl DocumentInput {
    pub fn new(name: impl Into<String>, content: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self { name: name.into(), content: content.into(), doc_type: doc_type.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentData {
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub tf: TermFrequency,
    pub tfidf: WeightVector,
    pub vector: WeightVector,
    pub magnitude: f64,
}

/// The whole index. Built in one go by [`build_model`] and never mutated
/// once published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Insertion order is the tie-break order for equal search scores.
    pub documents: IndexMap<DocId, DocumentData>,
    pub idf: Idf,
    pub terms: Vec<String>,
}

impl Model {
    pub fn len(&self) -> usize { self.documents.len() }
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }
    pub fn num_terms(&self) -> usize { self.terms.len() }
    pub fn document(&self, id: &str) -> Option<&DocumentData> { self.documents.get(id) }
}

pub fn build_model(documents: &IndexMap<DocId, DocumentInput>) -> Result<Model> {
    if documents.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    // First pass: per-document term statistics.
    let mut doc_terms: Vec<IndexSet<String>> = Vec::with_capacity(documents.len());
    let mut tfs: Vec<TermFrequency> = Vec::with_capacity(documents.len());
    for doc in documents.values() {
        let tokens = normalize(&doc.content);
        doc_terms.push(distinct_terms(&tokens));
        tfs.push(term_frequency(&tokens));
    }

    let idf = inverse_document_frequency(&doc_terms, documents.len());
    let terms: Vec<String> = idf.keys().cloned().collect();

    // Second pass: weights against the final IDF table.
    let mut out = IndexMap::with_capacity(documents.len());
    for ((id, doc), tf) in documents.iter().zip(tfs) {
        let weights = tfidf(&tf, &idf);
        let vector = weights.clone();
        let magnitude = magnitude(&vector);
        tracing::trace!(doc_id = %id, terms = tf.len(), magnitude, "vectorized document");
        out.insert(
            id.clone(),
            DocumentData {
                name: doc.name.clone(),
                content: doc.content.clone(),
                doc_type: doc.doc_type.clone(),
                tf,
                tfidf: weights,
                vector,
                magnitude,
            },
        );
    }

    tracing::debug!(num_docs = out.len(), num_terms = terms.len(), "built model");
    Ok(Model { documents: out, idf, terms })
}
