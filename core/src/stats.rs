use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Occurrence count per term within one token stream.
pub type TermFrequency = HashMap<String, u32>;

/// Corpus-wide `ln(total_docs / docs_with_term)`, keyed in first-seen order.
pub type Idf = IndexMap<String, f64>;

pub fn term_frequency(tokens: &[String]) -> TermFrequency {
    let mut tf = TermFrequency::new();
    for token in tokens {
        *tf.entry(token.clone()).or_insert(0) += 1;
    }
    tf
}

/// Distinct terms of a token stream, in order of first occurrence.
pub fn distinct_terms(tokens: &[String]) -> IndexSet<String> {
    tokens.iter().cloned().collect()
}

/// Inverse document frequency over the union of every document's terms.
///
/// `total_docs` must be at least 1; the caller guarantees a non-empty corpus.
/// A term found in every document gets `ln(1) = 0`.
pub fn inverse_document_frequency<'a, I>(doc_terms: I, total_docs: usize) -> Idf
where
    I: IntoIterator<Item = &'a IndexSet<String>>,
{
    let mut docs_with_term: IndexMap<String, u32> = IndexMap::new();
    for terms in doc_terms {
        for term in terms {
            *docs_with_term.entry(term.clone()).or_insert(0) += 1;
        }
    }
    let n = total_docs as f64;
    docs_with_term
        .into_iter()
        .map(|(term, df)| {
            let idf = (n / df as f64).ln();
            (term, idf)
        })
        .collect()
}
