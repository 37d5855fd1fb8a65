use indexmap::IndexMap;
use std::f64::consts::LN_2;
use vsm_core::stats::{distinct_terms, inverse_document_frequency, term_frequency};
use vsm_core::tokenizer::normalize;
use vsm_core::{build_model, search, DocId, DocumentInput, Error, Model};

fn corpus(docs: &[(&str, &str)]) -> IndexMap<DocId, DocumentInput> {
    docs.iter()
        .map(|(id, text)| (id.to_string(), DocumentInput::new(format!("{id}.txt"), *text, "text/plain")))
        .collect()
}

fn cat_and_dog() -> Model {
    build_model(&corpus(&[("d1", "the cat sat on the mat"), ("d2", "the dog sat on the log")])).unwrap()
}

#[test]
fn stopwords_are_filtered_from_documents() {
    assert_eq!(normalize("the cat sat on the mat"), vec!["cat", "sat", "mat"]);
}

#[test]
fn shared_terms_get_zero_idf() {
    let model = cat_and_dog();
    assert_eq!(model.idf["sat"], 0.0);
    assert!((model.idf["cat"] - LN_2).abs() < 1e-12);
    assert!((model.idf["mat"] - LN_2).abs() < 1e-12);
    assert_eq!(model.terms.len(), 5);
}

#[test]
fn single_term_query_matches_one_document() {
    let model = cat_and_dog();
    let hits = search("cat", &model).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, "d1");
    assert!(hits[0].similarity > 0.0);
    assert_eq!(hits[0].matching_terms, vec!["cat"]);
}

#[test]
fn query_on_shared_term_only_matches_nothing() {
    // "sat" is in every document, so its weight is zero everywhere.
    let model = cat_and_dog();
    assert!(search("sat", &model).unwrap().is_empty());
}

#[test]
fn empty_corpus_fails() {
    assert_eq!(build_model(&IndexMap::new()).unwrap_err(), Error::EmptyCorpus);
}

#[test]
fn empty_model_fails() {
    assert_eq!(search("anything", &Model::default()).unwrap_err(), Error::EmptyModel);
}

#[test]
fn stopword_document_never_matches() {
    let model = build_model(&corpus(&[
        ("stop", "the and of"),
        ("a", "rust memory safety"),
        ("b", "garbage collected memory"),
    ]))
    .unwrap();
    let stop = model.document("stop").unwrap();
    assert!(stop.tf.is_empty() && stop.vector.is_empty());
    assert_eq!(stop.magnitude, 0.0);
    for query in ["rust", "memory safety", "garbage", "the and of"] {
        assert!(search(query, &model).unwrap().iter().all(|h| h.doc_id != "stop"));
    }
}

#[test]
fn idf_decreases_with_document_count() {
    let docs = [
        "alpha beta gamma delta",
        "alpha beta gamma",
        "alpha beta",
        "alpha",
    ];
    let sets: Vec<_> = docs.iter().map(|d| distinct_terms(&normalize(d))).collect();
    let idf = inverse_document_frequency(&sets, docs.len());
    assert_eq!(idf["alpha"], 0.0);
    assert!((idf["beta"] - (4.0f64 / 3.0).ln()).abs() < 1e-12);
    assert!((idf["gamma"] - 2.0f64.ln()).abs() < 1e-12);
    assert!((idf["delta"] - 4.0f64.ln()).abs() < 1e-12);
    assert!(idf["delta"] > idf["gamma"] && idf["gamma"] > idf["beta"] && idf["beta"] > idf["alpha"]);
}

#[test]
fn tf_sums_to_token_count() {
    let tokens = normalize("Walking walkers walked; the walker walks quickly, quickly.");
    let tf = term_frequency(&tokens);
    assert_eq!(tf.values().sum::<u32>() as usize, tokens.len());
}

#[test]
fn results_are_positive_and_sorted() {
    let model = build_model(&corpus(&[
        ("d1", "rust rust rust compiler"),
        ("d2", "rust garbage collector"),
        ("d3", "python interpreter"),
        ("d4", "compiler optimizations rust"),
    ]))
    .unwrap();
    let hits = search("rust compiler", &model).unwrap();
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.similarity > 0.0 && h.similarity <= 1.0 + 1e-12));
    assert!(hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    assert!(hits.iter().all(|h| h.doc_id != "d3"));
}

#[test]
fn identical_documents_tie_in_insertion_order() {
    let model = build_model(&corpus(&[
        ("second", "ferris crab"),
        ("first", "ferris crab"),
        ("other", "gopher"),
    ]))
    .unwrap();
    let ids: Vec<String> = search("crab", &model).unwrap().into_iter().map(|h| h.doc_id).collect();
    assert_eq!(ids, vec!["second", "first"]);
}
