mod extract;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt};
use vsm_core::persist::{load_meta, load_model, save_model, IndexPaths};
use vsm_core::{DocId, DocumentInput, ModelStore};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use extract::{extract_file, ExtractionError};

/// One record of a JSON/JSONL collection file.
#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    name: String,
    content: String,
    #[serde(rename = "type", default = "default_type")]
    doc_type: String,
}

fn default_type() -> String { "text/plain".to_string() }

#[derive(Parser)]
#[command(name = "vsm-indexer")]
#[command(about = "Build and query a TF-IDF vector space model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from files, build the model and persist it
    Build {
        /// Input path (file or directory); may be repeated
        #[arg(long)]
        input: Vec<String>,
        /// Inline plain-text document; may be repeated
        #[arg(long)]
        text: Vec<String>,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Treat .json/.jsonl inputs as collections of {id, name, content, type} records
        #[arg(long, default_value_t = false)]
        records: bool,
    },
    /// Rank the indexed documents against a query
    Search {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Free-text query
        #[arg(long)]
        query: String,
        /// Show at most this many results
        #[arg(long)]
        k: Option<usize>,
    },
    /// Print the index meta file
    Stats {
        #[arg(long)]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, text, output, records } => build_index(&input, &text, &output, records),
        Commands::Search { index, query, k } => run_search(&index, &query, k),
        Commands::Stats { index } => {
            let meta = load_meta(&IndexPaths::new(&index)).with_context(|| format!("reading meta in {index}"))?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(())
        }
    }
}

fn build_index(inputs: &[String], texts: &[String], output: &str, records: bool) -> Result<()> {
    let documents = collect_documents(inputs, texts, records)?;
    if documents.is_empty() {
        bail!("no usable documents; upload at least one document with extractable text");
    }
    tracing::info!(num_docs = documents.len(), "collected documents");

    let store = ModelStore::new();
    let model = store.rebuild(&documents)?;
    let out_paths = IndexPaths::new(output);
    save_model(&out_paths, &model)?;

    tracing::info!(output, num_terms = model.num_terms(), "index build complete");
    Ok(())
}

fn collect_documents(inputs: &[String], texts: &[String], records: bool) -> Result<IndexMap<DocId, DocumentInput>> {
    let mut docs: IndexMap<DocId, DocumentInput> = IndexMap::new();

    for input in inputs {
        let input_path = Path::new(input);
        let mut files: Vec<PathBuf> = Vec::new();
        if input_path.is_dir() {
            for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                if entry.path().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if input_path.is_file() {
            files.push(input_path.to_path_buf());
        } else {
            bail!("input {input} does not exist");
        }

        for file in files {
            let ext = file.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
            match ext.as_deref() {
                Some("jsonl") if records => ingest_jsonl(&file, &mut docs)?,
                Some("json") if records => ingest_json(&file, &mut docs)?,
                _ => ingest_file(input_path, &file, &mut docs)?,
            }
        }
    }

    let mut next_text = 1;
    for (i, text) in texts.iter().enumerate() {
        if text.trim().is_empty() {
            tracing::warn!(position = i, "skipping empty inline text");
            continue;
        }
        while docs.contains_key(&format!("text-{next_text}")) {
            next_text += 1;
        }
        let name = format!("Document-{}.txt", docs.len() + 1);
        docs.insert(format!("text-{next_text}"), DocumentInput::new(name, text.as_str(), "text/plain"));
    }
    Ok(docs)
}

/// Extract one file. Extraction failures are reported and the file is skipped.
fn ingest_file(root: &Path, file: &Path, docs: &mut IndexMap<DocId, DocumentInput>) -> Result<()> {
    match extract_file(file) {
        Ok(extracted) => {
            let id = unique_file_id(root, file, docs)?;
            let name = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| id.clone());
            docs.insert(id, DocumentInput::new(name, extracted.text, extracted.kind.mime()));
        }
        Err(ExtractionError::UnsupportedType(path)) => {
            tracing::debug!(%path, "skipping unsupported file");
        }
        Err(err) => {
            tracing::warn!(error = %err, "skipping file");
        }
    }
    Ok(())
}

/// The relative id, or when another input already claimed it, the id scoped
/// by the input root's name and then by the full path.
fn unique_file_id(root: &Path, file: &Path, docs: &IndexMap<DocId, DocumentInput>) -> Result<DocId> {
    let base = document_id(root, file);
    let anchor = if root.is_dir() { Some(root) } else { root.parent() };
    let scoped = anchor
        .and_then(Path::file_name)
        .map(|name| format!("{}/{base}", name.to_string_lossy()));
    let full = file.to_string_lossy().replace('\\', "/");
    for candidate in std::iter::once(base.clone()).chain(scoped).chain(std::iter::once(full)) {
        if !docs.contains_key(&candidate) {
            if candidate != base {
                tracing::warn!(id = %base, renamed = %candidate, "document id already taken, using a scoped id");
            }
            return Ok(candidate);
        }
    }
    bail!("document id {base} collides with another input for {}", file.display())
}

/// Path relative to the input root, or the file name when the root is the file itself.
fn document_id(root: &Path, file: &Path) -> DocId {
    let rel = file.strip_prefix(root).ok().filter(|p| !p.as_os_str().is_empty());
    let rel = rel.unwrap_or_else(|| file.file_name().map(Path::new).unwrap_or(file));
    rel.to_string_lossy().replace('\\', "/")
}

fn ingest_jsonl(file: &Path, docs: &mut IndexMap<DocId, DocumentInput>) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line).with_context(|| format!("parsing record in {}", file.display()))?;
        ingest_record(doc, docs)?;
    }
    Ok(())
}

fn ingest_json(file: &Path, docs: &mut IndexMap<DocId, DocumentInput>) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)?;
                ingest_record(doc, docs)?;
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)?;
            ingest_record(doc, docs)?;
        }
        _ => tracing::warn!(file = %file.display(), "ignoring JSON file that holds no records"),
    }
    Ok(())
}

fn ingest_record(doc: InputDoc, docs: &mut IndexMap<DocId, DocumentInput>) -> Result<()> {
    if doc.content.trim().is_empty() {
        tracing::warn!(id = %doc.id, "skipping record with empty content");
        return Ok(());
    }
    if docs.contains_key(&doc.id) {
        bail!("duplicate document id {}", doc.id);
    }
    docs.insert(doc.id, DocumentInput::new(doc.name, doc.content, doc.doc_type));
    Ok(())
}

fn run_search(index: &str, query: &str, k: Option<usize>) -> Result<()> {
    let Some(model) = load_model(&IndexPaths::new(index)) else {
        bail!("no documents have been processed in {index}; run `build` first");
    };
    let store = ModelStore::with_model(Some(model));
    let mut results = store.search(query)?;
    tracing::info!(query, total_hits = results.len(), "search finished");
    if let Some(k) = k {
        results.truncate(k);
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
