use crate::index::Model;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use tempfile::NamedTempFile;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn for_model(model: &Model) -> Self {
        Self {
            num_docs: model.len() as u32,
            num_terms: model.num_terms() as u32,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            version: FORMAT_VERSION,
        }
    }
}

/// The storage slot: one model file per index directory.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn model(&self) -> PathBuf { self.root.join("model.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn serialize(model: &Model) -> Result<String> {
    Ok(serde_json::to_string(model)?)
}

/// Best-effort restore. Anything unreadable is "no model".
pub fn deserialize(text: &str) -> Option<Model> {
    match serde_json::from_str(text) {
        Ok(model) => Some(model),
        Err(err) => {
            tracing::warn!(error = %err, "discarding unreadable model");
            None
        }
    }
}

/// Write the model and its meta file. Each file goes to its own uniquely
/// named temp file first and is renamed into place, so the slot holds either
/// the old or the new model. Callers that publish concurrently must order
/// their saves themselves, e.g. via [`ModelStore::rebuild_with`](crate::ModelStore::rebuild_with).
pub fn save_model(paths: &IndexPaths, model: &Model) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serialize(model)?;
    write_atomic(paths, &paths.model(), json.as_bytes())?;
    save_meta(paths, &MetaFile::for_model(model))?;
    Ok(())
}

fn write_atomic(paths: &IndexPaths, target: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(&paths.root)
        .with_context(|| format!("creating temp file in {}", paths.root.display()))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).with_context(|| format!("replacing {}", target.display()))?;
    Ok(())
}

pub fn load_model(paths: &IndexPaths) -> Option<Model> {
    let mut f = File::open(paths.model()).ok()?;
    let mut buf = String::new();
    if let Err(err) = f.read_to_string(&mut buf) {
        tracing::warn!(error = %err, path = %paths.model().display(), "failed to read model");
        return None;
    }
    deserialize(&buf)
}

/// Remove the persisted slot. Missing files are not an error.
pub fn remove_model(paths: &IndexPaths) -> Result<()> {
    for path in [paths.model(), paths.meta()] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err).with_context(|| format!("removing {}", path.display())),
        }
    }
    Ok(())
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    write_atomic(paths, &paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_model, DocumentInput};
    use indexmap::IndexMap;
    use tempfile::tempdir;

    fn sample() -> Model {
        let docs: IndexMap<String, DocumentInput> = [
            ("d1", "the cat sat on the mat"),
            ("d2", "the dog sat on the log"),
            ("d3", "a third document about cats and dogs"),
        ]
        .iter()
        .map(|(id, text)| (id.to_string(), DocumentInput::new(*id, *text, "text/plain")))
        .collect();
        build_model(&docs).unwrap()
    }

    #[test]
    fn text_form_preserves_weights_exactly() {
        let model = sample();
        let restored = deserialize(&serialize(&model).unwrap()).unwrap();
        assert_eq!(restored, model);
        let ids: Vec<&str> = restored.documents.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
    }

    #[test]
    fn corrupt_text_is_no_model() {
        assert!(deserialize("{not json").is_none());
        assert!(deserialize("").is_none());
        assert!(deserialize(r#"{"documents": 3}"#).is_none());
    }

    #[test]
    fn slot_round_trip_and_removal() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("index"));
        assert!(load_model(&paths).is_none());

        let model = sample();
        save_model(&paths, &model).unwrap();
        assert_eq!(load_model(&paths).unwrap(), model);
        let meta = load_meta(&paths).unwrap();
        assert_eq!(meta.num_docs, 3);
        assert_eq!(meta.version, FORMAT_VERSION);

        remove_model(&paths).unwrap();
        assert!(load_model(&paths).is_none());
        remove_model(&paths).unwrap();
    }

    #[test]
    fn concurrent_saves_never_fail_or_tear() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let small = sample();
        let large = {
            let docs: IndexMap<String, DocumentInput> = (0..200)
                .map(|i| (format!("doc{i}"), DocumentInput::new(format!("doc{i}"), format!("word{i} shared text"), "text/plain")))
                .collect();
            build_model(&docs).unwrap()
        };
        for _ in 0..50 {
            std::thread::scope(|s| {
                let a = s.spawn(|| save_model(&paths, &small));
                let b = s.spawn(|| save_model(&paths, &large));
                a.join().unwrap().unwrap();
                b.join().unwrap().unwrap();
            });
            let loaded = load_model(&paths).unwrap();
            assert!(loaded == small || loaded == large);
        }
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 2);
    }

    #[test]
    fn corrupt_slot_loads_as_none() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        fs::write(paths.model(), b"\x00\x01garbage").unwrap();
        assert!(load_model(&paths).is_none());
    }
}
