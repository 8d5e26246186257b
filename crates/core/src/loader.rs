use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::model::HierarchyNode;

/// Where a hierarchy document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Dataset(Dataset),
    Url(String),
    File(PathBuf),
}

impl Source {
    pub fn label(&self) -> String {
        match self {
            Source::Dataset(d) => d.title().to_string(),
            Source::Url(url) => url.clone(),
            Source::File(path) => path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_else(|| path.to_str().unwrap_or(""))
                .to_string(),
        }
    }

    pub fn dataset(&self) -> Option<Dataset> {
        match self {
            Source::Dataset(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A load tagged with the selection generation that asked for it.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub generation: u64,
    pub source: Source,
}

#[derive(Debug, Clone)]
pub enum LoadMsg {
    Done {
        generation: u64,
        source: Source,
        root: HierarchyNode,
    },
    Error {
        generation: u64,
        source: Source,
        message: String,
    },
}

impl LoadMsg {
    pub fn generation(&self) -> u64 {
        match self {
            LoadMsg::Done { generation, .. } | LoadMsg::Error { generation, .. } => *generation,
        }
    }
}

pub fn parse(text: &str) -> Result<HierarchyNode> {
    Ok(serde_json::from_str(text)?)
}

pub fn fetch_text(url: &str) -> Result<String> {
    let response = ureq::get(url).call().map_err(|e| Error::Http {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(response.into_string()?)
}

/// Fetches and parses hierarchy documents. Clones share the same memo, so a
/// dataset fetched once is served from memory on the next selection.
#[derive(Clone, Default)]
pub struct Loader {
    memo: Arc<Mutex<HashMap<String, String>>>,
    #[cfg(feature = "cache")]
    cache: Option<sled::Db>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists fetched documents under `dir`, keyed by URL.
    #[cfg(feature = "cache")]
    pub fn with_cache(mut self, dir: &std::path::Path) -> Result<Self> {
        self.cache = Some(sled::open(dir)?);
        Ok(self)
    }

    pub fn load(&self, source: &Source) -> Result<HierarchyNode> {
        let text = match source {
            Source::Dataset(d) => self.remote_text(d.url())?,
            Source::Url(url) => self.remote_text(url)?,
            Source::File(path) => std::fs::read_to_string(path)?,
        };
        let root = parse(&text)?;
        tracing::info!(source = %source, children = root.children.len(), "dataset loaded");
        Ok(root)
    }

    /// Thread entry: loads `request.source` and reports back on `tx`.
    pub fn run(&self, request: LoadRequest, tx: Sender<LoadMsg>) {
        let LoadRequest { generation, source } = request;
        let msg = match self.load(&source) {
            Ok(root) => LoadMsg::Done {
                generation,
                source,
                root,
            },
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "dataset load failed");
                LoadMsg::Error {
                    generation,
                    source,
                    message: e.to_string(),
                }
            }
        };
        let _ = tx.send(msg);
    }

    fn remote_text(&self, url: &str) -> Result<String> {
        if let Some(text) = self.memo.lock().get(url).cloned() {
            tracing::debug!(url, "served from memory");
            return Ok(text);
        }
        if let Some(text) = self.cached(url)? {
            tracing::debug!(url, "served from disk cache");
            self.memo.lock().insert(url.to_string(), text.clone());
            return Ok(text);
        }

        tracing::info!(url, "fetching");
        let text = fetch_text(url)?;
        self.store(url, &text)?;
        self.memo.lock().insert(url.to_string(), text.clone());
        Ok(text)
    }

    #[cfg(feature = "cache")]
    fn cached(&self, url: &str) -> Result<Option<String>> {
        let Some(db) = &self.cache else { return Ok(None) };
        Ok(db
            .get(url.as_bytes())?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    #[cfg(not(feature = "cache"))]
    fn cached(&self, _url: &str) -> Result<Option<String>> {
        Ok(None)
    }

    #[cfg(feature = "cache")]
    fn store(&self, url: &str, text: &str) -> Result<()> {
        if let Some(db) = &self.cache {
            db.insert(url.as_bytes(), text.as_bytes())?;
            db.flush()?;
        }
        Ok(())
    }

    #[cfg(not(feature = "cache"))]
    fn store(&self, _url: &str, _text: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_loads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(
            &path,
            r#"{"name":"Movies","children":[{"name":"Action","children":[
                {"name":"Avatar","category":"Action","value":"760505847"}]}]}"#,
        )
        .unwrap();
        let root = Loader::new().load(&Source::File(path.clone())).unwrap();
        assert_eq!(root.name, "Movies");
        assert_eq!(root.children[0].children[0].value, Some(760505847.0));
        assert_eq!(Source::File(path).label(), "movies.json");
    }

    #[test]
    fn run_reports_errors_with_generation() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let request = LoadRequest {
            generation: 7,
            source: Source::File(PathBuf::from("/definitely/not/here.json")),
        };
        Loader::new().run(request, tx);
        match rx.recv().unwrap() {
            LoadMsg::Error { generation, .. } => assert_eq!(generation, 7),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_document_is_a_json_error() {
        assert!(matches!(parse("{\"children\": 3}"), Err(Error::Json(_))));
    }

    #[test]
    fn memo_is_shared_between_clones() {
        let loader = Loader::new();
        let url = "memory://games";
        loader.memo.lock().insert(
            url.to_string(),
            r#"{"name":"g","children":[{"name":"x","category":"c","value":1}]}"#.to_string(),
        );
        let root = loader.clone().load(&Source::Url(url.to_string())).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[cfg(feature = "cache")]
    #[test]
    fn disk_cache_survives_a_new_loader() {
        let dir = tempfile::tempdir().unwrap();
        let url = "http://cache.invalid/pledges.json";
        {
            let loader = Loader::new().with_cache(dir.path()).unwrap();
            loader
                .store(
                    url,
                    r#"{"name":"k","children":[{"name":"Pebble","category":"Tech","value":"20338986"}]}"#,
                )
                .unwrap();
        }

        let loader = Loader::new().with_cache(dir.path()).unwrap();
        let root = loader.load(&Source::Url(url.to_string())).unwrap();
        assert_eq!(root.children[0].value, Some(20338986.0));
        assert!(loader.memo.lock().contains_key(url));
    }
}
