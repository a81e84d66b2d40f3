//! JSON file storage for publication collections

use citeforge_graph::collection;
use citeforge_graph::Publication;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::errors::RunError;

/// Load a JSON array of publications
///
/// A missing file is an empty source: not every fetch step produces output.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_publications(path: &Path) -> Result<Vec<Publication>, RunError> {
    let display = path.display().to_string();

    if !path.exists() {
        warn!("Input file not found, treating it as empty");
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(path).map_err(|source| RunError::Read {
        path: display.clone(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|source| RunError::Parse {
        path: display.clone(),
        source,
    })?;
    let publications = collection::parse_publications(value)
        .map_err(|source| RunError::InvalidRecord { path: display, source })?;

    info!(publications = publications.len(), "Loaded publications");
    Ok(publications)
}

/// Write any serializable value as pretty-printed JSON, creating parent directories
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RunError> {
    let write_err = |source: std::io::Error| RunError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(write_err)?;

    info!("Wrote output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("citeforge-store-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = scratch_dir("missing");
        let publications = load_publications(&dir.join("absent.json")).unwrap();
        assert!(publications.is_empty());
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("nested").join("works.json");
        let publications = vec![
            Publication::new("W1", vec!["W2".to_string()]).with_terms([("graph", 2)]),
            Publication::new("W2", Vec::new()),
        ];

        write_json(&path, &publications).unwrap();
        let loaded = load_publications(&path).unwrap();

        assert_eq!(loaded, publications);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_json_and_records() {
        let dir = scratch_dir("invalid");

        let garbage = dir.join("garbage.json");
        fs::write(&garbage, "{not json").unwrap();
        assert!(matches!(load_publications(&garbage), Err(RunError::Parse { .. })));

        let no_id = dir.join("no_id.json");
        fs::write(&no_id, r#"[{"id": "W1"}, {"title": "orphan"}]"#).unwrap();
        match load_publications(&no_id) {
            Err(RunError::InvalidRecord { path, source }) => {
                assert!(path.ends_with("no_id.json"));
                assert!(source.to_string().contains("index 1"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        fs::remove_dir_all(&dir).ok();
    }
}
