use crate::traits::CourseRecord;
use log::{debug, info};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures reading or writing the course store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("course data file '{}' not found", path.display())]
    NotFound { path: PathBuf },
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed course data in '{}': {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn path(&self) -> &Path {
        match self {
            StoreError::NotFound { path }
            | StoreError::Io { path, .. }
            | StoreError::Malformed { path, .. } => path,
        }
    }
}

/// Flat-file store holding the latest scrape as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonCourseStore {
    path: PathBuf,
}

impl JsonCourseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonCourseStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file's content with `records`.
    pub fn write(&self, records: &[CourseRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let json = serde_json::to_string_pretty(records).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(|source| self.io_error(source))?;

        info!("Wrote {} courses to {:?}", records.len(), self.path);
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<CourseRecord>, StoreError> {
        let data = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                self.io_error(source)
            }
        })?;

        let records: Vec<CourseRecord> =
            serde_json::from_str(&data).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        debug!("Read {} courses from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Loads the store and keeps records whose title contains `query`, ignoring case.
    pub fn search_titles(&self, query: &str) -> Result<Vec<CourseRecord>, StoreError> {
        Ok(filter_by_title(self.read()?, query))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

pub fn filter_by_title(records: Vec<CourseRecord>, query: &str) -> Vec<CourseRecord> {
    let needle = query.to_lowercase();
    records
        .into_iter()
        .filter(|record| record.title.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (JsonCourseStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = JsonCourseStore::new(temp_dir.path().join("courses.json"));
        (store, temp_dir)
    }

    fn course(title: &str) -> CourseRecord {
        CourseRecord::from_raw(
            Some(title.to_string()),
            Some(title.to_string()),
            Some("8 Lessons".to_string()),
            Some("Free".to_string()),
            Some("https://example.com/cover.png".to_string()),
        )
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let (store, _temp_dir) = create_test_store();
        for n in [0, 1, 5] {
            let records: Vec<CourseRecord> =
                (0..n).map(|i| course(&format!("Course ünïcode {}", i))).collect();
            store.write(&records).unwrap();
            assert_eq!(store.read().unwrap(), records);
        }
    }

    #[test]
    fn test_write_overwrites_previous_content() {
        let (store, _temp_dir) = create_test_store();
        store
            .write(&[course("Old A"), course("Old B"), course("Old C")])
            .unwrap();
        store.write(&[course("New")]).unwrap();

        let records = store.read().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "New");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCourseStore::new(temp_dir.path().join("nested/dir/courses.json"));
        store.write(&[course("Python Basics")]).unwrap();
        assert_eq!(store.read().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let (store, _temp_dir) = create_test_store();
        let err = store.read().unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(err.to_string().contains("courses.json"));
    }

    #[test]
    fn test_garbage_file_is_malformed() {
        let (store, _temp_dir) = create_test_store();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.read().unwrap_err(),
            StoreError::Malformed { .. }
        ));
    }

    #[test]
    fn test_title_filter_ignores_case() {
        let records = vec![course("Python Basics"), course("Cooking 101")];

        let upper = filter_by_title(records.clone(), "PYTHON");
        let lower = filter_by_title(records, "python");
        assert_eq!(upper.len(), 1);
        assert_eq!(upper, lower);
        assert_eq!(upper[0].title, "Python Basics");
    }

    #[test]
    fn test_search_titles_reads_store() {
        let (store, _temp_dir) = create_test_store();
        store
            .write(&[course("Python Basics"), course("Advanced Python")])
            .unwrap();
        assert_eq!(store.search_titles("python").unwrap().len(), 2);
        assert!(store.search_titles("rust").unwrap().is_empty());
    }
}
