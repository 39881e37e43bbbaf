use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Listing page scraped when no URL is given.
pub const DEFAULT_COURSES_URL: &str = "https://courses.analyticsvidhya.com/collections/courses";

/// Courses scraped for the semantic index.
pub const DEFAULT_SEMANTIC_LIMIT: usize = 5;

/// Courses scraped into the catalog store.
pub const DEFAULT_CATALOG_LIMIT: usize = 50;

/// How long the collector waits for listing cards to render.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Matches returned by a semantic query.
pub const DEFAULT_TOP_K: usize = 2;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7860";

const STORE_FILE_NAME: &str = "courses.json";

/// Configuration for coursescout project directories
pub struct CourseScoutDirs {
    project_dirs: Option<ProjectDirs>,
}

impl CourseScoutDirs {
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("com", "coursescout", "coursescout");
        Self { project_dirs }
    }

    /// Directory where embedding model files are cached.
    pub fn default_cache_dir(&self) -> PathBuf {
        match &self.project_dirs {
            Some(dirs) => dirs.cache_dir().to_path_buf(),
            None => current_dir().join(".cache"),
        }
    }

    /// Directory holding the scraped course store.
    pub fn default_data_dir(&self) -> PathBuf {
        match &self.project_dirs {
            Some(dirs) => dirs.data_dir().to_path_buf(),
            None => current_dir(),
        }
    }

    pub fn default_store_path(&self) -> PathBuf {
        self.default_data_dir().join(STORE_FILE_NAME)
    }

    /// Ensure the cache directory exists
    pub fn ensure_cache_dir(&self) -> std::io::Result<PathBuf> {
        let cache_dir = self.default_cache_dir();
        std::fs::create_dir_all(&cache_dir)?;
        Ok(cache_dir)
    }
}

impl Default for CourseScoutDirs {
    fn default() -> Self {
        Self::new()
    }
}

// Fallback when ProjectDirs cannot resolve a home directory
fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
