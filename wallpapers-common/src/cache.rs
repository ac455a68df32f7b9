use crate::error::{CacheError, WallpapersError};
use crate::Result;
use reqwest::blocking::Client;
use reqwest::Url;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
    client: Client,
    max_files: usize,
}

impl ImageCache {
    pub fn new(dir: PathBuf, client: Client, max_files: usize) -> Self {
        Self {
            dir,
            client,
            max_files,
        }
    }

    /// `$XDG_CACHE_HOME/wallpapers`
    pub fn default_dir() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|d| d.join("wallpapers"))
            .ok_or(WallpapersError::Cache(CacheError::NoCacheDir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(file_name(url))
    }

    /// Local path for `url`, downloading it on first use.
    pub fn fetch(&self, url: &str) -> Result<PathBuf> {
        if let Some(local) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(local));
        }

        let path = self.path_for(url);
        if path.is_file() {
            log::debug!("Using cached image {:?}", path);
            return Ok(path);
        }

        fs::create_dir_all(&self.dir).map_err(|e| CacheError::FileWrite {
            path: self.dir.clone(),
            source: e,
        })?;

        log::info!("Downloading {}", url);
        let download_error = |e: reqwest::Error| CacheError::Download {
            url: url.to_string(),
            message: e.to_string(),
        };
        let bytes = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(download_error)?;

        // Write under a temporary name so a half-written file is never reused.
        let partial = path.with_extension("part");
        fs::write(&partial, &bytes).map_err(|e| CacheError::FileWrite {
            path: partial.clone(),
            source: e,
        })?;
        fs::rename(&partial, &path).map_err(|e| CacheError::FileWrite {
            path: path.clone(),
            source: e,
        })?;

        log::debug!("Cached {} bytes at {:?}", bytes.len(), path);
        Ok(path)
    }

    /// Remove the oldest files beyond `max_files`. Returns how many went.
    pub fn prune(&self) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }

        let mut files: Vec<(SystemTime, PathBuf)> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((modified, entry.into_path()))
            })
            .collect();

        if files.len() <= self.max_files {
            return Ok(0);
        }

        // Newest first
        files.sort_by(|a, b| b.0.cmp(&a.0));
        let mut removed = 0;
        for (_, path) in files.into_iter().skip(self.max_files) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Could not remove cached image {:?}: {}", path, e),
            }
        }
        log::debug!("Pruned {} cached images", removed);
        Ok(removed)
    }
}

/// The URL's last path segment when it looks like an image file, otherwise a
/// hash of the whole URL.
pub fn file_name(url: &str) -> String {
    let segment = Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });

    if let Some(name) = segment {
        let extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let safe = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if safe && extension.is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str())) {
            return name;
        }
    }

    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    format!("{:016x}.jpg", hasher.finish())
}
