// On-disk cache for the FPL bootstrap payload.
use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::fpl::FplClient;
use super::types::Bootstrap;
use crate::Result;

/// Path: ~/.cache/fantasy-rooms/bootstrap-static.json
pub fn bootstrap_cache_path() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join("fantasy-rooms").join("bootstrap-static.json")
}

/// Try to read a file into a String
pub fn try_read_to_string(path: &Path) -> Option<String> {
    let mut f = fs::File::open(path).ok()?;
    let mut s = String::new();

    f.read_to_string(&mut s).ok()?;

    Some(s)
}

/// Write a string to file
pub fn write_string(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut f = fs::File::create(path)?;
    f.write_all(contents.as_bytes())
}

/// Read the cached bootstrap unless `refresh` is set or the cache is
/// missing/unreadable; otherwise fetch from FPL and rewrite the cache.
pub async fn load_or_fetch_bootstrap(
    client: &FplClient,
    path: &Path,
    refresh: bool,
) -> Result<Bootstrap> {
    if !refresh {
        if let Some(s) = try_read_to_string(path) {
            match serde_json::from_str::<Bootstrap>(&s) {
                Ok(bootstrap) => {
                    debug!(path = %path.display(), "bootstrap cache hit");
                    return Ok(bootstrap);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring corrupt bootstrap cache"),
            }
        }
    }

    let bootstrap = client.bootstrap().await?;

    if let Ok(json_str) = serde_json::to_string(&bootstrap) {
        if let Err(e) = write_string(path, &json_str) {
            warn!(path = %path.display(), error = %e, "could not write bootstrap cache");
        }
    }

    Ok(bootstrap)
}
