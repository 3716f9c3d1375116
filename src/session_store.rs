use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use log::{error, info};

fn default_domain() -> String {
    ".linkedin.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default = "default_domain")]
    pub domain: String,
}

/// Persists the authentication cookie set keyed by a named session file.
/// A missing or unreadable file is "no previous session", never an error.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path, filename: &str) -> Self {
        SessionStore {
            path: data_dir.join(filename),
        }
    }

    pub fn load(&self) -> Option<Vec<StoredCookie>> {
        if !self.path.exists() {
            info!("No session file found at {:?}. Starting fresh.", self.path);
            return None;
        }
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to open session file: {}", e);
                return None;
            }
        };
        let mut content = String::new();
        if let Err(e) = file.read_to_string(&mut content) {
            error!("Failed to read session file: {}", e);
            return None;
        }
        match serde_json::from_str::<Vec<StoredCookie>>(&content) {
            Ok(cookies) => {
                info!("Restored session with {} cookies.", cookies.len());
                Some(cookies)
            }
            Err(e) => {
                error!("Failed to parse session file: {}. Starting fresh.", e);
                None
            }
        }
    }

    /// Overwrites the stored cookie set wholesale.
    pub fn save(&self, cookies: &[StoredCookie]) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Failed to create session directory: {}", e);
                return;
            }
        }
        let json = match serde_json::to_string_pretty(&cookies) {
            Ok(j) => j,
            Err(e) => {
                error!("Failed to serialize session cookies: {}", e);
                return;
            }
        };
        let mut file = match OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
        {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to open session file for writing: {}", e);
                return;
            }
        };
        if let Err(e) = file.write_all(json.as_bytes()) {
            error!("Failed to write session file: {}", e);
        } else {
            info!("Session cookies saved to {:?}", self.path);
        }
    }
}
