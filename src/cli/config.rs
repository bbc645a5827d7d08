use std::fs;
use std::path::PathBuf;

use crate::config;
use crate::session::{SessionGuard, SessionStore};

/// Client config directory: `HAVEN_CONFIG_DIR`, then `~/.config/haven/admin`
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = match &config::config().session.config_dir {
        Some(custom_dir) => PathBuf::from(custom_dir),
        None => {
            let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("haven").join("admin")
        }
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_store() -> anyhow::Result<SessionStore> {
    Ok(SessionStore::in_dir(&get_config_dir()?))
}

/// Guard loaded from the saved session file
pub fn load_guard() -> anyhow::Result<SessionGuard> {
    Ok(SessionGuard::with_store(session_store()?)?)
}
