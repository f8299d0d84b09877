use anyhow::{anyhow, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::models::Contact;

/// Who the local user appears as in reply labels and the window title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            display_name: "You".to_string(),
        }
    }
}

/// On-disk session config: the local profile and the conversations the
/// console seeds at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub profile: Profile,
    pub contacts: Vec<Contact>,
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join("parley");

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

pub fn default_roster_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("roster.json"))
}

pub fn load_roster(path: &Path) -> Result<Option<RosterConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let config: RosterConfig = serde_json::from_str(&contents)?;
    info!(
        "Loaded {} contacts from {}",
        config.contacts.len(),
        path.display()
    );

    Ok(Some(config))
}

pub fn save_roster(path: &Path, config: &RosterConfig) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    info!("Saved roster to {}", path.display());
    Ok(())
}

/// Built-in roster used when no config file exists yet.
pub fn default_roster() -> RosterConfig {
    RosterConfig {
        profile: Profile::default(),
        contacts: vec![
            seed("alice", "Alice Moreau", true, &["friends"]),
            seed("ben", "Ben Okafor", false, &["work"]),
            seed("chiara", "Chiara Russo", true, &["friends", "work"]),
            seed("dmitri", "Dmitri Volkov", false, &[]),
            seed("elena", "Elena Fischer", true, &["family"]),
        ],
    }
}

fn seed(id: &str, name: &str, online: bool, tags: &[&str]) -> Contact {
    Contact {
        id: id.to_string(),
        name: name.to_string(),
        avatar_ref: format!("avatar:{}", id),
        last_message_preview: String::new(),
        last_message_time: 0,
        unread_count: 0,
        online,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}
