use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{config::load_known_yaml, windowing::AppId};

const APPS_FILE: &str = "apps.yaml";
const APPS_FALLBACK: &str = include_str!("../res/apps.yaml");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum AppCategory {
    Marketplace,
    Studio,
    Concierge,
    Utility,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDefinition {
    pub id: AppId,
    pub label: Arc<str>,
    pub icon: Arc<str>,
    #[serde(default = "def_category")]
    pub category: AppCategory,
}

const fn def_category() -> AppCategory {
    AppCategory::Utility
}

#[derive(Deserialize)]
struct AppsFile {
    apps: Vec<AppDefinition>,
}

/// Static metadata for every overlay app the shell knows how to show.
/// Window state is tracked elsewhere; this is only id → label/icon.
#[derive(Clone, Debug, Default)]
pub struct AppRegistry {
    apps: Vec<AppDefinition>,
}

impl AppRegistry {
    pub fn load() -> anyhow::Result<Self> {
        let file: AppsFile = load_known_yaml(APPS_FILE, APPS_FALLBACK)?;
        Ok(Self::from_definitions(file.apps))
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let file: AppsFile = serde_yaml::from_str(yaml)?;
        Ok(Self::from_definitions(file.apps))
    }

    /// Later definitions replace earlier ones with the same id.
    pub fn from_definitions(definitions: impl IntoIterator<Item = AppDefinition>) -> Self {
        let mut apps: Vec<AppDefinition> = Vec::new();
        for def in definitions {
            if let Some(existing) = apps.iter_mut().find(|a| a.id == def.id) {
                log::warn!("Duplicate app id in registry: {}", def.id);
                *existing = def;
            } else {
                apps.push(def);
            }
        }
        Self { apps }
    }

    pub fn get(&self, app_id: &str) -> Option<&AppDefinition> {
        self.apps.iter().find(|a| a.id.as_str() == app_id)
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.get(app_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppDefinition> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
