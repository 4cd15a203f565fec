use std::path::PathBuf;

use idmap::IdMap;

use crate::{
    backend::task::TaskContainer,
    config::{self, GeneralConfig},
    config_io,
    overlays::toast::{ToastDisplayMethod, ToastManager, ToastTopic},
    subsystem::{cache::QueryCache, notifications::NotificationFeed},
};

pub struct AppState {
    pub session: AppSession,
    pub tasks: TaskContainer,
    pub query_cache: QueryCache,
    pub notifications: NotificationFeed,
    pub toasts: ToastManager,
}

impl AppState {
    pub fn new(session: AppSession, tasks: TaskContainer) -> Self {
        Self {
            session,
            tasks,
            query_cache: QueryCache::new(),
            notifications: NotificationFeed::new(),
            toasts: ToastManager::new(),
        }
    }
}

pub struct AppSession {
    pub config_root_path: PathBuf,
    pub config: GeneralConfig,
    pub toast_topics: IdMap<ToastTopic, ToastDisplayMethod>,
}

impl AppSession {
    pub fn load() -> Self {
        let config_root_path = config_io::ensure_dir();
        log::info!("Config root path: {}", config_root_path.display());

        let config = config::load_general().unwrap_or_else(|e| {
            log::error!("Failed to load config, using defaults: {e}");
            GeneralConfig::default()
        });

        Self {
            config_root_path,
            ..Self::from_config(config)
        }
    }

    pub fn from_config(config: GeneralConfig) -> Self {
        let mut toast_topics = IdMap::new();
        toast_topics.insert(ToastTopic::System, ToastDisplayMethod::Show);
        toast_topics.insert(ToastTopic::Notification, ToastDisplayMethod::Show);
        toast_topics.insert(ToastTopic::Alert, ToastDisplayMethod::Show);
        config.notification_topics.iter().for_each(|(k, v)| {
            toast_topics.insert(*k, *v);
        });

        Self {
            config_root_path: config_io::get_config_root(),
            config,
            toast_topics,
        }
    }
}
