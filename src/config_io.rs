use std::{path::PathBuf, sync::LazyLock};

const FALLBACK_CONFIG_PATH: &str = "/tmp/overlay-shell";

static CONFIG_ROOT_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Some(mut dir) = xdg::BaseDirectories::new().get_config_home() {
        dir.push("overlay-shell");
        return dir;
    }
    log::error!("Err: Failed to find config path, using {FALLBACK_CONFIG_PATH}");
    PathBuf::from(FALLBACK_CONFIG_PATH)
});

pub fn get_config_root() -> PathBuf {
    CONFIG_ROOT_PATH.clone()
}

pub fn get_conf_d_path() -> PathBuf {
    get_config_root().join("conf.d")
}

// Make sure config directory is present and return root config path
pub fn ensure_dir() -> PathBuf {
    let path = get_config_root();
    let _ = std::fs::create_dir_all(&path);
    let _ = std::fs::create_dir(get_conf_d_path());
    path
}

pub fn get_config_file_path(filename: &str) -> PathBuf {
    get_config_root().join(filename)
}

pub fn load(filename: &str) -> Option<String> {
    let path = get_config_file_path(filename);
    log::info!("Loading config: {}", path.to_string_lossy());

    std::fs::read_to_string(path).ok()
}
