use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub log_dir: PathBuf,
    pub config_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let log_dir = project_root.join("logs");
        let config_path = discover_config_path(&project_root);

        let _ = fs::create_dir_all(&log_dir);

        AppPaths {
            project_root,
            log_dir,
            config_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("SUPPLY_RAG_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("Cargo.toml").exists() {
        return manifest_dir;
    }

    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn discover_config_path(project_root: &std::path::Path) -> PathBuf {
    if let Ok(path) = env::var("SUPPLY_RAG_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    project_root.join("config.yml")
}
