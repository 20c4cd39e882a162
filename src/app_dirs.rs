use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "neontype")
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().to_path_buf())
    }

    /// Where the history lists live
    pub fn data_dir() -> Option<PathBuf> {
        Self::project().map(|pd| pd.data_local_dir().to_path_buf())
    }

    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("neontype"),
            )
        } else {
            Self::data_dir()
        }
    }
}
