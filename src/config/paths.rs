//! Platform directories for settings and Whisper models, via `dirs`.
//!
//! | | settings | models |
//! |-|----------|--------|
//! | Linux | `~/.config/gita-voice/` | `~/.local/share/gita-voice/models/` |
//! | macOS | `~/Library/Application Support/gita-voice/` | same, `models/` |
//! | Windows | `%APPDATA%\gita-voice\` | `%LOCALAPPDATA%\gita-voice\models\` |

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    /// `settings.toml` inside `config_dir`; the default for `--config`.
    pub settings_file: PathBuf,
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "gita-voice";

    /// Falls back to the working directory where the platform has no
    /// standard location.
    pub fn new() -> Self {
        let base = |dir: Option<PathBuf>| dir.unwrap_or_else(|| PathBuf::from(".")).join(Self::APP_NAME);
        let config_dir = base(dirs::config_dir());
        let models_dir = base(dirs::data_local_dir()).join("models");

        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            models_dir,
        }
    }

    /// `model` as given when absolute, else inside `models_dir`.
    pub fn resolve_model(&self, model: &Path) -> PathBuf {
        if model.is_absolute() {
            model.to_path_buf()
        } else {
            self.models_dir.join(model)
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
