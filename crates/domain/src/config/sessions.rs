use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session persistence
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Directory holding `sessions.json` and the `attachments/` folder.
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
    /// Maximum characters of the first message used as a session title.
    #[serde(default = "d_title_chars")]
    pub title_max_chars: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            state_path: d_state_path(),
            title_max_chars: d_title_chars(),
        }
    }
}

fn d_state_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".council"))
        .unwrap_or_else(|| PathBuf::from(".council"))
}

fn d_title_chars() -> usize {
    48
}
