use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::prompt::PromptVariant;

pub const DEFAULT_CONFIG_FILE: &str = "vibe-prompt.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub daily_limit: u32,
    pub timeout_secs: u64,
    pub default_variant: PromptVariant,
    pub export_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:54321".into(),
            anon_key: String::new(),
            access_token: None,
            user_id: None,
            daily_limit: 5,
            timeout_secs: 60,
            default_variant: PromptVariant::Structured,
            export_dir: ".vibe-prompt/out".into(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (explicit path, or the default file when
    /// present), then `VIBE_PROMPT_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!("loading config from {}", path.display());
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("VIBE_PROMPT_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = get("VIBE_PROMPT_ANON_KEY") {
            self.anon_key = v;
        }
        if let Some(v) = get("VIBE_PROMPT_ACCESS_TOKEN") {
            self.access_token = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = get("VIBE_PROMPT_USER_ID") {
            self.user_id = Some(v).filter(|s| !s.trim().is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            backend_url = "https://demo.supabase.co"
            default_variant = "narrative"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.backend_url, "https://demo.supabase.co");
        assert_eq!(cfg.default_variant, PromptVariant::Narrative);
        assert_eq!(cfg.daily_limit, 5);
        assert!(cfg.user_id.is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("VIBE_PROMPT_USER_ID", "user-1"),
            ("VIBE_PROMPT_ACCESS_TOKEN", ""),
        ]);
        let mut cfg = Config { access_token: Some("stale".into()), ..Config::default() };
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.user_id.as_deref(), Some("user-1"));
        assert_eq!(cfg.access_token, None);
    }
}
