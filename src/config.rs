//! Extension settings: the API credential, the model id, and the four
//! customizable prompt-template fragments.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_NAMESPACE: &str = "aiquickfix";

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert developer. You will be given a \
problem found in some code, followed by the code itself. Reply with a fixed version of \
the code only, no explanations. If you cannot fix the problem, reply exactly with \
\"I can't fix this problem\".";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FixSettings {
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub problem_prefix: String,
    pub problem_code_prefix: String,
    pub prompt_suffix: String,
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            problem_prefix: "This problem was reported:\n".to_string(),
            problem_code_prefix: "\n\nIn this code:\n".to_string(),
            prompt_suffix: "\n\nReply with only the fixed code.".to_string(),
        }
    }
}

impl FixSettings {
    /// True when no usable credential is configured.
    pub fn missing_api_key(&self) -> bool {
        self.api_key.trim().is_empty()
    }

    /// Generic key read, mirroring the host's configuration surface.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "apiKey" => Some(&self.api_key),
            "model" => Some(&self.model),
            "systemPrompt" => Some(&self.system_prompt),
            "problemPrefix" => Some(&self.problem_prefix),
            "problemCodePrefix" => Some(&self.problem_code_prefix),
            "promptSuffix" => Some(&self.prompt_suffix),
            _ => None,
        }
    }

    /// Generic key update, mirroring the host's configuration surface.
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let slot = match key {
            "apiKey" => &mut self.api_key,
            "model" => &mut self.model,
            "systemPrompt" => &mut self.system_prompt,
            "problemPrefix" => &mut self.problem_prefix,
            "problemCodePrefix" => &mut self.problem_code_prefix,
            "promptSuffix" => &mut self.prompt_suffix,
            _ => return Err(anyhow!("Unknown setting: {}.{}", SETTINGS_NAMESPACE, key)),
        };
        *slot = value.to_string();
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        toml::from_str(&text).context("Failed to parse settings file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    /// Per-user settings location, e.g. `~/.config/aiquickfix/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_NAMESPACE).join("config.toml"))
    }
}
