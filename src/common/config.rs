//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};
use crate::prompt::PromptLanguage;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Agent bridge settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Browser settings forwarded to the agent bridge
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Language model settings forwarded to the agent bridge
    #[serde(default)]
    pub llm: LlmConfig,

    /// Run settings
    #[serde(default)]
    pub run: RunConfig,
}

/// Agent bridge process settings
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Bridge executable (absolute path or a name resolved through PATH)
    #[serde(default = "default_agent_command")]
    pub command: PathBuf,

    /// Additional arguments to pass to the bridge
    #[serde(default)]
    pub args: Vec<String>,

    /// Step budget per test case
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Whether the agent may use screenshots
    #[serde(default = "default_true")]
    pub use_vision: bool,

    /// Environment variables that must be set before the session opens
    #[serde(default = "default_required_env")]
    pub required_env: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
            args: Vec::new(),
            max_steps: default_max_steps(),
            use_vision: true,
            required_env: default_required_env(),
        }
    }
}

fn default_agent_command() -> PathBuf {
    PathBuf::from("agentqa-bridge")
}
fn default_max_steps() -> u32 {
    25
}
fn default_true() -> bool {
    true
}
fn default_required_env() -> Vec<String> {
    vec!["ANTHROPIC_API_KEY".to_string()]
}

/// Browser context settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BrowserConfig {
    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// Where the bridge stores session recordings
    #[serde(default = "default_recording_dir")]
    pub recording_dir: PathBuf,

    /// How long to wait for the network to go idle after a page load
    #[serde(default = "default_network_idle")]
    pub network_idle_wait_secs: f64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            locale: default_locale(),
            recording_dir: default_recording_dir(),
            network_idle_wait_secs: default_network_idle(),
        }
    }
}

fn default_locale() -> String {
    "ko-KR".to_string()
}
fn default_recording_dir() -> PathBuf {
    PathBuf::from("recording")
}
fn default_network_idle() -> f64 {
    3.0
}

/// Language model settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_secs: default_llm_timeout(),
            temperature: 0.0,
        }
    }
}

fn default_model() -> String {
    "claude-3-5-sonnet-20240620".to_string()
}
fn default_llm_timeout() -> u64 {
    25
}

/// Run settings
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Root directory for per-case conversation logs
    #[serde(default = "default_log_root")]
    pub log_root: PathBuf,

    /// Template used to render agent instructions
    #[serde(default)]
    pub prompt_language: PromptLanguage,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            log_root: default_log_root(),
            prompt_language: PromptLanguage::default(),
        }
    }
}

fn default_log_root() -> PathBuf {
    PathBuf::from("logs")
}

impl Config {
    /// Load configuration from `path`, or from the default config file
    ///
    /// Returns default configuration if no file exists. An explicit path
    /// that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Check values that serde defaults cannot guard
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_steps == 0 {
            return Err(Error::Config("agent.max_steps must be at least 1".to_string()));
        }
        if self.browser.network_idle_wait_secs < 0.0 {
            return Err(Error::Config(
                "browser.network_idle_wait_secs must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the bridge executable
    ///
    /// Names without a path separator are searched in PATH.
    pub fn resolve_agent_command(&self) -> Result<PathBuf> {
        let command = &self.agent.command;
        if command.components().count() > 1 || command.is_absolute() {
            return Ok(command.clone());
        }
        which::which(command).map_err(|_| Error::AgentNotFound {
            name: command.display().to_string(),
        })
    }
}
