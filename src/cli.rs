//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying a YAML or JSON event script
//! - Layering an extra keymap over the defaults
//! - Overriding the sequence timeout and platform
//! - JSON lines output for scripting

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::KeytrapConfig;
use crate::keymap::Platform;

/// Replay keyboard events against a keymap
#[derive(Parser, Debug)]
#[command(name = "keytrap", version, about = "Replay keyboard events against a keymap")]
pub struct CliArgs {
    /// Event script to replay (YAML, or JSON with a .json extension)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Keymap layered over the defaults
    #[arg(short = 'k', long, value_name = "FILE")]
    pub keymap: Option<PathBuf>,

    /// Milliseconds allowed between two steps of a sequence
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Platform `mod` resolves for (macos or other)
    #[arg(short = 'p', long, value_name = "NAME")]
    pub platform: Option<String>,

    /// Print one JSON object per fired command
    #[arg(long)]
    pub json: bool,
}

/// Everything the replay needs, with CLI flags applied over the config file
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub script: PathBuf,
    pub keymap: Option<PathBuf>,
    pub engine: KeytrapConfig,
    pub json: bool,
}

impl CliArgs {
    /// Merge parsed CLI args over the persisted configuration
    pub fn into_config(self, base: KeytrapConfig) -> Result<ReplayConfig, String> {
        let mut engine = base;

        if let Some(ms) = self.timeout_ms {
            if ms == 0 {
                return Err("Sequence timeout must be greater than zero".to_string());
            }
            engine.sequence_timeout_ms = ms;
        }

        if let Some(name) = &self.platform {
            let platform = name
                .parse::<Platform>()
                .map_err(|_| format!("Unknown platform: {}", name))?;
            engine.platform = Some(platform);
        }

        let keymap = self.keymap.or_else(|| engine.keymap.clone());

        Ok(ReplayConfig {
            script: self.script,
            keymap,
            engine,
            json: self.json,
        })
    }
}

impl ReplayConfig {
    pub fn sequence_timeout(&self) -> Duration {
        self.engine.sequence_timeout()
    }
}
