use anyhow::{Context, Result};
use clap::Parser;

use keytrap::cli::CliArgs;
use keytrap::config::KeytrapConfig;
use keytrap::keymap::{load_default_keymap, load_keymap_file, merge_keymaps};
use keytrap::replay::{load_script, replay};

fn main() -> Result<()> {
    keytrap::tracing::init();

    let args = CliArgs::parse();
    let config = args
        .into_config(KeytrapConfig::load())
        .map_err(anyhow::Error::msg)?;
    let platform = config.engine.platform();

    let mut keymap = load_default_keymap(platform);
    if let Some(path) = &config.keymap {
        let extra = load_keymap_file(path, platform)
            .with_context(|| format!("Failed to load keymap {}", path.display()))?;
        keymap = merge_keymaps(keymap, extra);
    }

    let script = load_script(&config.script)
        .with_context(|| format!("Failed to load script {}", config.script.display()))?;
    tracing::info!(
        events = script.events.len(),
        bindings = keymap.len(),
        "replaying script"
    );

    let fired = replay(&script, &keymap, &config.engine).context("Replay failed")?;

    for record in &fired {
        if config.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            let flag = if record.suppressed { "suppressed" } else { "" };
            println!(
                "{:>6} ms  {:<20} {:<24} {}",
                record.at_ms, record.command, record.pattern, flag
            );
        }
    }

    if !config.json && fired.is_empty() {
        eprintln!("No commands fired");
    }

    Ok(())
}
