use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::PresenceApp;
use crate::config::{SessionConfig, TimestampMode};
use crate::discord::DiscordConnector;
use crate::error::{Error, Result};
use crate::settings::AppPaths;

#[derive(Parser, Debug)]
#[command(name = "digirp")]
#[command(about = "Discord Rich Presence manager with named presets")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding presets, the last session and logs
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect, publish the presence and keep it up until interrupted
    Run {
        /// Start from a stored preset
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Inspect or edit the last-session config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage named presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config as JSON
    Show,
    /// Change individual fields
    Set(FieldArgs),
    /// Empty every text field except the client id
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum PresetAction {
    /// List preset names
    List,
    /// Print a preset as JSON
    Show { name: String },
    /// Store the last-session config, with any field flags applied, as a preset
    Save {
        name: String,

        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Copy a preset into the last-session config
    Load { name: String },
    /// Delete a preset
    Delete { name: String },
    /// Write a preset to a standalone JSON file
    Export { name: String, path: PathBuf },
    /// Read a standalone JSON file into a preset
    Import { name: String, path: PathBuf },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimestampArg {
    Elapsed,
    Remaining,
    Off,
}

/// Field overrides shared by every command that edits a config
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Discord application id
    #[arg(long)]
    pub client_id: Option<String>,
    /// First presence line
    #[arg(long)]
    pub details: Option<String>,
    /// Second presence line
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long, value_name = "KEY")]
    pub large_image: Option<String>,
    #[arg(long, value_name = "TEXT")]
    pub large_text: Option<String>,
    #[arg(long, value_name = "KEY")]
    pub small_image: Option<String>,
    #[arg(long, value_name = "TEXT")]
    pub small_text: Option<String>,
    #[arg(long)]
    pub button1_label: Option<String>,
    #[arg(long)]
    pub button1_url: Option<String>,
    #[arg(long)]
    pub button2_label: Option<String>,
    #[arg(long)]
    pub button2_url: Option<String>,
    /// Current party size
    #[arg(long)]
    pub party_size: Option<String>,
    /// Maximum party size
    #[arg(long)]
    pub party_max: Option<String>,
    #[arg(long, value_enum)]
    pub timestamp: Option<TimestampArg>,
}

impl FieldArgs {
    pub fn is_empty(&self) -> bool {
        [
            &self.client_id,
            &self.details,
            &self.state,
            &self.large_image,
            &self.large_text,
            &self.small_image,
            &self.small_text,
            &self.button1_label,
            &self.button1_url,
            &self.button2_label,
            &self.button2_url,
            &self.party_size,
            &self.party_max,
        ]
        .iter()
        .all(|value| value.is_none())
            && self.timestamp.is_none()
    }

    pub fn apply(&self, config: &mut SessionConfig) {
        let fields = [
            (&self.client_id, &mut config.client_id),
            (&self.details, &mut config.details),
            (&self.state, &mut config.state),
            (&self.large_image, &mut config.large_image_key),
            (&self.large_text, &mut config.large_text),
            (&self.small_image, &mut config.small_image_key),
            (&self.small_text, &mut config.small_text),
            (&self.button1_label, &mut config.button1_label),
            (&self.button1_url, &mut config.button1_url),
            (&self.button2_label, &mut config.button2_label),
            (&self.button2_url, &mut config.button2_url),
            (&self.party_size, &mut config.party_size),
            (&self.party_max, &mut config.party_max),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }

        match self.timestamp {
            Some(TimestampArg::Elapsed) => {
                config.show_timestamp = true;
                config.timestamp_mode = TimestampMode::Elapsed;
            }
            Some(TimestampArg::Remaining) => {
                config.show_timestamp = true;
                config.timestamp_mode = TimestampMode::Remaining;
            }
            Some(TimestampArg::Off) => config.show_timestamp = false,
            None => {}
        }
    }
}

pub async fn execute(cli: Cli, paths: AppPaths) -> Result<()> {
    paths.ensure_data_dir()?;
    let mut app = PresenceApp::new(paths, Arc::new(DiscordConnector::new()));

    match cli.command {
        Command::Run { preset, fields } => {
            if let Some(name) = preset {
                app.load_preset(&name)?;
            }
            fields.apply(app.config_mut());
            run(&mut app).await
        }
        Command::Config { action } => config_command(&mut app, action),
        Command::Preset { action } => preset_command(&mut app, action),
    }
}

async fn run(app: &mut PresenceApp) -> Result<()> {
    let mut status = app.subscribe();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            tracing::info!(state = ?current.state, error = ?current.last_error, "Presence status changed");
        }
    });

    if let Err(e) = app.connect().await {
        if !app.is_connected() {
            return Err(e);
        }
        eprintln!("{}", e);
    }

    println!("Rich Presence is live. Commands: update, status, quit (Ctrl-C also stops).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if handle_line(app, &line).await == LineAction::Stop {
                        break;
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("Stopped reading stdin: {}", e);
                    stdin_open = false;
                }
            },
        }
    }

    app.disconnect().await;
    println!("Rich Presence has been stopped.");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAction {
    Continue,
    Stop,
}

/// Runs one stdin command. Failures are reported, never propagated, so the
/// caller always reaches its disconnect.
async fn handle_line(app: &mut PresenceApp, line: &str) -> LineAction {
    match line.trim() {
        "update" => {
            if !app.reload_config() {
                tracing::debug!("No last-session config on disk, pushing current fields");
            }
            match app.update().await {
                Ok(()) => println!("Presence updated."),
                Err(e) => eprintln!("{}", e),
            }
        }
        "status" => match serde_json::to_string(&app.status()) {
            Ok(status) => println!("{}", status),
            Err(e) => eprintln!("Failed to render status: {}", e),
        },
        "quit" | "exit" | "disconnect" => return LineAction::Stop,
        "" => {}
        other => eprintln!("Unknown command: {}", other),
    }
    LineAction::Continue
}

fn config_command(app: &mut PresenceApp, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(app.config())?);
        }
        ConfigAction::Set(fields) => {
            if fields.is_empty() {
                return Err(Error::validation("No fields given to set."));
            }
            fields.apply(app.config_mut());
            app.persist_config()?;
        }
        ConfigAction::Clear => {
            app.clear();
            app.persist_config()?;
        }
    }
    Ok(())
}

fn preset_command(app: &mut PresenceApp, action: PresetAction) -> Result<()> {
    match action {
        PresetAction::List => {
            if app.presets().is_empty() {
                println!("No presets saved.");
            }
            for name in app.presets().names() {
                println!("{}", name);
            }
        }
        PresetAction::Show { name } => {
            let config = app
                .presets()
                .get(&name)
                .ok_or_else(|| Error::validation(format!("No preset named '{}'", name.trim())))?;
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        PresetAction::Save { name, fields } => {
            fields.apply(app.config_mut());
            app.save_preset(&name)?;
            println!("Preset '{}' saved.", name.trim());
        }
        PresetAction::Load { name } => {
            app.load_preset(&name)?;
            app.persist_config()?;
            println!("Preset '{}' loaded.", name.trim());
        }
        PresetAction::Delete { name } => {
            if !app.presets_mut().remove(&name)? {
                return Err(Error::validation(format!(
                    "No preset named '{}'",
                    name.trim()
                )));
            }
            println!("Preset '{}' deleted.", name.trim());
        }
        PresetAction::Export { name, path } => {
            app.presets().export(&name, &path)?;
            println!("Preset '{}' exported to {}.", name.trim(), path.display());
        }
        PresetAction::Import { name, path } => {
            app.presets_mut().import(&name, &path)?;
            println!("Preset '{}' imported.", name.trim());
        }
    }
    Ok(())
}
