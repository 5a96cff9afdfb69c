use std::{fmt, time::Duration};

use clap::Parser;
use engine::UpdatePolicy;
use serde::Deserialize;

use crate::{
    commands::Command,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/isometric.toml";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub level: String,
    /// Re-render kept rows on every pass instead of leaving them as created.
    pub live_updates: bool,
    /// Budget to watch; the budget list when unset.
    pub budget: Option<i64>,
    /// Create the account instead of logging in.
    pub register: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api/".to_string(),
            username: String::new(),
            password: String::new(),
            poll_interval_ms: 5000,
            request_timeout_ms: 10_000,
            level: "info".to_string(),
            live_updates: false,
            budget: None,
            register: false,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("level", &self.level)
            .field("live_updates", &self.live_updates)
            .field("budget", &self.budget)
            .field("register", &self.register)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        if self.live_updates {
            UpdatePolicy::Always
        } else {
            UpdatePolicy::Skip
        }
    }

    fn validate(self) -> Result<Self> {
        if self.username.trim().is_empty() {
            return Err(AppError::Usage(
                "username is required (config file, ISOMETRIC_USERNAME or --username)".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(AppError::Usage(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Usage(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "isometric",
    about = "Watch budgets as they change on the server, or edit them"
)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:5000/api/).
    #[arg(long)]
    base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    username: Option<String>,
    /// Watch this budget instead of the budget list.
    #[arg(long)]
    budget: Option<i64>,
    /// Override poll period in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long)]
    level: Option<String>,
    /// Apply server-side edits to rows that are already shown.
    #[arg(long)]
    live_updates: bool,
    /// Register a new account before watching.
    #[arg(long)]
    register: bool,
    /// Run one edit and exit instead of watching.
    #[command(subcommand)]
    command: Option<Command>,
}

pub fn load() -> Result<(Settings, Option<Command>)> {
    let mut args = Args::parse();
    let command = args.command.take();
    Ok((resolve(args)?, command))
}

fn resolve(args: Args) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("ISOMETRIC"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(budget) = args.budget {
        settings.budget = Some(budget);
    }
    if let Some(poll_interval_ms) = args.poll_interval_ms {
        settings.poll_interval_ms = poll_interval_ms;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }
    settings.live_updates |= args.live_updates;
    settings.register |= args.register;

    settings.validate()
}
