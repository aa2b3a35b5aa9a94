//! The `prism key` command and the config-file credential store.

use super::theme;
use clap::{Args, Subcommand};
use console::Style;
use dialoguer::{Password, Select};
use prism_core::config::ServiceConfig;
use prism_core::{Config, Credential, CredentialStore};
use std::io;
use std::path::{Path, PathBuf};

/// Arguments for the `key` command.
#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Save an API key to the config file (prompts when KEY is omitted)
    Set {
        /// The fal.ai API key
        key: Option<String>,
    },

    /// Remove the saved API key
    Clear,

    /// Show whether an API key is available
    Status,
}

/// Credential store backed by `[service] api_key` in the config file.
///
/// Edits go through `toml_edit` so comments and layout survive. With no key
/// saved, the config default `${FAL_KEY}` applies.
pub struct ConfigFileCredentialStore {
    path: PathBuf,
}

impl ConfigFileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> io::Result<toml_edit::DocumentMut> {
        let content = if self.path.exists() {
            std::fs::read_to_string(&self.path)?
        } else {
            String::new()
        };
        content
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{e}")))
    }

    fn write_document(&self, doc: &toml_edit::DocumentMut) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, doc.to_string())
    }

    /// The `[service]` section as configured, or defaults.
    fn service_config(&self) -> ServiceConfig {
        if !self.path.exists() {
            return ServiceConfig::default();
        }
        match Config::load_from(&self.path) {
            Ok(config) => config.service,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {:?}: {e}", self.path);
                ServiceConfig::default()
            }
        }
    }

    /// Where the current key comes from, for `prism key status`.
    pub fn source(&self) -> KeySource {
        let service = self.service_config();
        if let Some(var) = service
            .api_key
            .strip_prefix("${")
            .and_then(|s| s.strip_suffix('}'))
        {
            KeySource::Env(var.to_string())
        } else {
            KeySource::ConfigFile
        }
    }
}

/// Origin of the configured API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Env(String),
    ConfigFile,
}

impl CredentialStore for ConfigFileCredentialStore {
    fn get(&self) -> Option<Credential> {
        Credential::from_config(&self.service_config())
    }

    fn set(&self, credential: Credential) -> io::Result<()> {
        let mut doc = self.read_document()?;
        if !doc.contains_key("service") {
            doc["service"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        doc["service"]["api_key"] = toml_edit::value(credential.expose());
        self.write_document(&doc)?;
        tracing::debug!("Saved API key to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut doc = self.read_document()?;
        let removed = doc
            .get_mut("service")
            .and_then(|item| item.as_table_like_mut())
            .and_then(|service| service.remove("api_key"))
            .is_some();
        if removed {
            self.write_document(&doc)?;
        }
        Ok(())
    }
}

/// Prompt for a key on the terminal. `None` when the user enters nothing.
pub fn prompt_for_key() -> anyhow::Result<Option<Credential>> {
    let key: String = Password::with_theme(&theme::prism_theme())
        .with_prompt("Enter your fal.ai API key")
        .allow_empty_password(true)
        .interact()?;
    Ok(Credential::new(key))
}

/// Prompt for a key, then offer to save it to the config file.
///
/// `None` when the user enters nothing. Declining to save, or a failed
/// save, still returns the key for this run.
pub fn prompt_and_offer_save(
    store: &ConfigFileCredentialStore,
) -> anyhow::Result<Option<Credential>> {
    let Some(credential) = prompt_for_key()? else {
        return Ok(None);
    };

    let save_options = &["Yes, save to config file", "No, use for this run only"];
    let choice = Select::with_theme(&theme::prism_theme())
        .with_prompt("Save this key for future runs?")
        .items(save_options)
        .default(0)
        .interact_opt()?;
    if choice == Some(0) {
        save_entered_key(store, &credential);
    }
    Ok(Some(credential))
}

/// Persist a key typed at the prompt. Returns whether it was written.
fn save_entered_key(store: &ConfigFileCredentialStore, credential: &Credential) -> bool {
    match store.set(credential.clone()) {
        Ok(()) => {
            eprintln!(
                "{} API key saved to {}",
                Style::new().for_stderr().green().apply_to("✓"),
                store.path().display()
            );
            true
        }
        Err(e) => {
            let warn = Style::new().for_stderr().yellow();
            eprintln!("  {}", warn.apply_to(format!("Could not save to config: {e}")));
            eprintln!("  Using key for this run only.");
            false
        }
    }
}

/// Execute the key command.
pub async fn execute(args: KeyArgs) -> anyhow::Result<()> {
    let store = ConfigFileCredentialStore::new(Config::default_path());
    let green = Style::new().for_stderr().green();
    let dim = Style::new().for_stderr().dim();
    let warn = Style::new().for_stderr().yellow();

    match args.command {
        KeyCommand::Set { key } => {
            let credential = match key {
                Some(key) => Credential::new(key),
                None => prompt_for_key()?,
            };
            let Some(credential) = credential else {
                anyhow::bail!("API key cannot be empty");
            };
            store.set(credential)?;
            eprintln!(
                "{} API key saved to {}",
                green.apply_to("✓"),
                store.path().display()
            );
        }

        KeyCommand::Clear => {
            store.clear()?;
            eprintln!("{} Saved API key removed", green.apply_to("✓"));
            if let Some(credential) = store.get() {
                eprintln!(
                    "  {}",
                    dim.apply_to(format!("An environment key is still in effect ({credential:?})"))
                );
            }
        }

        KeyCommand::Status => match (store.get(), store.source()) {
            (Some(credential), KeySource::Env(var)) => {
                eprintln!("{} API key from ${var} ({credential:?})", green.apply_to("✓"));
            }
            (Some(credential), KeySource::ConfigFile) => {
                eprintln!(
                    "{} API key from {} ({credential:?})",
                    green.apply_to("✓"),
                    store.path().display()
                );
            }
            (None, _) => {
                eprintln!("{} No API key configured", warn.apply_to("!"));
                eprintln!(
                    "  {}",
                    dim.apply_to("Run `prism key set` or export FAL_KEY.")
                );
            }
        },
    }

    Ok(())
}
