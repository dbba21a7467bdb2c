//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments.

pub mod menu;
pub mod status;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, Settings};
use crate::core::prelude::*;
use crate::daemon;
use crate::dispatch::{Dispatcher, TargetSelector};
use crate::effect::{self, PlatformController};

/// uiviz - Hide and restore the macOS menu bar and Dock.
#[derive(Parser, Debug)]
#[command(name = "uiviz")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the state and lock files.
    #[arg(long, global = true, env = "UIVIZ_STATE_DIR", value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Configuration file to use instead of the default search paths.
    #[arg(long, global = true, env = "UIVIZ_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the reconciliation daemon.
    ///
    /// Hides the configured subsystems, then keeps the desktop in sync with the
    /// state files until interrupted. On Ctrl+C or SIGTERM everything is made
    /// visible again and the state files are removed.
    Daemon,

    /// Toggle the visibility of the menu bar and/or the Dock.
    #[command(after_long_help = r#"Examples:
  uiviz toggle              # Toggle the menu bar and the Dock
  uiviz toggle menu-bar     # Toggle the menu bar only
  uiviz toggle dock         # Toggle Dock auto-hide only
  uiviz toggle menu-alpha   # Toggle menu bar opacity between 0 and 1"#)]
    Toggle {
        /// What to toggle: all, menu-bar, dock or menu-alpha.
        #[arg(default_value = "all")]
        target: ToggleTarget,
    },

    /// Set the state of one subsystem.
    #[command(after_long_help = r#"Examples:
  uiviz set menu-bar hidden
  uiviz set dock visible
  uiviz set menu-alpha 0.4"#)]
    Set {
        /// Subsystem to change: menu-bar, dock or menu-alpha.
        subsystem: Subsystem,

        /// hidden/visible (on/off, 1/0), or an opacity between 0.0 and 1.0.
        value: String,
    },

    /// Show the persisted state of every subsystem.
    Status {
        /// Output in JSON format instead of table format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// List the menu options of the frontmost application.
    List {
        /// Output in JSON format instead of a list.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Open a menu of the frontmost application, even while the menu bar is hidden.
    #[command(after_long_help = r#"Examples:
  uiviz select 3       # Open the fourth menu (see `uiviz list`)
  uiviz select Edit    # Open the menu titled "Edit""#)]
    Select {
        /// Menu index or title.
        target: TargetSelector,
    },

    /// Output uiviz configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// uiviz configuration file.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    ///
    /// Usage:
    ///   eval "$(uiviz completions --shell zsh)"
    ///   uiviz completions --shell fish > ~/.config/fish/completions/uiviz.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

/// Subsystems affected by `toggle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleTarget {
    /// Menu bar and Dock.
    #[default]
    All,
    /// A single subsystem.
    One(Subsystem),
}

impl ToggleTarget {
    /// Subsystems to toggle, in order.
    #[must_use]
    pub fn subsystems(self) -> Vec<Subsystem> {
        match self {
            Self::All => vec![Subsystem::MenuBar, Subsystem::Dock],
            Self::One(subsystem) => vec![subsystem],
        }
    }
}

impl FromStr for ToggleTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Subsystem>().map(Self::One).map_err(|_| {
            format!("Invalid target '{s}'. Expected 'all', 'menu-bar', 'dock' or 'menu-alpha'.")
        })
    }
}

impl fmt::Display for ToggleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::One(subsystem) => write!(f, "{subsystem}"),
        }
    }
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the command fails.
    pub fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Schema => {
                println!("{}", config::print_schema()?);
                return Ok(());
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                return Ok(());
            }
            _ => {}
        }

        let settings = self.settings()?;
        tracing::debug!(state_dir = %settings.state_dir.display(), "settings resolved");
        let controller = effect::platform_controller(&settings.timing);

        match &self.command {
            Commands::Daemon => daemon::run_daemon(&settings, controller)?,
            Commands::Toggle { target } => {
                let changes = Self::dispatcher(&settings, controller).toggle(&target.subsystems())?;
                for change in changes {
                    println!("{change}");
                }
            }
            Commands::Set { subsystem, value } => {
                let value = StateValue::parse_for(subsystem.kind(), value).map_err(Error::config)?;
                let change = Self::dispatcher(&settings, controller).set(*subsystem, value)?;
                println!("{change}");
            }
            Commands::Status { json } => {
                status::execute(&Self::dispatcher(&settings, controller), *json)?;
            }
            Commands::List { json } => {
                menu::list(&Self::dispatcher(&settings, controller), *json)?;
            }
            Commands::Select { target } => {
                menu::select(&mut Self::dispatcher(&settings, controller), target)?;
            }
            Commands::Schema | Commands::Completions { .. } => {}
        }

        Ok(())
    }

    /// Resolves settings from flags, environment and the configuration file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the chosen file cannot be loaded.
    pub fn settings(&self) -> Result<Settings> {
        let config = match &self.config {
            Some(path) => config::load_config_from_path(path),
            None => config::load_config().map(|(config, path)| {
                if let Some(path) = path {
                    tracing::debug!(path = %path.display(), "configuration loaded");
                }
                config
            }),
        }
        .map_err(|err| Error::config(err.to_string()))?;

        Ok(Settings::resolve(&config, self.state_dir.as_deref()))
    }

    fn dispatcher(
        settings: &Settings,
        controller: PlatformController,
    ) -> Dispatcher<PlatformController> {
        Dispatcher::from_settings(settings, controller)
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }
}
