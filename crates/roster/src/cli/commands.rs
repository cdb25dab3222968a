//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::BackendKind;
use crate::controller::{Intent, ViewController};
use crate::error::Result;
use crate::record::{Candidate, Record, RecordRef};

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Display name
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Email address
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Age in whole years
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub age: String,
}

impl AddCommand {
    /// The form values given on the command line.
    #[must_use]
    pub fn candidate(&self) -> Candidate {
        Candidate::new(&self.name, &self.email, &self.age)
    }
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Row number or `id:<identifier>`
    pub target: RecordRef,

    /// New display name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// New age
    #[arg(short, long, allow_hyphen_values = true)]
    pub age: Option<String>,
}

impl EditCommand {
    /// Overlay the given fields on the record's current values.
    #[must_use]
    pub fn apply(&self, current: &Candidate) -> Candidate {
        Candidate {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            email: self.email.clone().unwrap_or_else(|| current.email.clone()),
            age: self.age.clone().unwrap_or_else(|| current.age.clone()),
        }
    }

    /// Edit the target through the controller's form and submit it.
    ///
    /// Returns the record as the store holds it afterwards, looked up by
    /// identifier since a reload may have moved it. `None` means the edit was
    /// accepted but the record has since been removed elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the target does not resolve, or
    /// the validation or backend error from the submit.
    pub async fn run(&self, controller: &mut ViewController) -> Result<Option<Record>> {
        let index = controller.store().index_of(&self.target)?;
        let id = controller.records()[index].id.clone();

        controller.handle(Intent::Edit(index)).await?;
        let candidate = self.apply(controller.form());
        controller.handle(Intent::Submit(candidate)).await?;

        Ok(controller.store().get(&RecordRef::Id(id)).ok().cloned())
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Row number or `id:<identifier>`
    pub target: RecordRef,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Backend selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Records live only for this process
    Memory,
    /// Local database file
    Sqlite,
    /// Remote record server
    Remote,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => Self::Memory,
            BackendArg::Sqlite => Self::Sqlite,
            BackendArg::Remote => Self::Remote,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}
