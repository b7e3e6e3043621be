use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

/// Environment variable consulted when no store file is given on the command line.
pub const FILE_NAME_ENV: &str = "USER_RECORDS_FILE";

/// The unit of work of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    List,
    Remove,
    FindById,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::List,
        Operation::Remove,
        Operation::FindById,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::List => "list",
            Operation::Remove => "remove",
            Operation::FindById => "findById",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

/// Argument values as they come off the command line. Empty means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    pub operation: String,
    pub file_name: String,
    pub item: String,
    pub id: String,
}

impl Arguments {
    /// Builds arguments from a `name -> value` map using the flag names
    /// `operation`, `fileName`, `item` and `id`. Absent names are empty.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |name: &str| map.get(name).cloned().unwrap_or_default();
        Self {
            operation: get("operation"),
            file_name: get("fileName"),
            item: get("item"),
            id: get("id"),
        }
    }

    /// Fills an empty `file_name` from [`FILE_NAME_ENV`].
    pub fn with_env_fallback(mut self) -> Self {
        if self.file_name.is_empty() {
            if let Ok(file_name) = std::env::var(FILE_NAME_ENV) {
                self.file_name = file_name;
            }
        }
        self
    }

    /// Checks that every argument the operation needs is present.
    ///
    /// Checks run in a fixed order (operation, file name, then the
    /// operation-specific argument) and the first failure is returned.
    pub fn validate(&self) -> Result<Config> {
        if self.operation.is_empty() {
            return Err(Error::MissingOperation);
        }
        let operation: Operation = self.operation.parse()?;
        if self.file_name.is_empty() {
            return Err(Error::MissingFileName);
        }

        let command = match operation {
            Operation::Add => {
                if self.item.is_empty() {
                    return Err(Error::MissingItem);
                }
                Command::Add { item: self.item.clone() }
            }
            Operation::List => Command::List,
            Operation::Remove | Operation::FindById => {
                if self.id.is_empty() {
                    return Err(Error::MissingId);
                }
                let id = self.id.clone();
                if operation == Operation::Remove {
                    Command::Remove { id }
                } else {
                    Command::FindById { id }
                }
            }
        };

        Ok(Config {
            file_name: PathBuf::from(&self.file_name),
            command,
        })
    }
}

/// A validated operation together with the arguments it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `item` is the raw JSON text of the record to add.
    Add { item: String },
    List,
    Remove { id: String },
    FindById { id: String },
}

impl Command {
    pub fn operation(&self) -> Operation {
        match self {
            Command::Add { .. } => Operation::Add,
            Command::List => Operation::List,
            Command::Remove { .. } => Operation::Remove,
            Command::FindById { .. } => Operation::FindById,
        }
    }
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file_name: PathBuf,
    pub command: Command,
}
