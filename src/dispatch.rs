use std::io::Write;

use log::debug;

use crate::config::{Arguments, Command};
use crate::engine::{operations, JsonFileRepository};
use crate::{RecordRepository, Result};

/// Validates `args` and runs the requested operation against the store file,
/// writing the result to `out`.
///
/// Nothing is read or written if validation fails.
pub fn perform<W: Write + ?Sized>(args: &Arguments, out: &mut W) -> Result<()> {
    let config = args.validate()?;
    debug!("Running {} on {:?}", config.command.operation(), config.file_name);

    let mut repo = JsonFileRepository::new(&config.file_name);
    execute(&config.command, &mut repo, out)
}

/// Routes a validated command to its operation.
pub fn execute<R, W>(command: &Command, repo: &mut R, out: &mut W) -> Result<()>
where
    R: RecordRepository + ?Sized,
    W: Write + ?Sized,
{
    match command {
        Command::Add { item } => operations::add(repo, item, out),
        Command::List => operations::list(repo, out),
        Command::Remove { id } => operations::remove(repo, id, out),
        Command::FindById { id } => operations::find_by_id(repo, id, out),
    }
}
