use std::ffi::OsString;
use std::io::{self, Write};

use clap::Parser;
use user_records::config::Arguments;
use user_records::dispatch;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// One of add, list, remove, findById
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    operation: String,

    /// Path to the JSON store file (falls back to USER_RECORDS_FILE)
    #[arg(long = "fileName", default_value = "", allow_hyphen_values = true)]
    file_name: String,

    /// JSON-encoded record, used by add
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    item: String,

    /// Record id, used by remove and findById
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    id: String,
}

impl From<Cli> for Arguments {
    fn from(cli: Cli) -> Self {
        Arguments {
            operation: cli.operation,
            file_name: cli.file_name,
            item: cli.item,
            id: cli.id,
        }
    }
}

const LONG_FLAGS: [&str; 6] = ["operation", "fileName", "item", "id", "help", "version"];
const VALUE_FLAGS: [&str; 4] = ["operation", "fileName", "item", "id"];

/// Splits `-name`, `--name` or `-name=value` into the flag name and whether the
/// value is inline. Only names this binary knows are recognized.
fn long_flag(arg: &str) -> Option<(&str, bool)> {
    let flag = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    let (name, inline) = match flag.split_once('=') {
        Some((name, _)) => (name, true),
        None => (flag, false),
    };
    LONG_FLAGS.contains(&name).then_some((name, inline))
}

/// Rewrites single-dash long flags (`-operation`, `-fileName=x`) to their
/// double-dash form so both spellings are accepted. The argument following a
/// value flag is its value and is passed through untouched.
fn normalize_flags<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut normalized = Vec::new();
    let mut value_next = false;

    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || value_next {
            value_next = false;
            normalized.push(arg);
            continue;
        }

        let mut rewritten = None;
        if let Some(s) = arg.to_str() {
            if let Some((name, inline)) = long_flag(s) {
                value_next = !inline && VALUE_FLAGS.contains(&name);
                if !s.starts_with("--") {
                    rewritten = Some(OsString::from(format!("-{}", s)));
                }
            }
        }
        normalized.push(rewritten.unwrap_or(arg));
    }
    normalized
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse_from(normalize_flags(std::env::args_os()));
    let args = Arguments::from(cli).with_env_fallback();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    dispatch::perform(&args, &mut out)?;
    out.flush()?;

    Ok(())
}
