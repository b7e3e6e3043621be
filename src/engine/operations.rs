//! The four store operations.
//!
//! Each operation reads the whole store from a [`RecordRepository`], writes its
//! result to `out` and, for a successful mutation, rewrites the whole store.

use std::io::Write;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::{Record, RecordRepository, Result};

/// Copies the raw store content to `out` without decoding it.
pub fn list<R, W>(repo: &R, out: &mut W) -> Result<()>
where
    R: RecordRepository + ?Sized,
    W: Write + ?Sized,
{
    let bytes = repo.read()?;
    out.write_all(&bytes)?;
    Ok(())
}

/// Appends the record described by `item` unless its id is already taken.
///
/// A malformed `item` is not an error: fields that cannot be decoded are left
/// at their zero value.
pub fn add<R, W>(repo: &mut R, item: &str, out: &mut W) -> Result<()>
where
    R: RecordRepository + ?Sized,
    W: Write + ?Sized,
{
    let mut records = repo.load_or_default()?;
    let new_record = parse_item(item);

    if records.iter().any(|r| r.id == new_record.id) {
        warn!("Record {} already present, store left untouched", new_record.id);
        write!(out, "Item with id {} already exists", new_record.id)?;
        return Ok(());
    }

    info!("Adding record {}", new_record.id);
    records.push(new_record);
    let bytes = repo.save(&records)?;
    out.write_all(&bytes)?;
    Ok(())
}

/// Drops every record with the given id, keeping the others in order.
pub fn remove<R, W>(repo: &mut R, id: &str, out: &mut W) -> Result<()>
where
    R: RecordRepository + ?Sized,
    W: Write + ?Sized,
{
    let records = repo.load()?;
    let before = records.len();
    let kept: Vec<Record> = records.into_iter().filter(|r| r.id != id).collect();

    if kept.len() == before {
        warn!("Record {} not found, store left untouched", id);
        write!(out, "Item with id {} not found", id)?;
        return Ok(());
    }

    info!("Removed {} record(s) with id {}", before - kept.len(), id);
    let bytes = repo.save(&kept)?;
    out.write_all(&bytes)?;
    Ok(())
}

/// Writes the record with the given id, or nothing if there is none.
/// With duplicate ids the last one in the store wins.
pub fn find_by_id<R, W>(repo: &R, id: &str, out: &mut W) -> Result<()>
where
    R: RecordRepository + ?Sized,
    W: Write + ?Sized,
{
    let records = repo.load()?;
    match records.iter().rev().find(|r| r.id == id) {
        Some(record) => {
            let bytes = serde_json::to_vec(record)?;
            out.write_all(&bytes)?;
        }
        None => debug!("No record with id {}", id),
    }
    Ok(())
}

/// Decodes `item` the forgiving way: keys match field names without regard
/// to case, and a field holding the wrong JSON type is left at its zero value
/// while the other fields are kept. Text that is not a JSON object decodes to
/// an empty record.
fn parse_item(item: &str) -> Record {
    let value: Value = match serde_json::from_str(item) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not parse item {:?}: {}, using an empty record", item, e);
            return Record::default();
        }
    };
    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return Record::default(),
        other => {
            warn!("Item {} is not an object, using an empty record", other);
            return Record::default();
        }
    };

    let mut record = Record::default();
    if let Some(v) = item_field(&fields, "id") {
        match v.as_str() {
            Some(id) => record.id = id.to_string(),
            None => warn!("Ignoring item id {}: not a string", v),
        }
    }
    if let Some(v) = item_field(&fields, "email") {
        match v.as_str() {
            Some(email) => record.email = email.to_string(),
            None => warn!("Ignoring item email {}: not a string", v),
        }
    }
    if let Some(v) = item_field(&fields, "age") {
        match v.as_i64() {
            Some(age) => record.age = age,
            None => warn!("Ignoring item age {}: not an integer", v),
        }
    }
    record
}

/// Looks a field up by exact name first, then case-insensitively.
/// `null` counts as absent.
fn item_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields
        .get(name)
        .or_else(|| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .filter(|v| !v.is_null())
}
