use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::{MemoryEvent, RelationKey, Relationship, World};

/// One relationships.jsonl line: the pair key flattened beside the record.
#[derive(Serialize)]
struct RelationshipRow<'a> {
    #[serde(flatten)]
    key: &'a RelationKey,
    #[serde(flatten)]
    relationship: &'a Relationship,
}

/// One memories.jsonl line. Memories already carry their actor.
#[derive(Serialize)]
struct MemoryRow<'a> {
    seq: usize,
    #[serde(flatten)]
    memory: &'a MemoryEvent,
}

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Flush the world state to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 5 files:
/// - `polities.jsonl`: one polity record per line, in id order
/// - `relationships.jsonl`: one bilateral relationship per line, keyed by `low`/`high`
/// - `world_events.jsonl`: the event log in emission order
/// - `memories.jsonl`: every polity's memories, grouped by polity in id order
/// - `capabilities.jsonl`: every capability instance, captured ones included
pub fn flush_to_jsonl(world: &World, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("polities.jsonl"), world.polities.values())?;
    write_jsonl(
        &output_dir.join("relationships.jsonl"),
        world
            .relationships
            .iter()
            .map(|(key, relationship)| RelationshipRow { key, relationship }),
    )?;
    write_jsonl(&output_dir.join("world_events.jsonl"), world.events.iter())?;
    write_jsonl(
        &output_dir.join("memories.jsonl"),
        world
            .memories
            .values()
            .flat_map(|log: &Vec<MemoryEvent>| log.iter().enumerate())
            .map(|(seq, memory)| MemoryRow { seq, memory }),
    )?;
    write_jsonl(
        &output_dir.join("capabilities.jsonl"),
        world.capabilities.values(),
    )?;

    tracing::debug!(
        dir = %output_dir.display(),
        polities = world.polities.len(),
        events = world.events.len(),
        "world flushed"
    );
    Ok(())
}
