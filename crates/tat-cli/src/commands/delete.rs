//! Delete command for removing a single event from the log.

use std::io::Write;

use anyhow::Result;
use tat_core::{EventId, EventStore, Tracker};

use super::util::recover;

pub fn run<W: Write, S: EventStore>(
    writer: &mut W,
    tracker: &mut Tracker<S>,
    id: i64,
) -> Result<()> {
    let id = EventId::new(id);
    if recover(writer, tracker.delete_record(id))?.is_some() {
        writeln!(writer, "Deleted event {id}.")?;
    }
    Ok(())
}
