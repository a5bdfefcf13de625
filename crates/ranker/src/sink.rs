//! Write-only destinations for per-entity rating records.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::{EntityId, ranker::Entity};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write ratings: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// The `(id, rating, rd, num_comparisons)` tuple a sink receives, plus the display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub rating: f64,
    pub rd: f64,
    pub num_comparisons: u64,
}

impl RatingRecord {
    pub fn from_entity(id: EntityId, entity: &Entity) -> Self {
        Self {
            id,
            name: entity.name.clone(),
            rating: entity.model.rating(),
            rd: entity.model.rd(),
            num_comparisons: entity.model.num_comparisons(),
        }
    }
}

pub trait RatingsSink {
    fn write_record(&mut self, record: &RatingRecord) -> Result<(), Error>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Tab separated `id name rating rd num_comparisons` lines. Unnamed entities get an empty name.
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RatingsSink for TextSink<W> {
    fn write_record(&mut self, record: &RatingRecord) -> Result<(), Error> {
        writeln!(
            self.writer,
            "{}\t{}\t{:.4}\t{:.4}\t{}",
            record.id,
            record.name.as_deref().unwrap_or_default(),
            record.rating,
            record.rd,
            record.num_comparisons
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        Ok(self.writer.flush()?)
    }
}

/// One JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RatingsSink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &RatingRecord) -> Result<(), Error> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        Ok(self.writer.flush()?)
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<RatingRecord>,
    finished: bool,
}

impl MemorySink {
    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RatingsSink for MemorySink {
    fn write_record(&mut self, record: &RatingRecord) -> Result<(), Error> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: EntityId, name: Option<&str>) -> RatingRecord {
        RatingRecord {
            id,
            name: name.map(str::to_string),
            rating: 12.5,
            rd: 80.25,
            num_comparisons: 3,
        }
    }

    #[test]
    fn text_sink_writes_tab_separated_lines() {
        let mut sink = TextSink::new(Vec::new());
        sink.write_record(&record(0, Some("apple"))).unwrap();
        sink.write_record(&record(1, None)).unwrap();
        sink.finish().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "0\tapple\t12.5000\t80.2500\t3\n1\t\t12.5000\t80.2500\t3\n");
    }

    #[test]
    fn json_lines_sink_writes_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_record(&record(4, Some("kiwi"))).unwrap();
        sink.write_record(&record(5, None)).unwrap();
        sink.finish().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: RatingRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, record(4, Some("kiwi")));
        assert!(!lines[1].contains("name"));
        let second: RatingRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.name, None);
    }

    #[test]
    fn failing_writer_surfaces_io_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = TextSink::new(Broken);
        let err = sink.write_record(&record(0, None)).unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("disk on fire"));
    }
}
