//! JSON snapshot of a whole ranker: entities, ledger, avoid-set and config.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use tracing::info;

use crate::ranker::AdaptiveRanker;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AdaptiveRanker {
    pub fn write_snapshot<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = writer;
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_snapshot<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        self.write_snapshot(BufWriter::new(File::create(path)?))?;
        info!(
            path = %path.display(),
            entities = self.len(),
            comparisons = self.ledger().len(),
            "saved ranker snapshot"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let ranker = Self::read_snapshot(BufReader::new(File::open(path)?))?;
        info!(
            path = %path.display(),
            entities = ranker.len(),
            comparisons = ranker.ledger().len(),
            "loaded ranker snapshot"
        );
        Ok(ranker)
    }
}
