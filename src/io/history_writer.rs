// Copyright @yucwang 2026

use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;

use thiserror::Error;

use crate::core::history::TrackHistory;

#[derive(Debug, Error)]
pub enum HistoryWriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordMode {
    All,
    DetectedOnly,
}

impl RecordMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "all" => Some(RecordMode::All),
            "detected" => Some(RecordMode::DetectedOnly),
            _ => None,
        }
    }
}

pub struct HistoryWriter<W: Write> {
    out: W,
    mode: RecordMode,
    written: usize,
}

impl HistoryWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P, mode: RecordMode) -> Result<Self, HistoryWriteError> {
        Ok(Self::new(BufWriter::new(File::create(path)?), mode))
    }
}

impl<W: Write> HistoryWriter<W> {
    pub fn new(out: W, mode: RecordMode) -> Self {
        Self { out, mode, written: 0 }
    }

    pub fn write_history(&mut self, history: &TrackHistory) -> Result<(), HistoryWriteError> {
        let records = match self.mode {
            RecordMode::DetectedOnly if !history.is_detected() => history.emission().map(std::slice::from_ref).unwrap_or(&[]),
            _ => &history.records[..],
        };
        for record in records {
            serde_json::to_writer(&mut self.out, record)?;
            self.out.write_all(b"\n")?;
            self.written += 1;
        }
        Ok(())
    }

    pub fn write_all(&mut self, histories: &[TrackHistory]) -> Result<(), HistoryWriteError> {
        for history in histories {
            self.write_history(history)?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }
}
