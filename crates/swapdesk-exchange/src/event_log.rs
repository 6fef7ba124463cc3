//! Append-only, hash-chained event log.
//!
//! ```text
//! record[0].prev_hash = 0x00..00
//! record[n].prev_hash = record[n-1].hash
//! record[n].hash      = SHA-256(domain || prev_hash || n || tag || fields)
//! ```

use chrono::{DateTime, Utc};
use swapdesk_types::{EventRecord, ExchangeEvent, Result, SwapdeskError};
use tracing::debug;

/// Hash carried by the first record.
pub const GENESIS_HASH: [u8; 32] = [0u8; 32];

#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_sequence: u64,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain `event` onto the log and return the stored record.
    pub fn append(&mut self, event: ExchangeEvent, recorded_at: DateTime<Utc>) -> &EventRecord {
        let sequence = self.next_sequence;
        let record = EventRecord::chained(sequence, self.head_hash(), event, recorded_at);
        debug!(sequence, event = record.event.name(), hash = %record.hash_hex(), "Event appended");
        self.next_sequence += 1;
        let index = self.records.len();
        self.records.push(record);
        &self.records[index]
    }

    /// Hash of the newest record, or [`GENESIS_HASH`].
    #[must_use]
    pub fn head_hash(&self) -> [u8; 32] {
        self.records.last().map_or(GENESIS_HASH, |r| r.hash)
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    #[must_use]
    pub fn last(&self) -> Option<&ExchangeEvent> {
        self.records.last().map(|r| &r.event)
    }

    /// Events in append order, without their chain metadata.
    pub fn events(&self) -> impl Iterator<Item = &ExchangeEvent> {
        self.records.iter().map(|r| &r.event)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recompute every link of the chain.
    ///
    /// # Errors
    /// Returns `Internal` naming the first record whose sequence, link or
    /// digest does not match.
    pub fn verify_chain(&self) -> Result<()> {
        verify_records(&self.records)
    }

    /// One JSON object per line, in append order.
    ///
    /// # Errors
    /// Returns `Serialization` if a record cannot be encoded.
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Check a standalone slice of records, e.g. one read back from an export.
///
/// # Errors
/// See [`EventLog::verify_chain`].
pub fn verify_records(records: &[EventRecord]) -> Result<()> {
    let mut prev = GENESIS_HASH;
    for (index, record) in (0u64..).zip(records) {
        if record.sequence != index {
            return Err(SwapdeskError::Internal(format!(
                "event {index}: sequence {} out of place",
                record.sequence
            )));
        }
        if record.prev_hash != prev {
            return Err(SwapdeskError::Internal(format!(
                "event {index}: broken link to predecessor"
            )));
        }
        if !record.is_intact() {
            return Err(SwapdeskError::Internal(format!(
                "event {index}: digest mismatch"
            )));
        }
        prev = record.hash;
    }
    Ok(())
}
