use scene::{AnnotationKind, GroupId};
use serde::Serialize;

use crate::error::MeasureError;
use crate::measurement::Measurement;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    /// Commit order; kept when the record is updated.
    pub seq: u64,
    pub group: GroupId,
    pub kind: AnnotationKind,
    pub summary: String,
    pub measurement: Measurement,
}

/// One record per committed annotation, in commit order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeasurementLog {
    next_seq: u64,
    records: Vec<MeasurementRecord>,
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `group`. Returns `true` if the
    /// group was new.
    pub fn upsert(
        &mut self,
        group: GroupId,
        kind: AnnotationKind,
        measurement: Measurement,
        summary: String,
    ) -> bool {
        if let Some(record) = self.records.iter_mut().find(|r| r.group == group) {
            record.kind = kind;
            record.measurement = measurement;
            record.summary = summary;
            return false;
        }
        self.next_seq += 1;
        self.records.push(MeasurementRecord {
            seq: self.next_seq,
            group,
            kind,
            summary,
            measurement,
        });
        true
    }

    pub fn get(&self, group: GroupId) -> Option<&MeasurementRecord> {
        self.records.iter().find(|r| r.group == group)
    }

    pub fn remove(&mut self, group: GroupId) -> Option<MeasurementRecord> {
        let idx = self.records.iter().position(|r| r.group == group)?;
        Some(self.records.remove(idx))
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn to_json(&self) -> Result<String, MeasureError> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}
