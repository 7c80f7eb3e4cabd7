use scene::{AnnotationKind, EntityId, GroupId};
use serde::Serialize;

use crate::geometry::TerrainProfile;
use crate::measurement::Measurement;
use crate::modes::Tool;

/// Notifications for the host UI (log panel, profile chart, label editor).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeasureEvent {
    ToolActivated {
        tool: Tool,
    },
    ToolDeactivated {
        tool: Tool,
    },
    AnnotationCommitted {
        group: GroupId,
        kind: AnnotationKind,
        measurement: Measurement,
        summary: String,
    },
    /// A committed annotation changed (vertex dragged, deleted or appended).
    AnnotationUpdated {
        group: GroupId,
        kind: AnnotationKind,
        measurement: Measurement,
        summary: String,
    },
    AnnotationRemoved {
        group: GroupId,
        kind: AnnotationKind,
    },
    ProfileReady {
        group: GroupId,
        profile: TerrainProfile,
    },
    /// Cursor is over a committed profile line, nearest to `sample_index`.
    ProfileHover {
        group: GroupId,
        sample_index: usize,
    },
    /// The host should prompt for new text and call back with
    /// `set_label_text`.
    LabelEditRequested {
        entity: EntityId,
        group: GroupId,
        text: String,
    },
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencedEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub event: MeasureEvent,
}

#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<SequencedEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: MeasureEvent) {
        self.next_seq += 1;
        self.events.push(SequencedEvent {
            seq: self.next_seq,
            event,
        });
    }

    pub fn events(&self) -> &[SequencedEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<SequencedEvent> {
        std::mem::take(&mut self.events)
    }
}
