use chrono::Utc;
use uuid::Uuid;

use super::{PipelineEvent, PipelineEventKind};

/// Traza append-only de una única invocación. Asigna `seq` en orden de
/// llegada y estampa el `run_id` en cada evento.
#[derive(Debug)]
pub struct RunLog {
    run_id: Uuid,
    events: Vec<PipelineEvent>,
}

impl RunLog {
    pub fn new(run_id: Uuid) -> Self {
        Self { run_id,
               events: Vec::new() }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn append(&mut self, kind: PipelineEventKind) -> &PipelineEvent {
        let seq = self.events.len() as u64;
        self.events.push(PipelineEvent { seq,
                                         run_id: self.run_id,
                                         kind,
                                         ts: Utc::now() });
        &self.events[self.events.len() - 1]
    }

    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<PipelineEvent> {
        self.events
    }
}
