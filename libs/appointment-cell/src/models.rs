use serde::{Deserialize, Serialize};

/// Which consultation timestamp a record call writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsultationField {
    Start,
    End,
}

impl ConsultationField {
    pub fn column(&self) -> &'static str {
        match self {
            ConsultationField::Start => "consultation_started_at",
            ConsultationField::End => "consultation_ended_at",
        }
    }
}
