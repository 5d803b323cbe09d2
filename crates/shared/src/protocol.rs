use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EventId, Person, PersonId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonSummary {
    pub person_id: PersonId,
    pub last_name: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub event_count: usize,
}

impl PersonSummary {
    pub fn new(person_id: PersonId, person: &Person, event_count: usize) -> Self {
        Self {
            person_id,
            last_name: person.last_name().to_string(),
            first_name: person.first_name().to_string(),
            mail_address: person.mail_address.clone(),
            phone_number: person.phone_number.clone(),
            event_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventSummary {
    pub event_id: EventId,
    pub title: String,
    pub invitor_id: PersonId,
    pub date_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participators: Option<u32>,
    pub participant_count: usize,
}

/// Outcome of one replayed registration step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepOutcome {
    pub action: String,
    pub person: String,
    pub event: String,
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReport {
    pub event: EventSummary,
    pub participants: Vec<PersonSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaReport {
    pub person: PersonSummary,
    pub events: Vec<EventSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarReport {
    pub steps: Vec<StepOutcome>,
    pub events: Vec<EventReport>,
    pub agendas: Vec<AgendaReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_summary_omits_missing_contact_fields() {
        let person = Person::new("Huber", "Max");
        let summary = PersonSummary::new(PersonId(1), &person, 0);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["last_name"], "Huber");
        assert!(json.get("mail_address").is_none());
    }
}
