//! Event calendar controller.
//!
//! All public operations report failure as `false` or `None` and never leave
//! partial state behind. The reason for a rejection is logged at `debug`.

use chrono::{DateTime, Utc};
use shared::{
    domain::{compare_participants, Capacity, Event, EventId, Person, PersonId},
    error::{ApiError, ErrorCode},
    protocol::{EventSummary, PersonSummary},
};
use storage::Storage;
use tracing::{debug, warn};

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

#[derive(Debug, Clone, Default)]
pub struct Controller<C = SystemClock> {
    storage: Storage,
    clock: C,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Controller<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            storage: Storage::new(),
            clock,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn add_person(&mut self, person: Person) -> PersonId {
        self.storage.insert_person(person)
    }

    pub fn person(&self, person_id: PersonId) -> Option<&Person> {
        self.storage.person(person_id)
    }

    /// Contact info stays editable; names are fixed at construction.
    pub fn person_mut(&mut self, person_id: PersonId) -> Option<&mut Person> {
        self.storage.person_mut(person_id)
    }

    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        self.storage.event(event_id)
    }

    pub fn events_count(&self) -> usize {
        self.storage.event_count()
    }

    /// Creates an event without a participant limit.
    pub fn create_event(&mut self, invitor: PersonId, title: &str, date_time: DateTime<Utc>) -> bool {
        self.create_limited_event(invitor, title, date_time, 0)
    }

    /// Creates an event accepting at most `max_participators` registrants; `0` means unlimited.
    pub fn create_limited_event(
        &mut self,
        invitor: PersonId,
        title: &str,
        date_time: DateTime<Utc>,
        max_participators: u32,
    ) -> bool {
        let outcome = self.try_create_event(
            invitor,
            title,
            date_time,
            Capacity::from_max_participators(max_participators),
        );
        accepted("create_event", outcome)
    }

    /// Case-insensitive title lookup. When several titles match, the one
    /// created last wins.
    pub fn get_event(&self, title: &str) -> Option<EventId> {
        if title.trim().is_empty() {
            return None;
        }
        let wanted = title.to_lowercase();
        let mut found = None;
        for (event_id, event) in self.storage.events() {
            if event.title().to_lowercase() == wanted {
                found = Some(event_id);
            }
        }
        found
    }

    pub fn register_person_for_event(&mut self, person_id: PersonId, event_id: EventId) -> bool {
        let outcome = self.try_register(person_id, event_id);
        accepted("register_person_for_event", outcome)
    }

    pub fn unregister_person_for_event(&mut self, person_id: PersonId, event_id: EventId) -> bool {
        let outcome = self.try_unregister(person_id, event_id);
        accepted("unregister_person_for_event", outcome)
    }

    /// Registrants ordered by event count (descending), last name, first name.
    pub fn get_participators_for_event(&self, event_id: EventId) -> Option<Vec<PersonId>> {
        self.storage.event(event_id)?;
        let mut participants: Vec<(PersonId, &Person, usize)> = self
            .storage
            .persons_for_event(event_id)
            .into_iter()
            .filter_map(|person_id| {
                let person = self.storage.person(person_id)?;
                Some((person_id, person, self.storage.count_events_for_person(person_id)))
            })
            .collect();
        participants.sort_by(|(_, left, left_count), (_, right, right_count)| {
            compare_participants((*left, *left_count), (*right, *right_count))
        });
        Some(participants.into_iter().map(|(id, _, _)| id).collect())
    }

    /// The person's events, earliest first.
    pub fn get_events_for_person(&self, person_id: PersonId) -> Option<Vec<EventId>> {
        self.storage.person(person_id)?;
        let mut events: Vec<(EventId, &Event)> = self
            .storage
            .events_for_person(person_id)
            .into_iter()
            .filter_map(|event_id| Some((event_id, self.storage.event(event_id)?)))
            .collect();
        events.sort_by(|(_, left), (_, right)| left.cmp_by_date(right));
        Some(events.into_iter().map(|(id, _)| id).collect())
    }

    /// Zero for unknown persons.
    pub fn count_events_for_person(&self, person_id: PersonId) -> usize {
        if self.storage.person(person_id).is_none() {
            return 0;
        }
        self.storage.count_events_for_person(person_id)
    }

    pub fn person_summary(&self, person_id: PersonId) -> Option<PersonSummary> {
        let person = self.storage.person(person_id)?;
        Some(PersonSummary::new(
            person_id,
            person,
            self.storage.count_events_for_person(person_id),
        ))
    }

    pub fn event_summary(&self, event_id: EventId) -> Option<EventSummary> {
        let event = self.storage.event(event_id)?;
        Some(EventSummary {
            event_id,
            title: event.title().to_string(),
            invitor_id: event.invitor(),
            date_time: event.date_time(),
            max_participators: event.capacity().limit(),
            participant_count: self.storage.count_persons_for_event(event_id),
        })
    }

    /// [`Self::get_participators_for_event`] projected into summaries.
    pub fn participator_summaries(&self, event_id: EventId) -> Option<Vec<PersonSummary>> {
        let ordered = self.get_participators_for_event(event_id)?;
        Some(
            ordered
                .into_iter()
                .filter_map(|person_id| self.person_summary(person_id))
                .collect(),
        )
    }

    /// [`Self::get_events_for_person`] projected into summaries.
    pub fn event_summaries(&self, person_id: PersonId) -> Option<Vec<EventSummary>> {
        let ordered = self.get_events_for_person(person_id)?;
        Some(
            ordered
                .into_iter()
                .filter_map(|event_id| self.event_summary(event_id))
                .collect(),
        )
    }

    fn try_create_event(
        &mut self,
        invitor: PersonId,
        title: &str,
        date_time: DateTime<Utc>,
        capacity: Capacity,
    ) -> Result<EventId, ApiError> {
        ensure_person(&self.storage, invitor)?;
        if title.trim().is_empty() {
            return Err(ApiError::validation("title must not be empty"));
        }
        let now = self.clock.now();
        if date_time <= now {
            return Err(ApiError::validation(format!(
                "event date {date_time} is not after {now}"
            )));
        }
        if self.storage.title_exists(title) {
            return Err(ApiError::conflict(format!("title '{title}' is already used")));
        }

        let event_id = self
            .storage
            .insert_event(Event::new(title, invitor, date_time, capacity))
            .map_err(internal)?;
        debug!(?event_id, %title, %date_time, ?capacity, "event created");
        Ok(event_id)
    }

    fn try_register(&mut self, person_id: PersonId, event_id: EventId) -> Result<(), ApiError> {
        ensure_person(&self.storage, person_id)?;
        let event = ensure_event(&self.storage, event_id)?;

        if self.storage.is_registered(person_id, event_id) {
            return Err(ApiError::conflict("person is already registered for the event"));
        }
        let date_time = event.date_time();
        let clash = self
            .storage
            .events_for_person(person_id)
            .into_iter()
            .filter_map(|other| self.storage.event(other))
            .find(|other| other.date_time() == date_time);
        if let Some(other) = clash {
            return Err(ApiError::conflict(format!(
                "person is already registered for '{}' at {date_time}",
                other.title()
            )));
        }
        let registered = self.storage.count_persons_for_event(event_id);
        if !event.capacity().admits(registered) {
            return Err(ApiError::new(
                ErrorCode::CapacityExceeded,
                format!("event is full with {registered} participants"),
            ));
        }

        self.storage
            .add_registration(person_id, event_id)
            .map_err(internal)
    }

    fn try_unregister(&mut self, person_id: PersonId, event_id: EventId) -> Result<(), ApiError> {
        ensure_person(&self.storage, person_id)?;
        ensure_event(&self.storage, event_id)?;
        if !self.storage.is_registered(person_id, event_id) {
            return Err(ApiError::not_found("person is not registered for the event"));
        }
        self.storage
            .remove_registration(person_id, event_id)
            .map_err(internal)
    }
}

fn ensure_person(storage: &Storage, person_id: PersonId) -> Result<&Person, ApiError> {
    storage
        .person(person_id)
        .ok_or_else(|| ApiError::not_found(format!("unknown person {}", person_id.0)))
}

fn ensure_event(storage: &Storage, event_id: EventId) -> Result<&Event, ApiError> {
    storage
        .event(event_id)
        .ok_or_else(|| ApiError::not_found(format!("unknown event {}", event_id.0)))
}

fn accepted<T>(operation: &'static str, outcome: Result<T, ApiError>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(err) if err.code == ErrorCode::Internal => {
            warn!(operation, message = %err.message, "registry rejected a checked operation");
            false
        }
        Err(err) => {
            debug!(operation, code = ?err.code, message = %err.message, "operation rejected");
            false
        }
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
