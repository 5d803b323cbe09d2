use anyhow::{anyhow, bail, Result};

use shared::domain::{Event, EventId, Person, PersonId};

/// In-memory store for persons, events and the registrations linking them.
///
/// Registrations are kept as a single list of pairs; the per-person and
/// per-event views are derived from it, so both sides always agree.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    persons: Vec<Person>,
    events: Vec<Event>,
    registrations: Vec<Registration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub person_id: PersonId,
    pub event_id: EventId,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_person(&mut self, person: Person) -> PersonId {
        self.persons.push(person);
        PersonId(self.persons.len() as i64)
    }

    pub fn person(&self, person_id: PersonId) -> Option<&Person> {
        slot(person_id.0).and_then(|index| self.persons.get(index))
    }

    pub fn person_mut(&mut self, person_id: PersonId) -> Option<&mut Person> {
        slot(person_id.0).and_then(|index| self.persons.get_mut(index))
    }

    pub fn persons(&self) -> impl Iterator<Item = (PersonId, &Person)> {
        self.persons
            .iter()
            .enumerate()
            .map(|(index, person)| (PersonId(index as i64 + 1), person))
    }

    pub fn insert_event(&mut self, event: Event) -> Result<EventId> {
        if self.person(event.invitor()).is_none() {
            bail!("unknown invitor {:?}", event.invitor());
        }
        if self.title_exists(event.title()) {
            bail!("event title '{}' already stored", event.title());
        }
        self.events.push(event);
        Ok(EventId(self.events.len() as i64))
    }

    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        slot(event_id.0).and_then(|index| self.events.get(index))
    }

    /// Events in creation order.
    pub fn events(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| (EventId(index as i64 + 1), event))
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Exact, case-sensitive title match.
    pub fn title_exists(&self, title: &str) -> bool {
        self.events.iter().any(|event| event.title() == title)
    }

    pub fn is_registered(&self, person_id: PersonId, event_id: EventId) -> bool {
        self.registrations.contains(&Registration {
            person_id,
            event_id,
        })
    }

    pub fn add_registration(&mut self, person_id: PersonId, event_id: EventId) -> Result<()> {
        self.ensure_known(person_id, event_id)?;
        if self.is_registered(person_id, event_id) {
            bail!("{person_id:?} is already registered for {event_id:?}");
        }
        self.registrations.push(Registration {
            person_id,
            event_id,
        });
        Ok(())
    }

    pub fn remove_registration(&mut self, person_id: PersonId, event_id: EventId) -> Result<()> {
        let position = self
            .registrations
            .iter()
            .position(|r| r.person_id == person_id && r.event_id == event_id)
            .ok_or_else(|| anyhow!("{person_id:?} is not registered for {event_id:?}"))?;
        self.registrations.remove(position);
        Ok(())
    }

    /// Events of a person in registration order.
    pub fn events_for_person(&self, person_id: PersonId) -> Vec<EventId> {
        self.registrations
            .iter()
            .filter(|r| r.person_id == person_id)
            .map(|r| r.event_id)
            .collect()
    }

    /// Registrants of an event in registration order.
    pub fn persons_for_event(&self, event_id: EventId) -> Vec<PersonId> {
        self.registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .map(|r| r.person_id)
            .collect()
    }

    pub fn count_events_for_person(&self, person_id: PersonId) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.person_id == person_id)
            .count()
    }

    pub fn count_persons_for_event(&self, event_id: EventId) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count()
    }

    fn ensure_known(&self, person_id: PersonId, event_id: EventId) -> Result<()> {
        if self.person(person_id).is_none() {
            bail!("unknown person {person_id:?}");
        }
        if self.event(event_id).is_none() {
            bail!("unknown event {event_id:?}");
        }
        Ok(())
    }
}

// Ids are 1-based, like database row ids.
fn slot(id: i64) -> Option<usize> {
    usize::try_from(id).ok()?.checked_sub(1)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
