use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use calendar_api::{Clock, Controller};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use shared::{
    domain::{Person, PersonId},
    protocol::{AgendaReport, CalendarReport, EventReport, StepOutcome},
};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default, rename = "person")]
    pub persons: Vec<PersonSpec>,
    #[serde(default, rename = "event")]
    pub events: Vec<EventSpec>,
    #[serde(default, rename = "step")]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Deserialize)]
pub struct PersonSpec {
    pub key: String,
    pub last_name: String,
    pub first_name: String,
    pub mail_address: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventSpec {
    pub invitor: String,
    pub title: String,
    pub in_days: Option<i64>,
    pub at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_participators: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Register,
    Unregister,
}

impl StepAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Unregister => "unregister",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StepSpec {
    pub action: StepAction,
    pub person: String,
    pub event: String,
}

/// Controller state after a scenario has been applied.
#[derive(Debug)]
pub struct Replay<C> {
    pub controller: Controller<C>,
    pub persons: Vec<(String, PersonId)>,
    pub steps: Vec<StepOutcome>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario '{}'", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse scenario '{}'", path.display()))
    }

    pub fn replay<C: Clock>(&self, clock: C) -> Result<Replay<C>> {
        let now = clock.now();
        let mut controller = Controller::with_clock(clock);
        let mut persons = Vec::with_capacity(self.persons.len());

        for spec in &self.persons {
            if persons.iter().any(|(key, _)| key == &spec.key) {
                bail!("person key '{}' is declared twice", spec.key);
            }
            let mut person = Person::new(&spec.last_name, &spec.first_name);
            person.mail_address = spec.mail_address.clone();
            person.phone_number = spec.phone_number.clone();
            persons.push((spec.key.clone(), controller.add_person(person)));
        }

        for spec in &self.events {
            let invitor = lookup_person(&persons, &spec.invitor)?;
            let date_time = spec.date_time(now)?;
            let created = controller.create_limited_event(
                invitor,
                &spec.title,
                date_time,
                spec.max_participators,
            );
            if created {
                info!(title = %spec.title, %date_time, "event created");
            } else {
                warn!(title = %spec.title, %date_time, "event rejected");
            }
        }

        let mut steps = Vec::with_capacity(self.steps.len());
        for spec in &self.steps {
            let person_id = lookup_person(&persons, &spec.person)?;
            let accepted = match controller.get_event(&spec.event) {
                Some(event_id) => match spec.action {
                    StepAction::Register => controller.register_person_for_event(person_id, event_id),
                    StepAction::Unregister => {
                        controller.unregister_person_for_event(person_id, event_id)
                    }
                },
                None => {
                    warn!(event = %spec.event, "step refers to an unknown event");
                    false
                }
            };
            info!(
                action = spec.action.as_str(),
                person = %spec.person,
                event = %spec.event,
                accepted,
                "step applied"
            );
            steps.push(StepOutcome {
                action: spec.action.as_str().to_string(),
                person: spec.person.clone(),
                event: spec.event.clone(),
                accepted,
            });
        }

        Ok(Replay {
            controller,
            persons,
            steps,
        })
    }
}

impl EventSpec {
    fn date_time(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match (self.at, self.in_days) {
            (Some(at), None) => Ok(at),
            (None, Some(days)) => Duration::try_days(days)
                .and_then(|offset| now.checked_add_signed(offset))
                .ok_or_else(|| anyhow!("event '{}' is out of range", self.title)),
            (Some(_), Some(_)) => bail!("event '{}' sets both `at` and `in_days`", self.title),
            (None, None) => bail!("event '{}' needs `at` or `in_days`", self.title),
        }
    }
}

impl<C: Clock> Replay<C> {
    pub fn person(&self, key: &str) -> Result<PersonId> {
        lookup_person(&self.persons, key)
    }

    pub fn event_report(&self, title: &str) -> Option<EventReport> {
        let event_id = self.controller.get_event(title)?;
        Some(EventReport {
            event: self.controller.event_summary(event_id)?,
            participants: self.controller.participator_summaries(event_id)?,
        })
    }

    pub fn agenda_report(&self, key: &str) -> Result<AgendaReport> {
        let person_id = self.person(key)?;
        let person = self
            .controller
            .person_summary(person_id)
            .ok_or_else(|| anyhow!("person '{key}' vanished from the controller"))?;
        let events = self.controller.event_summaries(person_id).unwrap_or_default();
        Ok(AgendaReport { person, events })
    }

    pub fn report(&self) -> Result<CalendarReport> {
        let events = self
            .controller
            .storage()
            .events()
            .filter_map(|(event_id, _)| {
                Some(EventReport {
                    event: self.controller.event_summary(event_id)?,
                    participants: self.controller.participator_summaries(event_id)?,
                })
            })
            .collect();
        let agendas = self
            .persons
            .iter()
            .map(|(key, _)| self.agenda_report(key))
            .collect::<Result<Vec<_>>>()?;
        Ok(CalendarReport {
            steps: self.steps.clone(),
            events,
            agendas,
        })
    }
}

fn lookup_person(persons: &[(String, PersonId)], key: &str) -> Result<PersonId> {
    persons
        .iter()
        .find(|(candidate, _)| candidate == key)
        .map(|(_, person_id)| *person_id)
        .ok_or_else(|| anyhow!("unknown person key '{key}'"))
}

#[cfg(test)]
#[path = "tests/scenario_tests.rs"]
mod tests;
