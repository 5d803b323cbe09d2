use std::{cmp::Ordering, num::NonZeroU32};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(PersonId);
id_newtype!(EventId);

/// Upper bound on the number of registrants an event accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    #[default]
    Unlimited,
    Limited(NonZeroU32),
}

impl Capacity {
    /// `0` means no limit.
    pub fn from_max_participators(max_participators: u32) -> Self {
        NonZeroU32::new(max_participators).map_or(Self::Unlimited, Self::Limited)
    }

    pub fn limit(self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Limited(limit) => Some(limit.get()),
        }
    }

    /// Whether one more registrant fits when `current` are already registered.
    pub fn admits(self, current: usize) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(limit) => current < limit.get() as usize,
        }
    }
}

/// Someone who invites to events and registers for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    last_name: String,
    first_name: String,
    pub mail_address: Option<String>,
    pub phone_number: Option<String>,
}

impl Person {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            mail_address: None,
            phone_number: None,
        }
    }

    pub fn with_mail_address(mut self, mail_address: impl Into<String>) -> Self {
        self.mail_address = Some(mail_address.into());
        self
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    title: String,
    invitor: PersonId,
    date_time: DateTime<Utc>,
    capacity: Capacity,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        invitor: PersonId,
        date_time: DateTime<Utc>,
        capacity: Capacity,
    ) -> Self {
        Self {
            title: title.into(),
            invitor,
            date_time,
            capacity,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn invitor(&self) -> PersonId {
        self.invitor
    }

    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn cmp_by_date(&self, other: &Self) -> Ordering {
        self.date_time.cmp(&other.date_time)
    }
}

/// Participant order: more registrations first, then last name, then first name.
pub fn compare_participants(
    (left, left_events): (&Person, usize),
    (right, right_events): (&Person, usize),
) -> Ordering {
    right_events
        .cmp(&left_events)
        .then_with(|| left.last_name.cmp(&right.last_name))
        .then_with(|| left.first_name.cmp(&right.first_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_participators_is_unlimited() {
        assert_eq!(Capacity::from_max_participators(0), Capacity::Unlimited);
        assert_eq!(Capacity::from_max_participators(3).limit(), Some(3));
        assert!(Capacity::Unlimited.admits(usize::MAX - 1));
    }

    #[test]
    fn limited_capacity_rejects_once_full() {
        let capacity = Capacity::from_max_participators(2);
        assert!(capacity.admits(0));
        assert!(capacity.admits(1));
        assert!(!capacity.admits(2));
    }

    #[test]
    fn participants_with_more_events_sort_first() {
        let busy = Person::new("Zeller", "Anna");
        let idle = Person::new("Adler", "Berta");
        assert_eq!(
            compare_participants((&busy, 3), (&idle, 1)),
            Ordering::Less
        );
    }

    #[test]
    fn participants_tie_break_on_last_then_first_name() {
        let franz = Person::new("Part", "Franz");
        let hans = Person::new("Part", "Hans");
        let other = Person::new("Other", "Zora");
        assert_eq!(compare_participants((&franz, 1), (&hans, 1)), Ordering::Less);
        assert_eq!(compare_participants((&other, 1), (&franz, 1)), Ordering::Less);
    }
}
