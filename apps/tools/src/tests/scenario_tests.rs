use super::*;
use calendar_api::FixedClock;
use chrono::TimeZone;

const TEAM_MEETING: &str = r#"
[[person]]
key = "max"
last_name = "Huber"
first_name = "Max"
mail_address = "max.huber@x.x"
phone_number = "1234567"

[[person]]
key = "a"
last_name = "Alpha"
first_name = "Anna"

[[person]]
key = "b"
last_name = "Beta"
first_name = "Bert"

[[person]]
key = "c"
last_name = "Gamma"
first_name = "Cleo"

[[event]]
invitor = "max"
title = "Team Meeting"
in_days = 1
max_participators = 2

[[event]]
invitor = "max"
title = "Retro"
at = "2030-03-01T09:00:00Z"

[[step]]
action = "register"
person = "a"
event = "Team Meeting"

[[step]]
action = "register"
person = "b"
event = "team meeting"

[[step]]
action = "register"
person = "c"
event = "Team Meeting"

[[step]]
action = "unregister"
person = "a"
event = "Team Meeting"

[[step]]
action = "register"
person = "c"
event = "Team Meeting"

[[step]]
action = "register"
person = "c"
event = "Retro"
"#;

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap())
}

fn team_meeting() -> Scenario {
    toml::from_str(TEAM_MEETING).expect("scenario parses")
}

#[test]
fn replays_team_meeting_steps_in_order() {
    let replay = team_meeting().replay(clock()).expect("replay");
    let outcomes: Vec<bool> = replay.steps.iter().map(|s| s.accepted).collect();
    assert_eq!(outcomes, [true, true, false, true, true, true]);
    assert_eq!(replay.controller.events_count(), 2);
}

#[test]
fn event_report_lists_sorted_participants() {
    let replay = team_meeting().replay(clock()).expect("replay");
    let report = replay.event_report("TEAM MEETING").expect("report");

    assert_eq!(report.event.max_participators, Some(2));
    let names: Vec<&str> = report
        .participants
        .iter()
        .map(|p| p.last_name.as_str())
        .collect();
    // Cleo attends two events, so she leads.
    assert_eq!(names, ["Gamma", "Beta"]);
}

#[test]
fn agenda_is_sorted_by_date() {
    let replay = team_meeting().replay(clock()).expect("replay");
    let agenda = replay.agenda_report("c").expect("agenda");
    let titles: Vec<&str> = agenda.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Team Meeting", "Retro"]);
    assert_eq!(agenda.person.event_count, 2);
}

#[test]
fn full_report_covers_every_event_and_person() {
    let replay = team_meeting().replay(clock()).expect("replay");
    let report = replay.report().expect("report");
    assert_eq!(report.events.len(), 2);
    assert_eq!(report.agendas.len(), 4);
    assert_eq!(report.steps.len(), 6);
}

#[test]
fn step_for_unknown_event_is_rejected_not_fatal() {
    let scenario: Scenario = toml::from_str(
        r#"
        [[person]]
        key = "a"
        last_name = "Alpha"
        first_name = "Anna"

        [[step]]
        action = "register"
        person = "a"
        event = "Nowhere"
        "#,
    )
    .expect("scenario parses");
    let replay = scenario.replay(clock()).expect("replay");
    assert!(!replay.steps[0].accepted);
}

#[test]
fn unknown_person_key_is_an_error() {
    let scenario: Scenario = toml::from_str(
        r#"
        [[event]]
        invitor = "ghost"
        title = "Party"
        in_days = 2
        "#,
    )
    .expect("scenario parses");
    let err = scenario.replay(clock()).expect_err("should fail");
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn event_needs_exactly_one_date_source() {
    let scenario: Scenario = toml::from_str(
        r#"
        [[person]]
        key = "max"
        last_name = "Huber"
        first_name = "Max"

        [[event]]
        invitor = "max"
        title = "Undated"
        "#,
    )
    .expect("scenario parses");
    assert!(scenario.replay(clock()).is_err());
}

#[test]
fn past_event_is_skipped() {
    let scenario: Scenario = toml::from_str(
        r#"
        [[person]]
        key = "max"
        last_name = "Huber"
        first_name = "Max"

        [[event]]
        invitor = "max"
        title = "Yesterday"
        in_days = -1
        "#,
    )
    .expect("scenario parses");
    let replay = scenario.replay(clock()).expect("replay");
    assert_eq!(replay.controller.events_count(), 0);
}

#[test]
fn loads_scenario_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scenario.toml");
    fs::write(&path, TEAM_MEETING).expect("write scenario");

    let scenario = Scenario::load(&path).expect("load");
    assert_eq!(scenario.persons.len(), 4);
    assert!(Scenario::load(&dir.path().join("missing.toml")).is_err());
}
