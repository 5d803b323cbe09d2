use std::path::PathBuf;

use anyhow::{anyhow, Result};
use calendar_api::SystemClock;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::protocol::{AgendaReport, CalendarReport, EventReport, EventSummary, PersonSummary};

mod config;
mod scenario;

use config::{load_settings, OutputFormat};
use scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "calendar-tools", about = "Replay event calendar scenarios")]
struct Cli {
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,
    #[arg(long, global = true)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario and print every event and agenda.
    Run { scenario: PathBuf },
    /// Print the sorted participants of one event.
    Participants { scenario: PathBuf, title: String },
    /// Print the sorted events of one person.
    Agenda { scenario: PathBuf, person: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings();
    let log_filter = cli.log_filter.unwrap_or(settings.log_filter);
    tracing_subscriber::fmt()
        .with_env_filter(log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();
    let format = cli.format.unwrap_or(settings.format);

    match cli.command {
        Command::Run { scenario } => {
            let replay = Scenario::load(&scenario)?.replay(SystemClock)?;
            let report = replay.report()?;
            emit(format, &report, render_calendar)
        }
        Command::Participants { scenario, title } => {
            let replay = Scenario::load(&scenario)?.replay(SystemClock)?;
            let report = replay
                .event_report(&title)
                .ok_or_else(|| anyhow!("no event titled '{title}'"))?;
            emit(format, &report, render_event)
        }
        Command::Agenda { scenario, person } => {
            let replay = Scenario::load(&scenario)?.replay(SystemClock)?;
            let report = replay.agenda_report(&person)?;
            emit(format, &report, render_agenda)
        }
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, render: fn(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", render(value)),
    }
    Ok(())
}

fn render_calendar(report: &CalendarReport) -> String {
    let mut out = String::new();
    if !report.steps.is_empty() {
        out.push_str("steps:\n");
        for step in &report.steps {
            let verdict = if step.accepted { "ok" } else { "rejected" };
            out.push_str(&format!(
                "  {} {} -> {}: {verdict}\n",
                step.action, step.person, step.event
            ));
        }
    }
    for event in &report.events {
        out.push_str(&render_event(event));
    }
    for agenda in &report.agendas {
        out.push_str(&render_agenda(agenda));
    }
    out
}

fn render_event(report: &EventReport) -> String {
    let mut out = format!("{}\n", event_line(&report.event));
    for (rank, person) in report.participants.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", rank + 1, person_line(person)));
    }
    out
}

fn render_agenda(report: &AgendaReport) -> String {
    let mut out = format!("{}\n", person_line(&report.person));
    for event in &report.events {
        out.push_str(&format!("  - {}\n", event_line(event)));
    }
    out
}

fn event_line(event: &EventSummary) -> String {
    let seats = match event.max_participators {
        Some(limit) => format!("{}/{limit}", event.participant_count),
        None => event.participant_count.to_string(),
    };
    format!(
        "{} @ {} [{seats}]",
        event.title,
        event.date_time.format("%Y-%m-%d %H:%M UTC")
    )
}

fn person_line(person: &PersonSummary) -> String {
    format!(
        "{}, {} ({} events)",
        person.last_name, person.first_name, person.event_count
    )
}
