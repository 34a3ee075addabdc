//! Terminal front end for `reminder_core`.
//!
//! # Responsibility
//! - Map subcommands onto note/reminder sessions.
//! - Resolve configuration and logging the same way the app shell does.
//!
//! Notifications are not delivered from the terminal; `reminder add` prints
//! the payload a host shell would register.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::Parser;
use log::info;
use reminder_core::{
    init_logging, ConfigOverrides, CoreConfig, InMemoryHost, LoadReport, NoteSession,
    NotificationScheduler, RecordId, ReminderSession, StorageGateway,
};

mod cli;

use cli::{Cli, Commands, NoteCommands, ReminderCommands};

const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CoreConfig::resolve(ConfigOverrides {
        data_dir: cli.data_dir,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    })
    .context("failed to resolve configuration")?;
    init_logging(config.log_level, &config.log_dir).context("failed to initialize logging")?;
    info!(
        "event=cli_start module=cli status=ok data_dir={}",
        config.data_dir.display()
    );

    let gateway = StorageGateway::new(config.storage_location());
    match cli.command {
        Commands::Note { cmd } => run_note(gateway, cmd),
        Commands::Reminder { cmd } => run_reminder(gateway, cmd),
        Commands::Permission => {
            let mut session = open_reminders(gateway)?;
            println!("{}", session.request_permission().as_str());
            Ok(())
        }
    }
}

fn run_note(gateway: StorageGateway, cmd: NoteCommands) -> Result<()> {
    let mut session = NoteSession::open(gateway).context("failed to open notes")?;
    report_recovery(session.load_report());

    match cmd {
        NoteCommands::Add { content } => {
            let note = session.add(content)?;
            println!("{}", note.id);
        }
        NoteCommands::List => {
            for (index, note) in session.notes().iter().enumerate() {
                println!("{:>3}. {}  [{}]", index + 1, note.title(), note.id);
            }
        }
        NoteCommands::Show { target } => {
            let ids: Vec<RecordId> = session.notes().iter().map(|note| note.id).collect();
            let id = resolve_target(&target, &ids)?;
            if let Some(note) = session.get(id) {
                println!("{}", note.content);
            }
        }
        NoteCommands::Edit { target, content } => {
            let ids: Vec<RecordId> = session.notes().iter().map(|note| note.id).collect();
            let id = resolve_target(&target, &ids)?;
            session.edit(id, content)?;
        }
        NoteCommands::Rm { targets } => {
            let ids: Vec<RecordId> = session.notes().iter().map(|note| note.id).collect();
            let offsets = resolve_offsets(&targets, &ids)?;
            let removed = session.delete_at(&offsets)?;
            println!("removed {} note(s)", removed.len());
        }
    }
    Ok(())
}

fn run_reminder(gateway: StorageGateway, cmd: ReminderCommands) -> Result<()> {
    let mut session = open_reminders(gateway)?;

    match cmd {
        ReminderCommands::Add { content, at } => {
            let date = parse_date(&at, &Local)?;
            session.request_permission();
            let added = session.add(content, date)?;
            println!("{}", added.reminder.id);
            match added.notification {
                Ok(request) => println!("{}", serde_json::to_string_pretty(&request)?),
                Err(err) => eprintln!("notification not scheduled ({}): {err}", err.code()),
            }
        }
        ReminderCommands::List => {
            for (index, reminder) in session.reminders().iter().enumerate() {
                println!(
                    "{:>3}. {}  {}  [{}]",
                    index + 1,
                    reminder.display_date(&Local),
                    reminder.content,
                    reminder.id
                );
            }
        }
        ReminderCommands::Rm { targets } => {
            let ids: Vec<RecordId> = session
                .reminders()
                .iter()
                .map(|reminder| reminder.id)
                .collect();
            let offsets = resolve_offsets(&targets, &ids)?;
            let removed = session.delete_at(&offsets)?;
            println!("removed {} reminder(s)", removed.len());
        }
    }
    Ok(())
}

fn open_reminders(gateway: StorageGateway) -> Result<ReminderSession<InMemoryHost>> {
    let scheduler = NotificationScheduler::new(InMemoryHost::granting());
    let session = ReminderSession::open(gateway, scheduler).context("failed to open reminders")?;
    report_recovery(session.load_report());
    Ok(session)
}

fn report_recovery(report: &LoadReport) {
    if let LoadReport::Recovered { diagnostic, backup } = report {
        match backup {
            Some(path) => eprintln!(
                "warning: unreadable data moved to {} ({diagnostic})",
                path.display()
            ),
            None => eprintln!("warning: unreadable data ignored ({diagnostic})"),
        }
    }
}

/// Accepts a 1-based position or a record id present in `ids`.
fn resolve_target(target: &str, ids: &[RecordId]) -> Result<RecordId> {
    let offset = resolve_offsets(&[target.to_string()], ids)?;
    Ok(ids[offset[0]])
}

fn resolve_offsets(targets: &[String], ids: &[RecordId]) -> Result<Vec<usize>> {
    targets
        .iter()
        .map(|target| {
            let target = target.trim();
            if let Ok(position) = target.parse::<usize>() {
                if position == 0 || position > ids.len() {
                    bail!("position {position} out of range (1..={})", ids.len());
                }
                return Ok(position - 1);
            }
            let id = RecordId::parse_str(target)
                .with_context(|| format!("`{target}` is neither a position nor a record id"))?;
            ids.iter()
                .position(|candidate| *candidate == id)
                .with_context(|| format!("no record with id {id}"))
        })
        .collect()
}

/// Parses RFC 3339, or `YYYY-MM-DD HH:MM` interpreted in `tz`.
fn parse_date<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, LOCAL_DATE_FORMAT)
        .with_context(|| format!("`{value}` is not RFC 3339 or `YYYY-MM-DD HH:MM`"))?;
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => Ok(local.with_timezone(&Utc)),
        None => bail!("`{value}` does not exist in the local time zone"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_date, resolve_offsets, resolve_target};
    use crate::cli::{Cli, Commands, NoteCommands, ReminderCommands};
    use chrono::{FixedOffset, TimeZone, Utc};
    use clap::Parser;
    use uuid::Uuid;

    #[test]
    fn parses_rfc3339_and_local_dates() {
        let tz = FixedOffset::east_opt(2 * 3600).expect("valid offset");
        assert_eq!(
            parse_date("2030-05-01T09:30:00Z", &tz).expect("rfc3339"),
            Utc.with_ymd_and_hms(2030, 5, 1, 9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_date("2030-05-01 09:30", &tz).expect("local"),
            Utc.with_ymd_and_hms(2030, 5, 1, 7, 30, 0).unwrap()
        );
        assert!(parse_date("tomorrow", &tz).is_err());
    }

    #[test]
    fn targets_accept_positions_and_ids() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let by_id = ids[2].to_string().to_uppercase();
        assert_eq!(
            resolve_offsets(&["1".to_string(), by_id], &ids).expect("resolve"),
            vec![0, 2]
        );
        assert_eq!(resolve_target("2", &ids).expect("resolve"), ids[1]);
        assert!(resolve_offsets(&["0".to_string()], &ids).is_err());
        assert!(resolve_offsets(&["4".to_string()], &ids).is_err());
        assert!(resolve_target(&Uuid::new_v4().to_string(), &ids).is_err());
    }

    #[test]
    fn cli_parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "reminder",
            "--data-dir",
            "/tmp/reminders",
            "reminder",
            "add",
            "stretch",
            "--at",
            "2030-05-01 09:30",
        ])
        .expect("parse");
        assert_eq!(
            cli.data_dir.as_deref(),
            Some(std::path::Path::new("/tmp/reminders"))
        );
        match cli.command {
            Commands::Reminder {
                cmd: ReminderCommands::Add { content, at },
            } => {
                assert_eq!(content, "stretch");
                assert_eq!(at, "2030-05-01 09:30");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["reminder", "note", "rm", "1", "3"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Note { cmd: NoteCommands::Rm { targets } } if targets == ["1", "3"]
        ));
        assert!(Cli::try_parse_from(["reminder", "note", "rm"]).is_err());
    }
}
