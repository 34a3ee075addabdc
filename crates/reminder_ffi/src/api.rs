//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note/reminder persistence and notification scheduling to Dart
//!   via FRB.
//! - Convert core results into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage calls are non-`sync`: FRB runs them on its worker pool and
//!   completes a Dart `Future`, so disk I/O never blocks the UI isolate.
//! - The Flutter shell owns the OS notification center. Rust decides whether
//!   a prompt/registration is allowed and records what the shell reports.

use chrono::{DateTime, FixedOffset, Utc};
use reminder_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ConfigOverrides, CoreConfig, HostError, LoadOutcome, Note, NotificationHost,
    NotificationRequest, NotificationScheduler, Reminder, ScheduleError, StorageGateway,
    StorageLocation, StoreResult,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use uuid::Uuid;

static STORAGE_ROOT: OnceLock<PathBuf> = OnceLock::new();
static SCHEDULER: OnceLock<Mutex<NotificationScheduler<ShellHost>>> = OnceLock::new();

/// Host stand-in for the Flutter shell.
///
/// Prompts and registrations happen in Dart; this host is never asked to
/// perform them and reports itself unavailable if it is.
#[derive(Debug, Default)]
struct ShellHost;

impl NotificationHost for ShellHost {
    fn request_authorization(&self) -> Result<bool, HostError> {
        Err(shell_only())
    }

    fn add_request(&self, _request: &NotificationRequest) -> Result<(), HostError> {
        Err(shell_only())
    }

    fn remove_pending(&self, _identifiers: &[String]) -> Result<(), HostError> {
        Err(shell_only())
    }
}

fn shell_only() -> HostError {
    HostError::Unavailable("notification center is driven by the Flutter shell".to_string())
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.trim()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the data directory (the app's documents directory on mobile).
///
/// # FFI contract
/// - Sync call, no I/O.
/// - First call wins; repeating the same directory is a no-op.
/// - Returns empty string on success and error message on conflict.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(data_dir: String) -> String {
    let requested = PathBuf::from(data_dir.trim());
    if requested.as_os_str().is_empty() {
        return "data_dir cannot be empty".to_string();
    }
    let active = STORAGE_ROOT.get_or_init(|| requested.clone());
    if *active == requested {
        log::info!("event=storage_configure module=ffi status=ok");
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Generates a fresh record id for notes/reminders created in Dart.
#[flutter_rust_bridge::frb(sync)]
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Note row exchanged with Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub content: String,
}

/// Reminder row exchanged with Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub id: String,
    pub content: String,
    /// Fire time in Unix epoch milliseconds.
    pub date_epoch_ms: i64,
}

/// Notes load envelope. `status` is one of `empty|loaded|corrupt|error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesLoadResponse {
    pub ok: bool,
    pub status: String,
    pub items: Vec<NoteItem>,
    /// Corrupt-file diagnostic or error message; empty otherwise.
    pub message: String,
}

/// Reminders load envelope. `status` is one of `empty|loaded|corrupt|error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemindersLoadResponse {
    pub ok: bool,
    pub status: String,
    pub items: Vec<ReminderItem>,
    /// Corrupt-file diagnostic or error message; empty otherwise.
    pub message: String,
}

struct LoadParts<I> {
    ok: bool,
    status: String,
    items: Vec<I>,
    message: String,
}

impl From<LoadParts<NoteItem>> for NotesLoadResponse {
    fn from(parts: LoadParts<NoteItem>) -> Self {
        Self {
            ok: parts.ok,
            status: parts.status,
            items: parts.items,
            message: parts.message,
        }
    }
}

impl From<LoadParts<ReminderItem>> for RemindersLoadResponse {
    fn from(parts: LoadParts<ReminderItem>) -> Self {
        Self {
            ok: parts.ok,
            status: parts.status,
            items: parts.items,
            message: parts.message,
        }
    }
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub error_code: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code: Some(error_code.to_string()),
            message: message.into(),
        }
    }
}

/// Notification payload the shell registers with the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequestItem {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub repeats: bool,
}

/// Envelope for `reminder_notification_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequestResponse {
    pub ok: bool,
    pub request: Option<NotificationRequestItem>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Loads all notes.
///
/// # FFI contract
/// - Async call (FRB worker pool), file-backed.
/// - Never panics; corrupt data is reported as `status=corrupt`.
pub fn notes_load() -> NotesLoadResponse {
    let parts = match resolve_gateway() {
        Ok(gateway) => to_load_parts(gateway.load_notes(), to_note_item),
        Err(message) => load_failure(message),
    };
    parts.into()
}

/// Replaces the persisted note collection with `items`.
///
/// # FFI contract
/// - Async call (FRB worker pool), file-backed.
/// - Rejects the whole batch when any id is malformed; nothing is written.
pub fn notes_save(items: Vec<NoteItem>) -> ActionResponse {
    let notes = match items
        .into_iter()
        .map(|item| {
            let id = parse_record_id(&item.id)?;
            Note::with_id(id, item.content).map_err(|err| err.to_string())
        })
        .collect::<Result<Vec<_>, String>>()
    {
        Ok(notes) => notes,
        Err(message) => return ActionResponse::failure("invalid_record", message),
    };

    let gateway = match resolve_gateway() {
        Ok(gateway) => gateway,
        Err(message) => return ActionResponse::failure("storage_unconfigured", message),
    };
    match gateway.save_notes(&notes) {
        Ok(()) => ActionResponse::success(format!("Saved {} note(s).", notes.len())),
        Err(err) => ActionResponse::failure(err.code(), format!("notes_save failed: {err}")),
    }
}

/// Loads all reminders.
///
/// # FFI contract
/// - Async call (FRB worker pool), file-backed.
/// - Never panics; corrupt data is reported as `status=corrupt`.
pub fn reminders_load() -> RemindersLoadResponse {
    let parts = match resolve_gateway() {
        Ok(gateway) => to_load_parts(gateway.load_reminders(), to_reminder_item),
        Err(message) => load_failure(message),
    };
    parts.into()
}

/// Replaces the persisted reminder collection with `items`.
///
/// # FFI contract
/// - Async call (FRB worker pool), file-backed.
/// - Rejects the whole batch when any id or date is invalid.
pub fn reminders_save(items: Vec<ReminderItem>) -> ActionResponse {
    let reminders = match items
        .iter()
        .map(to_reminder)
        .collect::<Result<Vec<_>, String>>()
    {
        Ok(reminders) => reminders,
        Err(message) => return ActionResponse::failure("invalid_record", message),
    };

    let gateway = match resolve_gateway() {
        Ok(gateway) => gateway,
        Err(message) => return ActionResponse::failure("storage_unconfigured", message),
    };
    match gateway.save_reminders(&reminders) {
        Ok(()) => ActionResponse::success(format!("Saved {} reminder(s).", reminders.len())),
        Err(err) => ActionResponse::failure(err.code(), format!("reminders_save failed: {err}")),
    }
}

/// Returns `not_requested|pending|granted|denied|failed`.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_permission_state() -> String {
    lock_scheduler().permission_state().as_str().to_string()
}

/// Asks whether the shell should show the OS permission prompt.
///
/// Returns `true` and marks the state `pending` when no definite answer is
/// known yet; `false` once permission was granted or denied.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_permission_begin() -> bool {
    lock_scheduler().begin_permission_request()
}

/// Records the OS prompt outcome reported by the shell and returns the new
/// state label.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_record_permission(granted: bool, error: Option<String>) -> String {
    let mut scheduler = lock_scheduler();
    scheduler.record_permission_outcome(granted, error.filter(|value| !value.trim().is_empty()));
    scheduler.permission_state().as_str().to_string()
}

/// Builds the notification payload for `item`.
///
/// `utc_offset_seconds` is the shell's current local offset; trigger fields
/// are computed in it.
///
/// # FFI contract
/// - Sync call, no I/O.
/// - Fails with `permission_*` codes unless permission is granted.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_notification_request(
    item: ReminderItem,
    utc_offset_seconds: i32,
) -> NotificationRequestResponse {
    let reminder = match to_reminder(&item) {
        Ok(reminder) => reminder,
        Err(message) => return request_failure("invalid_record", message),
    };
    let Some(offset) = FixedOffset::east_opt(utc_offset_seconds) else {
        return request_failure(
            "invalid_offset",
            format!("utc offset out of range: {utc_offset_seconds}"),
        );
    };

    match lock_scheduler().prepare_request_in(&reminder, &offset) {
        Ok(request) => NotificationRequestResponse {
            ok: true,
            request: Some(to_request_item(request)),
            error_code: None,
            message: String::new(),
        },
        Err(err) => request_failure(err.code(), err.to_string()),
    }
}

/// Records the registration outcome the shell got from the OS.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_record_scheduled(id: String, error: Option<String>) -> ActionResponse {
    let reminder_id = match parse_record_id(&id) {
        Ok(reminder_id) => reminder_id,
        Err(message) => return ActionResponse::failure("invalid_record", message),
    };
    let outcome = match error.filter(|value| !value.trim().is_empty()) {
        None => Ok(()),
        Some(reason) => Err(ScheduleError::Host(HostError::Rejected {
            identifier: id,
            reason,
        })),
    };

    match lock_scheduler().record_schedule_outcome(reminder_id, outcome) {
        Ok(()) => ActionResponse::success("Reminder scheduled."),
        Err(err) => ActionResponse::failure(err.code(), err.to_string()),
    }
}

/// Drops scheduling state for a reminder the shell has deleted.
///
/// Returns `true` when state was recorded for `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_forget(id: String) -> bool {
    match parse_record_id(&id) {
        Ok(reminder_id) => lock_scheduler().forget(reminder_id).is_some(),
        Err(_) => false,
    }
}

fn resolve_gateway() -> Result<StorageGateway, String> {
    if let Some(root) = STORAGE_ROOT.get() {
        return Ok(StorageGateway::new(StorageLocation::new(root.clone())));
    }
    let config = CoreConfig::resolve(ConfigOverrides::default())
        .map_err(|err| format!("storage not configured: {err}"))?;
    let root = STORAGE_ROOT.get_or_init(|| config.data_dir);
    Ok(StorageGateway::new(StorageLocation::new(root.clone())))
}

fn lock_scheduler() -> MutexGuard<'static, NotificationScheduler<ShellHost>> {
    SCHEDULER
        .get_or_init(|| Mutex::new(NotificationScheduler::new(ShellHost)))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn parse_record_id(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid record id `{value}`"))
}

fn to_reminder(item: &ReminderItem) -> Result<Reminder, String> {
    let id = parse_record_id(&item.id)?;
    let date = DateTime::<Utc>::from_timestamp_millis(item.date_epoch_ms)
        .ok_or_else(|| format!("reminder date out of range: {}", item.date_epoch_ms))?;
    Reminder::with_id(id, item.content.clone(), date).map_err(|err| err.to_string())
}

fn to_note_item(note: Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        content: note.content,
    }
}

fn to_reminder_item(reminder: Reminder) -> ReminderItem {
    ReminderItem {
        id: reminder.id.to_string(),
        content: reminder.content,
        date_epoch_ms: reminder.date.timestamp_millis(),
    }
}

fn to_request_item(request: NotificationRequest) -> NotificationRequestItem {
    NotificationRequestItem {
        identifier: request.identifier,
        title: request.title,
        body: request.body,
        year: request.trigger.year,
        month: request.trigger.month,
        day: request.trigger.day,
        hour: request.trigger.hour,
        minute: request.trigger.minute,
        repeats: request.repeats,
    }
}

fn to_load_parts<T, I>(
    result: StoreResult<LoadOutcome<T>>,
    convert: impl Fn(T) -> I,
) -> LoadParts<I> {
    match result {
        Ok(outcome) => {
            let status = outcome.status_label().to_string();
            match outcome {
                LoadOutcome::Empty => LoadParts {
                    ok: true,
                    status,
                    items: Vec::new(),
                    message: String::new(),
                },
                LoadOutcome::Loaded(items) => LoadParts {
                    ok: true,
                    status,
                    items: items.into_iter().map(convert).collect(),
                    message: String::new(),
                },
                LoadOutcome::Corrupt { diagnostic } => LoadParts {
                    ok: true,
                    status,
                    items: Vec::new(),
                    message: diagnostic,
                },
            }
        }
        Err(err) => load_failure(format!("load failed: {err}")),
    }
}

fn load_failure<I>(message: String) -> LoadParts<I> {
    LoadParts {
        ok: false,
        status: "error".to_string(),
        items: Vec::new(),
        message,
    }
}

fn request_failure(error_code: &str, message: impl Into<String>) -> NotificationRequestResponse {
    NotificationRequestResponse {
        ok: false,
        request: None,
        error_code: Some(error_code.to_string()),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_storage, core_version, init_logging, new_record_id, notes_load, notes_save,
        notification_forget, notification_permission_begin, notification_permission_state,
        notification_record_permission, notification_record_scheduled, ping,
        reminder_notification_request, reminders_load, reminders_save, NoteItem, ReminderItem,
    };
    use std::path::PathBuf;
    use std::sync::OnceLock;

    static TEST_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

    fn ensure_test_storage() {
        let dir = TEST_DATA_DIR.get_or_init(|| {
            tempfile::tempdir()
                .expect("create temp dir")
                .into_path()
        });
        let error = configure_storage(dir.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_storage_rejects_switching_directories() {
        ensure_test_storage();
        let error = configure_storage("/somewhere/else".to_string());
        assert!(error.contains("refusing to switch"));
    }

    #[test]
    fn notes_and_reminders_round_trip_through_envelopes() {
        ensure_test_storage();
        let notes = vec![
            NoteItem {
                id: new_record_id(),
                content: "first".to_string(),
            },
            NoteItem {
                id: new_record_id(),
                content: "second".to_string(),
            },
        ];
        let saved = notes_save(notes.clone());
        assert!(saved.ok, "{}", saved.message);

        let loaded = notes_load();
        assert!(loaded.ok, "{}", loaded.message);
        assert_eq!(loaded.status, "loaded");
        assert_eq!(loaded.items, notes);

        let reminders = vec![ReminderItem {
            id: new_record_id(),
            content: "stretch".to_string(),
            date_epoch_ms: 1_900_000_000_123,
        }];
        let saved = reminders_save(reminders.clone());
        assert!(saved.ok, "{}", saved.message);
        assert_eq!(reminders_load().items, reminders);
    }

    #[test]
    fn save_rejects_malformed_ids() {
        ensure_test_storage();
        let response = notes_save(vec![NoteItem {
            id: "not-a-uuid".to_string(),
            content: "x".to_string(),
        }]);
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("invalid_record"));
    }

    #[test]
    fn notification_flow_requires_permission_then_builds_request() {
        let item = ReminderItem {
            id: new_record_id(),
            content: "standup".to_string(),
            // 2025-03-01T14:37:52Z
            date_epoch_ms: 1_740_839_872_000,
        };

        let blocked = reminder_notification_request(item.clone(), 0);
        assert!(!blocked.ok);
        assert_eq!(
            blocked.error_code.as_deref(),
            Some("permission_not_requested")
        );

        assert!(notification_permission_begin());
        assert_eq!(notification_permission_state(), "pending");
        assert_eq!(notification_record_permission(true, None), "granted");
        assert!(!notification_permission_begin());

        let response = reminder_notification_request(item.clone(), 3600);
        assert!(response.ok, "{}", response.message);
        let request = response.request.expect("request should be present");
        assert_eq!(request.identifier, item.id);
        assert_eq!(request.title, "Reminder");
        assert_eq!(
            (request.year, request.month, request.day, request.hour, request.minute),
            (2025, 3, 1, 15, 37)
        );
        assert!(!request.repeats);

        let recorded = notification_record_scheduled(item.id.clone(), None);
        assert!(recorded.ok);
        let rejected = notification_record_scheduled(item.id.clone(), Some("quota".to_string()));
        assert_eq!(rejected.error_code.as_deref(), Some("host_rejected"));

        assert!(notification_forget(item.id.clone()));
        assert!(!notification_forget(item.id));
        assert!(!notification_forget("not-a-uuid".to_string()));
    }
}
