//! Host notification service SPI.
//!
//! # Responsibility
//! - Abstract the OS notification center behind a small synchronous trait.
//! - Provide an in-memory host for tests and desktop shells.
//!
//! # Invariants
//! - `add_request` with an existing identifier replaces the pending request.
//! - `remove_pending` ignores unknown identifiers.

use super::request::NotificationRequest;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Failures reported by a host notification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Authorization prompt could not be completed.
    Authorization(String),
    /// Host refused to register one request.
    Rejected { identifier: String, reason: String },
    /// Host service is not reachable from this process.
    Unavailable(String),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorization(reason) => write!(f, "notification authorization failed: {reason}"),
            Self::Rejected { identifier, reason } => {
                write!(f, "notification `{identifier}` rejected: {reason}")
            }
            Self::Unavailable(reason) => write!(f, "notification service unavailable: {reason}"),
        }
    }
}

impl Error for HostError {}

/// Operations the scheduler needs from the platform notification center.
pub trait NotificationHost {
    /// Prompts for (or reports the cached) alert/sound/badge authorization.
    ///
    /// Returns `Ok(true)` when granted and `Ok(false)` when denied.
    fn request_authorization(&self) -> Result<bool, HostError>;

    /// Registers one pending notification request.
    fn add_request(&self, request: &NotificationRequest) -> Result<(), HostError>;

    /// Removes pending requests by identifier.
    fn remove_pending(&self, identifiers: &[String]) -> Result<(), HostError>;
}

impl<H: NotificationHost + ?Sized> NotificationHost for Arc<H> {
    fn request_authorization(&self) -> Result<bool, HostError> {
        (**self).request_authorization()
    }

    fn add_request(&self, request: &NotificationRequest) -> Result<(), HostError> {
        (**self).add_request(request)
    }

    fn remove_pending(&self, identifiers: &[String]) -> Result<(), HostError> {
        (**self).remove_pending(identifiers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AuthorizationAnswer {
    Grant,
    Deny,
    Fail(String),
}

/// Process-local host that records pending requests.
#[derive(Debug)]
pub struct InMemoryHost {
    answer: AuthorizationAnswer,
    reject_registrations: bool,
    authorization_calls: AtomicUsize,
    pending: Mutex<BTreeMap<String, NotificationRequest>>,
}

impl InMemoryHost {
    /// Host that grants authorization.
    pub fn granting() -> Self {
        Self::with_answer(AuthorizationAnswer::Grant)
    }

    /// Host that denies authorization.
    pub fn denying() -> Self {
        Self::with_answer(AuthorizationAnswer::Deny)
    }

    /// Host whose authorization prompt fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_answer(AuthorizationAnswer::Fail(reason.into()))
    }

    /// Makes every `add_request` call fail.
    pub fn rejecting_registrations(mut self) -> Self {
        self.reject_registrations = true;
        self
    }

    fn with_answer(answer: AuthorizationAnswer) -> Self {
        Self {
            answer,
            reject_registrations: false,
            authorization_calls: AtomicUsize::new(0),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of times authorization was requested.
    pub fn authorization_calls(&self) -> usize {
        self.authorization_calls.load(Ordering::SeqCst)
    }

    /// Pending requests sorted by identifier.
    pub fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.lock_pending().values().cloned().collect()
    }

    pub fn pending(&self, identifier: &str) -> Option<NotificationRequest> {
        self.lock_pending().get(identifier).cloned()
    }

    fn lock_pending(&self) -> MutexGuard<'_, BTreeMap<String, NotificationRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationHost for InMemoryHost {
    fn request_authorization(&self) -> Result<bool, HostError> {
        self.authorization_calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            AuthorizationAnswer::Grant => Ok(true),
            AuthorizationAnswer::Deny => Ok(false),
            AuthorizationAnswer::Fail(reason) => Err(HostError::Authorization(reason.clone())),
        }
    }

    fn add_request(&self, request: &NotificationRequest) -> Result<(), HostError> {
        if self.reject_registrations {
            return Err(HostError::Rejected {
                identifier: request.identifier.clone(),
                reason: "registrations disabled".to_string(),
            });
        }
        self.lock_pending()
            .insert(request.identifier.clone(), request.clone());
        Ok(())
    }

    fn remove_pending(&self, identifiers: &[String]) -> Result<(), HostError> {
        let mut pending = self.lock_pending();
        for identifier in identifiers {
            pending.remove(identifier);
        }
        Ok(())
    }
}
