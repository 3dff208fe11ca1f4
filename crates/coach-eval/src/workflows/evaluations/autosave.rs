use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::lifecycle::LifecycleError;
use super::repository::EvaluationRepository;
use super::service::{EvaluationService, EvaluationServiceError};
use super::session::EditSession;

pub type SharedSession = Arc<Mutex<EditSession>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed since the last save.
    Clean,
    /// Another save for this session was still running; this one was skipped.
    InFlight,
    Saved { revision: u64 },
}

/// Held while a save runs; releases the gate on drop.
pub(crate) struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Serializes saves for one editing session. Manual saves and timer ticks share the gate,
/// so two saves of the same session never run at once.
pub struct DraftSaver<R> {
    session: SharedSession,
    service: Arc<EvaluationService<R>>,
    in_flight: AtomicBool,
}

impl<R> DraftSaver<R>
where
    R: EvaluationRepository + 'static,
{
    pub fn new(session: EditSession, service: Arc<EvaluationService<R>>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            service,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub(crate) fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(InFlightGuard(&self.in_flight))
        }
    }

    /// Persist the buffer if it is dirty. Errors are returned to the caller; the timer
    /// loop logs them and leaves the buffer dirty for the next tick.
    pub async fn save(&self) -> Result<SaveOutcome, EvaluationServiceError> {
        let Some(_guard) = self.try_begin() else {
            return Ok(SaveOutcome::InFlight);
        };

        let (revision, draft) = {
            let session = self.session.lock().await;
            if !session.is_dirty() {
                return Ok(SaveOutcome::Clean);
            }
            session.snapshot()
        };

        let stored = self.service.persist_draft(draft)?;
        self.session.lock().await.mark_saved(revision, stored);
        Ok(SaveOutcome::Saved { revision })
    }
}

/// Background task that saves a session on a fixed cadence until cancelled. The task
/// cancels itself once the stored evaluation is no longer a draft.
pub struct Autosaver {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Autosaver {
    pub fn spawn<R>(saver: Arc<DraftSaver<R>>, period: Duration) -> Self
    where
        R: EvaluationRepository + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => match saver.save().await {
                        Ok(SaveOutcome::Saved { revision }) => {
                            debug!(revision, "autosave stored draft");
                        }
                        Ok(SaveOutcome::InFlight) => {
                            debug!("autosave tick skipped; save already in flight");
                        }
                        Ok(SaveOutcome::Clean) => {}
                        Err(EvaluationServiceError::Lifecycle(
                            err @ LifecycleError::InvalidTransition { .. },
                        )) => {
                            info!(error = %err, "stored evaluation is read-only; autosave stopped");
                            cancelled.cancel();
                            break;
                        }
                        Err(err) => {
                            warn!(error = %err, "autosave failed; retrying on next tick");
                        }
                    },
                }
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel the timer and wait for an in-progress tick to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "autosave task ended abnormally");
            }
        }
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
