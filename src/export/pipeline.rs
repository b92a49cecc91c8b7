use std::future::Future;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    export::{
        capture::{CaptureRequest, CaptureService, RenderedCanvas},
        media::{MediaStore, Permission, SavedAsset},
    },
    foundation::error::{ThumbError, ThumbResult},
};

/// Notice shown for any unexpected capture or save failure.
pub const SAVE_FAILED_NOTICE: &str = "Could not save thumbnail";
/// Notice shown after a successful save.
pub const SAVED_NOTICE: &str = "Thumbnail saved";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Text of the permission-denied prompt.
pub struct PermissionNotice {
    /// Prompt title.
    pub title: &'static str,
    /// Prompt body.
    pub message: &'static str,
}

/// Prompt offered when gallery access is denied.
pub const PERMISSION_NOTICE: PermissionNotice = PermissionNotice {
    title: "Permission Required",
    message: "We need permission to save images to your gallery. Please grant the permission in the settings.",
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Observable export state. Anything but `Idle` means an export is in flight.
pub enum ExportPhase {
    /// Ready for a new export.
    #[default]
    Idle,
    /// Snapshotting the canvas and resolving permission.
    Capturing,
    /// Writing to the media store.
    Saving,
    /// Waiting for the user to answer the permission prompt.
    PermissionPrompt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Result of one export run. The composition is never modified by an export.
pub enum ExportOutcome {
    /// Image persisted.
    Saved(SavedAsset),
    /// Permission refused; nothing persisted.
    PermissionDenied {
        /// Whether the user chose to open settings.
        settings_opened: bool,
    },
    /// Unexpected failure, already logged.
    Failed {
        /// Generic user-facing notice.
        notice: String,
    },
    /// Cancelled through the [`CancelToken`] before anything was persisted.
    Cancelled,
}

impl ExportOutcome {
    /// User-facing notice for this outcome.
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Saved(_) => Some(SAVED_NOTICE),
            Self::PermissionDenied { .. } => Some(PERMISSION_NOTICE.title),
            Self::Failed { notice } => Some(notice),
            Self::Cancelled => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
/// Answer to the permission prompt.
pub enum PermissionChoice {
    /// Abandon the export.
    Cancel,
    /// Open system settings so the user can grant access.
    OpenSettings,
}

/// Asks the user what to do after a permission denial.
pub trait PermissionPrompt {
    /// Present `notice` and wait for an answer.
    fn choose(&self, notice: &PermissionNotice) -> impl Future<Output = PermissionChoice>;
}

impl PermissionPrompt for PermissionChoice {
    async fn choose(&self, _notice: &PermissionNotice) -> PermissionChoice {
        *self
    }
}

#[derive(Clone, Debug, Default)]
/// Cancels an export run, including a step that is still pending.
///
/// The save step is not interrupted once started, so a cancelled run never leaves a file behind.
pub struct CancelToken(CancellationToken);

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Run `step` unless cancellation wins first; `None` when cancelled.
    async fn guard<T>(&self, step: impl Future<Output = T>) -> Option<T> {
        tokio::select! {
            biased;
            _ = self.0.cancelled() => None,
            out = step => Some(out),
        }
    }
}

/// One-shot export: capture, permission, then save.
///
/// Steps are awaited strictly in sequence. The phase is published on a watch channel so a UI
/// can disable the export trigger while a run is in flight, and always returns to
/// [`ExportPhase::Idle`].
#[derive(Debug)]
pub struct ExportPipeline {
    phase: watch::Sender<ExportPhase>,
    request: CaptureRequest,
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new(CaptureRequest::default())
    }
}

impl ExportPipeline {
    /// Pipeline capturing with `request`.
    pub fn new(request: CaptureRequest) -> Self {
        let (phase, _) = watch::channel(ExportPhase::Idle);
        Self { phase, request }
    }

    /// Current phase.
    pub fn phase(&self) -> ExportPhase {
        *self.phase.borrow()
    }

    /// Receiver observing phase changes.
    pub fn subscribe(&self) -> watch::Receiver<ExportPhase> {
        self.phase.subscribe()
    }

    fn set_phase(&self, phase: ExportPhase) {
        tracing::debug!(?phase, "export phase");
        self.phase.send_replace(phase);
    }

    /// Run one export of `surface`.
    ///
    /// Errors never escape: they are logged and reported as [`ExportOutcome::Failed`].
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn run<C, M, P>(
        &mut self,
        surface: Option<&RenderedCanvas>,
        capture: &C,
        media: &M,
        prompt: &P,
        cancel: &CancelToken,
    ) -> ExportOutcome
    where
        C: CaptureService,
        M: MediaStore,
        P: PermissionPrompt,
    {
        let outcome = match self.run_steps(surface, capture, media, prompt, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "error saving thumbnail");
                ExportOutcome::Failed {
                    notice: SAVE_FAILED_NOTICE.to_owned(),
                }
            }
        };
        self.set_phase(ExportPhase::Idle);
        tracing::info!(?outcome, "export finished");
        outcome
    }

    async fn run_steps<C, M, P>(
        &self,
        surface: Option<&RenderedCanvas>,
        capture: &C,
        media: &M,
        prompt: &P,
        cancel: &CancelToken,
    ) -> ThumbResult<ExportOutcome>
    where
        C: CaptureService,
        M: MediaStore,
        P: PermissionPrompt,
    {
        self.set_phase(ExportPhase::Capturing);
        let surface = surface.ok_or_else(|| ThumbError::export("canvas not mounted"))?;
        let Some(image) = cancel.guard(capture.capture(surface, &self.request)).await else {
            return Ok(ExportOutcome::Cancelled);
        };
        let image = image?;
        if cancel.is_cancelled() {
            return Ok(ExportOutcome::Cancelled);
        }

        let Some(mut permission) = cancel.guard(media.permission()).await.transpose()? else {
            return Ok(ExportOutcome::Cancelled);
        };
        if permission != Permission::Granted {
            let Some(requested) = cancel.guard(media.request_permission()).await.transpose()? else {
                return Ok(ExportOutcome::Cancelled);
            };
            permission = requested;
        }

        if permission != Permission::Granted {
            self.set_phase(ExportPhase::PermissionPrompt);
            let Some(choice) = cancel.guard(prompt.choose(&PERMISSION_NOTICE)).await else {
                return Ok(ExportOutcome::Cancelled);
            };
            let settings_opened = match choice {
                PermissionChoice::Cancel => false,
                PermissionChoice::OpenSettings => {
                    if cancel.is_cancelled() {
                        return Ok(ExportOutcome::Cancelled);
                    }
                    media.open_settings().await?;
                    true
                }
            };
            return Ok(ExportOutcome::PermissionDenied { settings_opened });
        }

        if cancel.is_cancelled() {
            return Ok(ExportOutcome::Cancelled);
        }
        self.set_phase(ExportPhase::Saving);
        let saved = media.save(&image).await?;
        Ok(ExportOutcome::Saved(saved))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
