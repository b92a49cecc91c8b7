use std::sync::Arc;

use anyhow::Context as _;
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::watch;

use crate::{
    assets::store::ImageStore,
    composition::{action::Action, model::CompositionState},
    config::ThumbConfig,
    export::{
        capture::{CaptureService, RenderedCanvas},
        media::MediaStore,
        picker::{ImagePicker, PickOutcome, PickRequest},
        pipeline::{CancelToken, ExportOutcome, ExportPhase, ExportPipeline, PermissionPrompt},
    },
    foundation::{core::Viewport, error::ThumbResult},
    render::{
        backend::{BackendKind, RenderBackend, create_backend},
        plan::{ScenePlan, compile_scene},
    },
};

/// Application root: owns the composition, the rendered surface, and the export pipeline.
///
/// Every mutation goes through [`Editor::dispatch`]. Once mounted, the canvas is re-rendered
/// after each dispatch, so the surface export captures always reflects the current state.
/// A failed dispatch leaves both the state and the surface as they were.
pub struct Editor {
    state: CompositionState,
    viewport: Viewport,
    backend: Box<dyn RenderBackend>,
    images: ImageStore,
    surface: Option<RenderedCanvas>,
    rng: StdRng,
    export: ExportPipeline,
}

impl Editor {
    /// Editor with default state; `seed` makes random backgrounds reproducible.
    pub fn new(viewport: Viewport, backend: Box<dyn RenderBackend>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: CompositionState::new(),
            viewport,
            backend,
            images: ImageStore::new(),
            surface: None,
            rng,
            export: ExportPipeline::default(),
        }
    }

    /// Editor rendering on the CPU backend as configured.
    pub fn from_config(cfg: &ThumbConfig) -> ThumbResult<Self> {
        let backend = create_backend(BackendKind::Cpu, &cfg.render_settings());
        Ok(Self::new(cfg.viewport()?, backend, cfg.seed))
    }

    /// Current composition.
    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// Viewport the canvas is laid out in.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Display list for the current state.
    pub fn plan(&self) -> ScenePlan {
        compile_scene(&self.state, &self.viewport)
    }

    /// Latest rendered surface; `None` until mounted.
    pub fn surface(&self) -> Option<&RenderedCanvas> {
        self.surface.as_ref()
    }

    /// Whether the canvas has been mounted.
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Render the current state and keep re-rendering after every dispatch.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn mount(&mut self) -> ThumbResult<&RenderedCanvas> {
        let state = self.state.clone();
        let surface = self.render(&state)?;
        let surface = self.surface.insert(surface);
        Ok(&*surface)
    }

    /// Drop the rendered surface; exports fail until the next [`Editor::mount`].
    pub fn unmount(&mut self) {
        self.surface = None;
    }

    /// Apply one action.
    ///
    /// `SetBackgroundImage` decodes the image before anything changes; a decode or render
    /// failure returns the error with the composition untouched.
    pub fn dispatch(&mut self, action: Action) -> ThumbResult<()> {
        if let Action::SetBackgroundImage { uri } = &action {
            self.images.ensure(uri)?;
        }

        let mut next = self.state.clone();
        next.apply(action, &mut self.rng);

        let rendered = if self.surface.is_some() {
            self.render(&next).map(Some)
        } else {
            Ok(None)
        };
        match rendered {
            Ok(surface) => {
                self.state = next;
                if surface.is_some() {
                    self.surface = surface;
                }
                self.images.retain_only(self.state.background().image());
                Ok(())
            }
            Err(e) => {
                self.images.retain_only(self.state.background().image());
                Err(e)
            }
        }
    }

    /// Apply actions in order, stopping at the first failure.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) -> ThumbResult<()> {
        for action in actions {
            self.dispatch(action)?;
        }
        Ok(())
    }

    /// Ask `picker` for a background photo and commit it once decoded.
    ///
    /// Cancelling keeps the previous background.
    pub async fn pick_background_image<P: ImagePicker>(
        &mut self,
        picker: &P,
    ) -> ThumbResult<PickOutcome> {
        let req = PickRequest::background(self.state.aspect_ratio());
        let handle = match picker.pick(&req).await? {
            PickOutcome::Picked(handle) => handle,
            PickOutcome::Cancelled => return Ok(PickOutcome::Cancelled),
        };

        let h = handle.clone();
        let image = tokio::task::spawn_blocking(move || ImageStore::read(&h))
            .await
            .context("join image decoder task")??;
        self.images.insert(handle.clone(), image);
        self.dispatch(Action::SetBackgroundImage {
            uri: handle.clone(),
        })?;
        Ok(PickOutcome::Picked(handle))
    }

    /// Observe export phases, e.g. to disable the export trigger while busy.
    pub fn export_phase(&self) -> watch::Receiver<ExportPhase> {
        self.export.subscribe()
    }

    /// Export the mounted canvas.
    pub async fn export<C, M, P>(
        &mut self,
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
        self.export
            .run(self.surface.as_ref(), capture, media, prompt, cancel)
            .await
    }

    fn render(&mut self, state: &CompositionState) -> ThumbResult<RenderedCanvas> {
        let plan = compile_scene(state, &self.viewport);
        let frame = self.backend.render_scene(&plan, &self.images)?;
        Ok(RenderedCanvas {
            frame: Arc::new(frame),
            canvas: plan.canvas,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/editor.rs"]
mod tests;
