use std::{
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use super::*;
use crate::{
    composition::model::{AspectRatio, Background, FontStep, TextLayerId},
    export::{
        capture::PngCapture,
        media::{GalleryDir, Permission},
        picker::PathPicker,
        pipeline::{PermissionChoice, SAVE_FAILED_NOTICE},
    },
    foundation::{color::HexColor, core::ResourceHandle, error::ThumbError},
    render::backend::FrameRGBA,
};

#[derive(Clone, Default)]
struct Recorder {
    renders: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    last_plan: Arc<Mutex<Option<ScenePlan>>>,
}

struct FakeBackend(Recorder);

impl RenderBackend for FakeBackend {
    fn render_scene(&mut self, plan: &ScenePlan, _images: &ImageStore) -> ThumbResult<FrameRGBA> {
        if self.0.fail.load(Ordering::SeqCst) {
            return Err(ThumbError::render("backend down"));
        }
        self.0.renders.fetch_add(1, Ordering::SeqCst);
        *self.0.last_plan.lock().unwrap() = Some(plan.clone());
        let (w, h) = (plan.canvas.width, plan.canvas.height);
        Ok(FrameRGBA {
            width: w,
            height: h,
            data: vec![255; (w * h * 4) as usize],
            premultiplied: true,
        })
    }
}

fn editor() -> (Editor, Recorder) {
    let seen = Recorder::default();
    let e = Editor::new(
        Viewport::new(100.0, 1.0).unwrap(),
        Box::new(FakeBackend(seen.clone())),
        Some(1),
    );
    (e, seen)
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    path
}

#[test]
fn unmounted_editor_mutates_without_rendering() {
    let (mut e, seen) = editor();
    e.dispatch(Action::SetText {
        layer: TextLayerId::Title,
        text: "Hi".into(),
    })
    .unwrap();
    assert_eq!(e.state().text_layer(TextLayerId::Title).content(), "Hi");
    assert_eq!(seen.renders.load(Ordering::SeqCst), 0);
    assert!(e.surface().is_none());
}

#[test]
fn mounted_editor_rerenders_after_every_dispatch() {
    let (mut e, seen) = editor();
    let canvas = e.mount().unwrap().canvas;
    assert_eq!((canvas.width, canvas.height), (90, 51));

    e.dispatch(Action::SetAspectRatio {
        ratio: AspectRatio::Square,
    })
    .unwrap();
    e.dispatch(Action::AdjustFontSize {
        layer: TextLayerId::Title,
        step: FontStep::Increase,
    })
    .unwrap();
    assert_eq!(seen.renders.load(Ordering::SeqCst), 3);

    let surface = e.surface().unwrap();
    assert_eq!((surface.canvas.width, surface.canvas.height), (90, 90));
    assert_eq!(seen.last_plan.lock().unwrap().clone().unwrap(), e.plan());
}

#[test]
fn render_failure_leaves_state_and_surface_untouched() {
    let (mut e, seen) = editor();
    e.mount().unwrap();
    let before = e.surface().unwrap().frame.clone();

    seen.fail.store(true, Ordering::SeqCst);
    let err = e
        .dispatch(Action::SetAspectRatio {
            ratio: AspectRatio::Square,
        })
        .unwrap_err();
    assert!(matches!(err, ThumbError::Render(_)));
    assert_eq!(e.state().aspect_ratio(), AspectRatio::Wide);
    assert!(Arc::ptr_eq(&e.surface().unwrap().frame, &before));
}

#[test]
fn background_image_loads_before_commit() {
    let dir = tempfile::tempdir().unwrap();
    let (mut e, _) = editor();
    e.dispatch(Action::SetBackgroundColor {
        color: HexColor::rgb(1, 2, 3),
    })
    .unwrap();

    let missing = ResourceHandle::from(dir.path().join("missing.png"));
    assert!(e.dispatch(Action::SetBackgroundImage { uri: missing }).is_err());
    assert_eq!(
        e.state().background(),
        &Background::Solid {
            color: HexColor::rgb(1, 2, 3)
        }
    );

    let good = ResourceHandle::from(write_png(dir.path(), "ok.png"));
    e.dispatch(Action::SetBackgroundImage { uri: good.clone() })
        .unwrap();
    assert_eq!(e.state().background().image(), Some(&good));
    assert!(e.images.contains(&good));

    // Switching away releases the decoded image.
    e.dispatch(Action::RandomSolidBackground).unwrap();
    assert!(e.state().background().image().is_none());
    assert!(e.images.is_empty());
}

#[test]
fn seeded_editors_randomize_identically() {
    let (mut a, _) = editor();
    let (mut b, _) = editor();
    for e in [&mut a, &mut b] {
        e.dispatch(Action::RandomGradientBackground).unwrap();
    }
    assert_eq!(a.state(), b.state());
}

#[tokio::test]
async fn cancelled_pick_keeps_previous_background() {
    let (mut e, _) = editor();
    e.dispatch(Action::RandomSolidBackground).unwrap();
    let before = e.state().clone();
    let out = e
        .pick_background_image(&PathPicker::new(None))
        .await
        .unwrap();
    assert_eq!(out, PickOutcome::Cancelled);
    assert_eq!(e.state(), &before);
}

#[tokio::test]
async fn picked_image_becomes_the_background() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "pic.png");
    let (mut e, seen) = editor();
    e.mount().unwrap();

    let out = e
        .pick_background_image(&PathPicker::new(Some(path.clone())))
        .await
        .unwrap();
    assert_eq!(out, PickOutcome::Picked(ResourceHandle::from(path.clone())));
    assert_eq!(
        e.state().background().image(),
        Some(&ResourceHandle::from(path))
    );
    assert_eq!(seen.renders.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn undecodable_pick_is_an_error_and_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png").unwrap();
    let (mut e, _) = editor();
    let before = e.state().clone();
    assert!(
        e.pick_background_image(&PathPicker::new(Some(path)))
            .await
            .is_err()
    );
    assert_eq!(e.state(), &before);
    assert!(e.images.is_empty());
}

#[tokio::test]
async fn export_before_mount_fails_and_after_mount_saves() {
    let dir = tempfile::tempdir().unwrap();
    let gallery = GalleryDir::new(dir.path().join("gallery"), true);
    let (mut e, _) = editor();
    let cancel = CancelToken::new();

    let out = e
        .export(&PngCapture, &gallery, &PermissionChoice::Cancel, &cancel)
        .await;
    assert!(matches!(out, ExportOutcome::Failed { .. }));
    assert_eq!(gallery.permission().await.unwrap(), Permission::Undetermined);

    e.mount().unwrap();
    let before = e.state().clone();
    let out = e
        .export(&PngCapture, &gallery, &PermissionChoice::Cancel, &cancel)
        .await;
    let ExportOutcome::Saved(saved) = out else {
        panic!("expected save, got {out:?}");
    };
    let png = image::open(saved.uri.to_path().unwrap()).unwrap();
    assert_eq!((png.width(), png.height()), (90, 51));
    assert_eq!(e.state(), &before);
    assert_eq!(*e.export_phase().borrow(), ExportPhase::Idle);
}

#[tokio::test]
async fn unmounted_editor_cannot_export_until_remounted() {
    let dir = tempfile::tempdir().unwrap();
    let gallery = GalleryDir::new(dir.path().join("gallery"), true);
    let (mut e, _) = editor();
    e.mount().unwrap();
    assert!(e.is_mounted());

    e.unmount();
    assert!(!e.is_mounted());
    assert!(e.surface().is_none());
    let out = e
        .export(
            &PngCapture,
            &gallery,
            &PermissionChoice::Cancel,
            &CancelToken::new(),
        )
        .await;
    assert_eq!(
        out,
        ExportOutcome::Failed {
            notice: SAVE_FAILED_NOTICE.to_owned()
        }
    );
    assert!(!gallery.dir().exists());

    e.mount().unwrap();
    let out = e
        .export(
            &PngCapture,
            &gallery,
            &PermissionChoice::Cancel,
            &CancelToken::new(),
        )
        .await;
    assert!(matches!(out, ExportOutcome::Saved(_)));
}

#[tokio::test]
async fn denied_export_stays_idle_and_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let gallery = GalleryDir::new(dir.path(), false);
    let (mut e, _) = editor();
    e.mount().unwrap();
    let out = e
        .export(
            &PngCapture,
            &gallery,
            &PermissionChoice::OpenSettings,
            &CancelToken::new(),
        )
        .await;
    assert_eq!(
        out,
        ExportOutcome::PermissionDenied {
            settings_opened: true
        }
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(*e.export_phase().borrow(), ExportPhase::Idle);
}
