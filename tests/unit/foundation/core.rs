use super::*;

#[test]
fn viewport_rejects_degenerate_values() {
    assert!(Viewport::new(390.0, 2.0).is_ok());
    assert!(Viewport::new(0.0, 2.0).is_err());
    assert!(Viewport::new(f64::NAN, 2.0).is_err());
    assert!(Viewport::new(390.0, 0.0).is_err());
    assert!(Viewport::new(390.0, f64::INFINITY).is_err());
}

#[test]
fn resource_handle_resolves_file_uris_and_paths() {
    let h = ResourceHandle::new("file:///tmp/photo.png");
    assert_eq!(h.to_path().unwrap(), PathBuf::from("/tmp/photo.png"));

    let h = ResourceHandle::new("photos/cat.jpg");
    assert_eq!(h.to_path().unwrap(), PathBuf::from("photos/cat.jpg"));

    assert!(ResourceHandle::new("content://media/1").to_path().is_err());
    assert!(ResourceHandle::new("  ").to_path().is_err());
}

#[test]
fn resource_handle_serializes_as_plain_string() {
    let h = ResourceHandle::new("a.png");
    assert_eq!(serde_json::to_string(&h).unwrap(), "\"a.png\"");
}
