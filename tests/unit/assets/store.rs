use super::*;

fn write_png(dir: &std::path::Path, name: &str, w: u32, h: u32) -> ResourceHandle {
    let path = dir.join(name);
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([0, 200, 0, 255]));
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    ResourceHandle::from(path)
}

#[test]
fn ensure_decodes_once_and_get_finds_it() {
    let dir = tempfile::tempdir().unwrap();
    let h = write_png(dir.path(), "a.png", 4, 2);

    let mut store = ImageStore::new();
    assert!(store.get(&h).is_err());
    let img = store.ensure(&h).unwrap();
    assert_eq!((img.width, img.height), (4, 2));
    assert!(store.contains(&h));

    // Second ensure hits the cache even if the file is gone.
    std::fs::remove_file(h.to_path().unwrap()).unwrap();
    assert!(store.ensure(&h).is_ok());
}

#[test]
fn ensure_accepts_file_uris() {
    let dir = tempfile::tempdir().unwrap();
    let h = write_png(dir.path(), "b.png", 1, 1);
    let uri = ResourceHandle::new(format!("file://{}", h.as_str()));
    let mut store = ImageStore::new();
    assert!(store.ensure(&uri).is_ok());
}

#[test]
fn missing_or_corrupt_files_are_errors_and_leave_store_empty() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, b"nope").unwrap();

    let mut store = ImageStore::new();
    assert!(store.ensure(&ResourceHandle::from(bad)).is_err());
    assert!(
        store
            .ensure(&ResourceHandle::from(dir.path().join("missing.png")))
            .is_err()
    );
    assert!(store.is_empty());
}

#[test]
fn retain_only_keeps_the_current_background() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_png(dir.path(), "a.png", 1, 1);
    let b = write_png(dir.path(), "b.png", 1, 1);
    let mut store = ImageStore::new();
    store.ensure(&a).unwrap();
    store.ensure(&b).unwrap();
    assert_eq!(store.len(), 2);

    store.retain_only(Some(&b));
    assert!(!store.contains(&a));
    assert!(store.contains(&b));

    store.retain_only(None);
    assert!(store.is_empty());
}
