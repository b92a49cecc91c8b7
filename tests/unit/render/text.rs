use super::*;

fn system_fonts() -> Option<FontSet> {
    match FontSet::resolve(&FontSources::default()) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("skipping: {e}");
            None
        }
    }
}

#[test]
fn sha256_hex_is_lowercase_and_stable() {
    let face = FontFace {
        label: "x".to_owned(),
        bytes: Arc::new(b"abc".to_vec()),
        index: 0,
    };
    assert_eq!(
        face.sha256_hex(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn missing_font_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let sources = FontSources {
        regular: Some(dir.path().join("nope.ttf")),
        bold: None,
    };
    assert!(FontSet::resolve(&sources).is_err());
}

#[test]
fn brush_takes_opaque_hex_color() {
    let b = TextBrushRgba8::from(HexColor::rgb(1, 2, 3));
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 255));
}

#[test]
fn font_sources_reject_unknown_fields() {
    assert!(serde_json::from_str::<FontSources>(r#"{"italic":"x.ttf"}"#).is_err());
    let s: FontSources = serde_json::from_str(r#"{"bold":"b.ttf"}"#).unwrap();
    assert_eq!(s.bold, Some(PathBuf::from("b.ttf")));
    assert!(s.regular.is_none());
}

#[test]
fn long_text_wraps_within_max_width() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    let text = "the quick brown fox jumps over the lazy dog ".repeat(8);
    let layout = engine
        .layout_plain(
            &text,
            FontWeight::Regular,
            24.0,
            TextBrushRgba8::default(),
            200.0,
        )
        .unwrap();
    assert!(layout.lines().count() > 1);
    for line in layout.lines() {
        // Trailing spaces may hang past the wrap width.
        assert!(line.metrics().advance <= 200.0 + 24.0);
    }
}

#[test]
fn bold_and_regular_both_lay_out() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    for weight in [FontWeight::Regular, FontWeight::Bold] {
        let layout = engine
            .layout_plain("Hello", weight, 30.0, TextBrushRgba8::default(), 500.0)
            .unwrap();
        assert_eq!(layout.lines().count(), 1);
        assert!(layout.height() > 0.0);
    }
}

#[test]
fn non_positive_size_is_rejected() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    assert!(
        engine
            .layout_plain("x", FontWeight::Regular, 0.0, TextBrushRgba8::default(), 10.0)
            .is_err()
    );
}
