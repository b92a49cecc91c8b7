use super::*;

fn surface(data: Vec<u8>, width: u32, height: u32, premultiplied: bool) -> RenderedCanvas {
    RenderedCanvas {
        frame: Arc::new(FrameRGBA {
            width,
            height,
            data,
            premultiplied,
        }),
        canvas: Canvas { width, height },
    }
}

#[tokio::test]
async fn png_capture_round_trips_pixels_with_straight_alpha() {
    // Second pixel is 50% red, premultiplied.
    let s = surface(vec![0, 0, 255, 255, 128, 0, 0, 128], 2, 1, true);
    let out = PngCapture
        .capture(&s, &CaptureRequest::default())
        .await
        .unwrap();
    assert_eq!(out.format, CaptureFormat::Png);
    assert_eq!((out.width, out.height), (2, 1));
    assert_eq!(&out.bytes[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 255, 255]);
    let p = decoded.get_pixel(1, 0).0;
    assert!(p[0] >= 254 && p[3] == 128, "{p:?}");
}

#[tokio::test]
async fn invalid_quality_is_rejected() {
    let s = surface(vec![0; 4], 1, 1, true);
    for quality in [0.0, -1.0, 1.5, f32::NAN] {
        let req = CaptureRequest {
            format: CaptureFormat::Png,
            quality,
        };
        assert!(matches!(
            PngCapture.capture(&s, &req).await,
            Err(ThumbError::Validation(_))
        ));
    }
}

#[test]
fn encode_rejects_truncated_frames() {
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(matches!(encode_png(&frame), Err(ThumbError::Export(_))));
}

#[test]
fn straight_frames_are_encoded_untouched() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![200, 100, 50, 100],
        premultiplied: false,
    };
    let png = encode_png(&frame).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, [200, 100, 50, 100]);
}
