use super::*;

#[test]
fn wide_canvas_is_ninety_percent_of_viewport() {
    let vp = Viewport::new(400.0, 1.0).unwrap();
    let size = canvas_logical_size(AspectRatio::Wide, &vp);
    assert!((size.width - 360.0).abs() < 1e-9);
    assert!((size.height - 202.5).abs() < 1e-9);
    assert_eq!(
        canvas_for(AspectRatio::Wide, &vp),
        Canvas {
            width: 360,
            height: 203
        }
    );
}

#[test]
fn square_canvas_height_equals_width() {
    let vp = Viewport::new(400.0, 2.0).unwrap();
    assert_eq!(
        canvas_for(AspectRatio::Square, &vp),
        Canvas {
            width: 720,
            height: 720
        }
    );
}

#[test]
fn tiny_viewports_still_produce_a_pixel() {
    let vp = Viewport::new(0.01, 1.0).unwrap();
    let c = canvas_for(AspectRatio::Wide, &vp);
    assert_eq!((c.width, c.height), (1, 1));
}
