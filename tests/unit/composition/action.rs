use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::composition::model::Background;

#[test]
fn script_parses_every_op_shape() {
    let json = r##"[
        { "op": "set_aspect_ratio", "ratio": "1:1" },
        { "op": "random_solid_background" },
        { "op": "random_gradient_background" },
        { "op": "set_background_image", "uri": "file:///tmp/a.png" },
        { "op": "set_background_color", "color": "#123456" },
        { "op": "set_background_gradient", "start": "#ff0000", "end": "#0000ff" },
        { "op": "set_text", "layer": "title", "text": "Hello" },
        { "op": "set_text_color", "layer": "subtitle", "color": "#abc" },
        { "op": "adjust_font_size", "layer": "description", "step": "increase" },
        { "op": "open_color_picker", "target": { "text": "title" } },
        { "op": "open_color_picker", "target": "background" },
        { "op": "pick_color", "color": "#00ff00" },
        { "op": "close_color_picker" },
        { "op": "reset" }
    ]"##;
    let actions = parse_script(json).unwrap();
    assert_eq!(actions.len(), 14);
    assert_eq!(
        actions[0],
        Action::SetAspectRatio {
            ratio: AspectRatio::Square
        }
    );
    assert_eq!(
        actions[9],
        Action::OpenColorPicker {
            target: ColorTarget::Text(TextLayerId::Title)
        }
    );
}

#[test]
fn script_rejects_bad_colors_and_unknown_ops() {
    assert!(parse_script(r#"[{ "op": "set_background_color", "color": "blue" }]"#).is_err());
    assert!(parse_script(r#"[{ "op": "undo" }]"#).is_err());
    assert!(parse_script(r#"{ "op": "reset" }"#).is_err());
}

#[test]
fn reducer_matches_direct_mutations() {
    let actions = vec![
        Action::SetAspectRatio {
            ratio: AspectRatio::Square,
        },
        Action::SetText {
            layer: TextLayerId::Title,
            text: "Hello".to_string(),
        },
        Action::AdjustFontSize {
            layer: TextLayerId::Title,
            step: FontStep::Increase,
        },
        Action::AdjustFontSize {
            layer: TextLayerId::Title,
            step: FontStep::Increase,
        },
        Action::SetBackgroundGradient {
            start: HexColor::rgb(255, 0, 0),
            end: HexColor::rgb(0, 0, 255),
        },
    ];

    let mut rng = StdRng::seed_from_u64(1);
    let mut s = CompositionState::new();
    for a in actions {
        s.apply(a, &mut rng);
    }
    assert_eq!(s.aspect_ratio(), AspectRatio::Square);
    assert_eq!(s.text_layer(TextLayerId::Title).font_size(), 34);
    assert_eq!(
        s.background().gradient_stops(),
        Some((HexColor::rgb(255, 0, 0), HexColor::rgb(0, 0, 255)))
    );
}

#[test]
fn random_actions_are_reproducible_with_a_seeded_rng() {
    let run = || {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut s = CompositionState::new();
        s.apply(Action::RandomGradientBackground, &mut rng);
        s.apply(Action::RandomSolidBackground, &mut rng);
        s
    };
    let a = run();
    assert_eq!(a, run());
    assert!(matches!(a.background(), Background::Solid { .. }));
}

#[test]
fn picker_actions_route_through_the_target() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut s = CompositionState::new();
    s.apply(
        Action::OpenColorPicker {
            target: ColorTarget::Text(TextLayerId::Description),
        },
        &mut rng,
    );
    s.apply(
        Action::PickColor {
            color: HexColor::rgb(10, 20, 30),
        },
        &mut rng,
    );
    assert_eq!(
        s.text_layer(TextLayerId::Description).color(),
        HexColor::rgb(10, 20, 30)
    );
    assert_eq!(s.active_color_target(), None);
}
