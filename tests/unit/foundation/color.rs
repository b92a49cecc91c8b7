use rand::{SeedableRng, rngs::StdRng};

use super::*;

fn is_canonical_hex(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 7
        && b[0] == b'#'
        && b[1..]
            .iter()
            .all(|c| c.is_ascii_digit() || (b'A'..=b'F').contains(c))
}

#[test]
fn parses_long_short_and_mixed_case() {
    assert_eq!(HexColor::parse("#ff0000").unwrap(), HexColor::rgb(255, 0, 0));
    assert_eq!(HexColor::parse("#0000FF").unwrap(), HexColor::rgb(0, 0, 255));
    assert_eq!(HexColor::parse("a1B2c3").unwrap(), HexColor::rgb(0xa1, 0xb2, 0xc3));
    assert_eq!(HexColor::parse("#000").unwrap(), HexColor::BLACK);
    assert_eq!(HexColor::parse("#fff").unwrap(), HexColor::WHITE);
}

#[test]
fn rejects_malformed_input() {
    assert!(HexColor::parse("").is_err());
    assert!(HexColor::parse("#12345").is_err());
    assert!(HexColor::parse("#12345678").is_err());
    assert!(HexColor::parse("#GG0000").is_err());
}

#[test]
fn formats_uppercase_six_digits() {
    assert_eq!(HexColor::WHITE.to_string(), "#FFFFFF");
    assert_eq!(HexColor::rgb(0x0a, 0xbc, 0x01).to_string(), "#0ABC01");
}

#[test]
fn random_colors_are_always_canonical() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2_000 {
        let c = HexColor::random(&mut rng);
        let s = c.to_string();
        assert!(is_canonical_hex(&s), "bad color {s}");
        assert_eq!(HexColor::parse(&s).unwrap(), c);
    }
}

#[test]
fn random_is_deterministic_for_a_seed() {
    let a = HexColor::random(&mut StdRng::seed_from_u64(42));
    let b = HexColor::random(&mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}

#[test]
fn serde_uses_hex_strings() {
    let c: HexColor = serde_json::from_str("\"#ff8000\"").unwrap();
    assert_eq!(c, HexColor::rgb(255, 128, 0));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#FF8000\"");
    assert!(serde_json::from_str::<HexColor>("\"red\"").is_err());
}
