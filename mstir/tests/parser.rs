use mstir::mst::{Mst, func};
use mstir::prelude::*;
use rstest::rstest;

fn eval_real(src: &str) -> f64 {
    let tree = parse(src).expect("parse should succeed");
    evaluate(&tree, &RealField, &Bindings::new()).expect("evaluation should succeed")
}

#[rstest]
#[case("2*2+2", 6.0)]
#[case("2+2*2", 6.0)]
#[case("2^3+2", 10.0)]
#[case("2+2^3", 10.0)]
#[case("2^3*2", 16.0)]
#[case("2*2^3", 16.0)]
#[case("2+2^3*2", 18.0)]
#[case("2*2^3+2", 18.0)]
#[case("2+2*(2+2)", 10.0)]
fn precedence_table(#[case] src: &str, #[case] expected: f64) {
    assert_eq!(eval_real(src), expected);
}

#[rstest]
#[case("-2^2", -4.0)]
#[case("(-2)^2", 4.0)]
#[case("2^-1", 0.5)]
#[case("2^3^2", 512.0)]
#[case("8/2/2", 2.0)]
#[case("8-2-2", 4.0)]
#[case("--3", 3.0)]
#[case("+3 - +1", 2.0)]
#[case("2*-3", -6.0)]
fn associativity_and_signs(#[case] src: &str, #[case] expected: f64) {
    assert_eq!(eval_real(src), expected);
}

#[test]
fn parses_to_expected_tree() {
    let x = Mst::symbol("x");
    assert_eq!(parse("x ^ 2 ^ 3").unwrap(), x.clone().pow(Mst::number(2).pow(3)));
    assert_eq!(parse("-x ^ 2").unwrap(), -x.clone().pow(2));
    assert_eq!(
        parse("sin(x) + pow(x, 2)").unwrap(),
        func::sin(&x) + func::pow(&x, 2)
    );
    assert_eq!(parse("1.5e2").unwrap(), Mst::number(150.0));
    assert_eq!(parse("  42  ").unwrap(), Mst::number(42));
}

#[test]
fn function_calls_keep_names_verbatim() {
    // Names are resolved by the algebra later, not by the parser.
    let tree = parse("atan2(y, x)").unwrap();
    match tree {
        Mst::Binary { operation, .. } => assert_eq!(operation, "atan2"),
        other => panic!("unexpected tree {other:?}"),
    }
}

#[test]
fn lexing_error_points_at_character() {
    let err = parse("2 $ 3").unwrap_err();
    assert_eq!(err.position, 2);
    assert!(err.message.contains("lexing error"));
}

#[test]
fn parse_error_points_at_token() {
    let err = parse("1 + * 2").unwrap_err();
    assert_eq!(err.position, 4);
}

#[test]
fn rejects_incomplete_input() {
    for src in ["", "2 +", "(1 + 2", "sin(", "1 2", ")"] {
        assert!(parse(src).is_err(), "`{src}` should not parse");
    }
}

#[test]
fn printer_round_trips_parsed_trees() {
    for src in [
        "x + y * 2",
        "(x + y) * 2",
        "x - (y - 1)",
        "-x ^ 2",
        "(-x) ^ 2",
        "x ^ y ^ z",
        "(x ^ y) ^ z",
        "2 ^ -x",
        "sin(x + 1) / cos(y)",
        "pow(x, 2) - +y",
        "1.5 * x - 0.25",
    ] {
        let tree = parse(src).unwrap();
        let printed = tree.to_string();
        assert_eq!(parse(&printed).unwrap(), tree, "`{src}` printed as `{printed}`");
    }
}
