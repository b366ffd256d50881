use mstir::prelude::*;
use proptest::prelude::*;

const SYMBOLS: [&str; 3] = ["x", "y", "z"];

fn literal() -> impl Strategy<Value = Mst> {
    (0i64..20).prop_map(|v| Mst::number(v))
}

fn variable() -> impl Strategy<Value = Mst> {
    prop::sample::select(SYMBOLS.to_vec()).prop_map(|name| Mst::symbol(name))
}

fn grow(
    leaf: impl Strategy<Value = Mst> + 'static,
    operations: &'static [&'static str],
) -> impl Strategy<Value = Mst> {
    leaf.prop_recursive(5, 48, 2, move |inner| {
        prop_oneof![
            3 => (inner.clone(), inner.clone(), prop::sample::select(operations.to_vec()))
                .prop_map(|(l, r, op)| Mst::binary(op, l, r)),
            1 => inner.prop_map(|x| -x),
        ]
    })
}

fn ring_tree() -> impl Strategy<Value = Mst> {
    grow(prop_oneof![literal(), variable()], &["+", "-", "*"])
}

fn constant_ring_tree() -> impl Strategy<Value = Mst> {
    grow(literal(), &["+", "-", "*"])
}

fn field_tree() -> impl Strategy<Value = Mst> {
    grow(prop_oneof![literal(), variable()], &["+", "-", "*", "/", "pow"])
}

fn ring_bindings() -> impl Strategy<Value = Bindings<i64>> {
    prop::array::uniform3(-50i64..50).prop_map(|values| {
        SYMBOLS
            .iter()
            .zip(values)
            .map(|(name, value)| (Symbol::new(name), value))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn symbol_free_trees_fold_to_their_value(tree in constant_ring_tree()) {
        let folded = tree.evaluate_constants(&IntRing).unwrap();
        let expected = evaluate(&tree, &IntRing, &Bindings::new()).unwrap();
        prop_assert!(folded.is_constant());
        prop_assert_eq!(folded.value(), Some(&expected));
    }

    #[test]
    fn folding_is_idempotent(tree in ring_tree()) {
        let once = tree.evaluate_constants(&IntRing).unwrap();
        let twice = once.evaluate_constants(&IntRing).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn folding_preserves_meaning(tree in ring_tree(), bindings in ring_bindings()) {
        let folded = tree.evaluate_constants(&IntRing).unwrap();
        let expected = evaluate(&tree, &IntRing, &bindings).unwrap();
        prop_assert_eq!(folded.interpret(&IntRing, &bindings).unwrap(), expected);

        let lifted = lift(&tree, &IntRing).unwrap();
        prop_assert_eq!(lifted.interpret(&IntRing, &bindings).unwrap(), expected);
    }

    #[test]
    fn indexer_matches_tree_symbols(tree in ring_tree()) {
        let folded = tree.evaluate_constants(&IntRing).unwrap();
        prop_assert_eq!(folded.indexer(), SymbolIndexer::of(&tree));
    }

    #[test]
    fn printed_trees_parse_back(tree in field_tree()) {
        let printed = tree.to_string();
        prop_assert_eq!(parse(&printed).unwrap(), tree);
    }
}

#[test]
fn folding_reports_unsupported_operations() {
    let err = parse("x / 2").unwrap().evaluate_constants(&IntRing).unwrap_err();
    assert!(err.is_unsupported_operation());
    // Resolution happens even when the subtree is never reduced.
    let err = lift(&parse("frob(x)").unwrap(), &RealField).unwrap_err();
    assert!(err.is_unsupported_operation());
}

#[test]
fn folding_reports_arithmetic_failures() {
    let err = parse("x + 2 ^ -1").unwrap().evaluate_constants(&IntRing).unwrap_err();
    assert!(err.is_arithmetic());
}

#[test]
fn folding_works_for_every_bundled_algebra() {
    let tree = parse("2 + 2 * (2 + 2)").unwrap();
    assert_eq!(tree.evaluate_constants(&RealField).unwrap().value(), Some(&10.0));
    assert_eq!(tree.evaluate_constants(&IntRing).unwrap().value(), Some(&10));
    assert_eq!(
        tree.evaluate_constants(&BigIntRing).unwrap().value(),
        Some(&num_bigint::BigInt::from(10))
    );
    assert_eq!(
        tree.evaluate_constants(&ComplexField).unwrap().value(),
        Some(&num_complex::Complex64::new(10.0, 0.0))
    );
}
