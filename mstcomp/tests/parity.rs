use mstcomp::prelude::*;
use mstir::prelude::*;
use proptest::prelude::*;
use strum::IntoEnumIterator;

const SYMBOLS: [&str; 3] = ["x", "y", "z"];

fn leaf() -> impl Strategy<Value = Mst> {
    prop_oneof![
        (0i64..10).prop_map(Mst::number),
        prop::sample::select(SYMBOLS.to_vec()).prop_map(Mst::symbol),
    ]
}

fn ring_tree() -> impl Strategy<Value = Mst> {
    leaf().prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            3 => (inner.clone(), inner.clone(), prop::sample::select(vec!["+", "-", "*"]))
                .prop_map(|(l, r, op)| Mst::binary(op, l, r)),
            1 => inner.prop_map(|x| -x),
        ]
    })
}

fn field_tree() -> impl Strategy<Value = Mst> {
    leaf().prop_recursive(5, 48, 2, |inner| {
        prop_oneof![
            3 => (
                inner.clone(),
                inner.clone(),
                prop::sample::select(vec!["+", "-", "*", "/", "pow"]),
            )
                .prop_map(|(l, r, op)| Mst::binary(op, l, r)),
            1 => (inner, prop::sample::select(vec!["-", "sin", "exp", "sqrt", "abs"]))
                .prop_map(|(x, op)| Mst::unary(op, x)),
        ]
    })
}

fn constant_leaf() -> impl Strategy<Value = Mst> {
    prop_oneof![
        3 => leaf(),
        1 => prop::sample::select(vec!["pi", "e"]).prop_map(Mst::symbol),
        1 => Just(Mst::number(-0.0)),
        1 => Just(-Mst::number(0)),
    ]
}

fn named_constant_tree() -> impl Strategy<Value = Mst> {
    constant_leaf().prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            3 => (inner.clone(), inner.clone(), prop::sample::select(vec!["+", "-", "*", "/"]))
                .prop_map(|(l, r, op)| Mst::binary(op, l, r)),
            1 => (inner, prop::sample::select(vec!["-", "sin", "exp"]))
                .prop_map(|(x, op)| Mst::unary(op, x)),
        ]
    })
}

/// Bit equality, with every `NaN` equal to every other.
fn identical(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn real_backends_agree_with_the_interpreter(
        tree in field_tree(),
        values in prop::array::uniform3(-4.0f64..4.0),
    ) {
        let parsed = Parsed::from_tree(tree);
        let folded = parsed.fold(RealField).unwrap().with_indexer(SymbolIndexer::new(SYMBOLS));
        let bindings: Bindings<f64> = SYMBOLS.iter().map(|s| Symbol::new(s)).zip(values).collect();
        let expected = parsed.interpret(RealField).invoke(&bindings).unwrap();

        let bytecode = folded.compile(&BytecodeBackend).unwrap();
        let closure = folded.compile(&ClosureBackend).unwrap();
        let native = folded.compile(&NativeF64Backend).unwrap();
        for found in [
            bytecode.invoke_indexed(&values).unwrap(),
            closure.invoke_indexed(&values).unwrap(),
            native.invoke_indexed(&values).unwrap(),
            native.invoke(&bindings).unwrap(),
        ] {
            prop_assert!(same(found, expected), "{found} != {expected}");
        }
    }

    #[test]
    fn ring_backends_agree_with_the_interpreter(
        tree in ring_tree(),
        values in prop::array::uniform3(-50i64..50),
    ) {
        let parsed = Parsed::from_tree(tree);
        let bindings: Bindings<i64> = SYMBOLS.iter().map(|s| Symbol::new(s)).zip(values).collect();
        let expected = parsed.interpret(IntRing).invoke(&bindings);

        for folded in [parsed.fold(IntRing).unwrap(), parsed.lift(IntRing).unwrap()] {
            let bytecode = folded.compile(&BytecodeBackend).unwrap();
            let closure = folded.compile(&ClosureBackend).unwrap();
            prop_assert_eq!(&bytecode.invoke(&bindings), &expected);
            prop_assert_eq!(&closure.invoke(&bindings), &expected);
        }
    }

    #[test]
    fn compiled_expressions_are_deterministic(
        tree in field_tree(),
        values in prop::array::uniform3(-4.0f64..4.0),
    ) {
        let folded = Parsed::from_tree(tree)
            .fold(RealField)
            .unwrap()
            .with_indexer(SymbolIndexer::new(SYMBOLS));
        let native = folded.compile(&NativeF64Backend).unwrap();
        let first = native.invoke_indexed(&values).unwrap();
        let second = native.invoke_indexed(&values).unwrap();
        prop_assert!(same(first, second));
    }

    #[test]
    fn default_argument_order_agrees_across_configurations(
        tree in named_constant_tree(),
        values in prop::array::uniform3(-4.0f64..4.0),
        constants in prop::option::of((-4.0f64..4.0, -4.0f64..4.0)),
    ) {
        let text = tree.to_string();
        let mut bindings: Bindings<f64> =
            SYMBOLS.iter().map(|s| Symbol::new(s)).zip(values).collect();
        if let Some((pi, e)) = constants {
            bindings.insert(Symbol::new("pi"), pi);
            bindings.insert(Symbol::new("e"), e);
        }
        let expected = Parsed::from_tree(tree).interpret(RealField).invoke(&bindings).unwrap();

        for backend in BackendKind::iter() {
            for fold_constants in [true, false] {
                let expr = Toolchain::new(PipelineConfig { backend, fold_constants })
                    .build_real(&text)
                    .unwrap();
                let found = expr.invoke(&bindings).unwrap();
                prop_assert!(
                    identical(found, expected),
                    "{backend} (folding {fold_constants}) on `{text}`: {found:?} != {expected:?}"
                );

                let arguments: Vec<f64> = expr
                    .indexer()
                    .iter()
                    .map(|symbol| {
                        bindings
                            .get(symbol)
                            .copied()
                            .or_else(|| RealField.bind_symbol(symbol))
                            .unwrap()
                    })
                    .collect();
                let found = expr.invoke_indexed(&arguments).unwrap();
                prop_assert!(identical(found, expected), "{backend} indexed on `{text}`");
            }
        }
    }
}
