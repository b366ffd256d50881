use mstcomp::prelude::*;
use mstir::prelude::*;
use num_complex::Complex64;
use rstest::rstest;

fn real(src: &str) -> Folded<RealField> {
    Parsed::parse(src).unwrap().fold(RealField).unwrap()
}

#[rstest]
#[case("2 + 3 * x", 3.0, 11.0)]
#[case("(2 + 3) * x", 3.0, 15.0)]
#[case("x ^ 2 ^ 3", 2.0, 256.0)]
#[case("-x ^ 2", 3.0, -9.0)]
#[case("(-x) ^ 2", 3.0, 9.0)]
#[case("x - 1 - 1", 5.0, 3.0)]
#[case("x / 2 / 2", 8.0, 2.0)]
#[case("x * -2", 4.0, -8.0)]
#[case("sqrt(x) + abs(-x)", 4.0, 6.0)]
#[case("pow(x, 3)", 2.0, 8.0)]
fn compiled_precedence(#[case] src: &str, #[case] x: f64, #[case] expected: f64) {
    let folded = real(src);
    assert_eq!(folded.compile(&BytecodeBackend).unwrap().invoke_indexed(&[x]), Ok(expected));
    assert_eq!(folded.compile(&ClosureBackend).unwrap().invoke_indexed(&[x]), Ok(expected));
    assert_eq!(folded.compile(&NativeF64Backend).unwrap().invoke_indexed(&[x]), Ok(expected));
}

#[test]
fn constant_trees_need_no_arguments() {
    let compiled = real("sin(0) + 2 ^ 10").compile(&NativeF64Backend).unwrap();
    assert!(compiled.is_constant());
    assert_eq!(compiled.invoke(&bindings! { "unused" => 1.0 }), Ok(1024.0));
    assert_eq!(compiled.invoke_indexed(&[]), Ok(1024.0));
}

#[test]
fn constant_trees_still_check_arity() {
    let compiled = real("1 + 1")
        .with_indexer(SymbolIndexer::new(["x"]))
        .compile(&BytecodeBackend)
        .unwrap();
    assert!(compiled.is_constant());
    assert_eq!(compiled.invoke_indexed(&[7.0]), Ok(2.0));
    assert_eq!(
        compiled.invoke_indexed(&[]),
        Err(EvalError::ArityMismatch {
            expected: 1,
            found: 0
        })
    );
}

#[test]
fn argument_count_is_checked() {
    let folded = real("x * y");
    assert_eq!(folded.indexer(), &SymbolIndexer::new(["x", "y"]));
    for result in [
        folded.compile(&BytecodeBackend).unwrap().invoke_indexed(&[1.0]),
        folded.compile(&ClosureBackend).unwrap().invoke_indexed(&[1.0, 2.0, 3.0]),
        folded.compile(&NativeF64Backend).unwrap().invoke_indexed(&[]),
    ] {
        assert!(result.unwrap_err().is_arity_mismatch());
    }
}

#[test]
fn missing_bindings_fail_at_invocation() {
    let compiled = real("x + y").compile(&ClosureBackend).unwrap();
    assert_eq!(
        compiled.invoke(&bindings! { "x" => 1.0 }),
        Err(EvalError::UnboundSymbol {
            symbol: Symbol::new("y")
        })
    );
}

#[test]
fn symbols_outside_the_indexer_fail_at_compile_time() {
    let err = real("x + y")
        .with_indexer(SymbolIndexer::new(["x"]))
        .compile(&BytecodeBackend)
        .unwrap_err();
    assert_eq!(
        err,
        CompileError::UnboundSymbol {
            symbol: Symbol::new("y")
        }
    );
}

#[test]
fn unsupported_operations_fail_before_compilation() {
    let err = Parsed::parse("x / 2").unwrap().fold(IntRing).unwrap_err();
    assert!(err.is_unsupported_operation());
    let err = Parsed::parse("abs(z)").unwrap().lift(ComplexField).unwrap_err();
    assert!(err.is_unsupported_operation());
}

#[test]
fn arithmetic_failures_surface_at_invocation() {
    let compiled = Parsed::parse("2 ^ n")
        .unwrap()
        .fold(IntRing)
        .unwrap()
        .compile(&BytecodeBackend)
        .unwrap();
    assert_eq!(compiled.invoke_indexed(&[10]), Ok(1024));
    assert!(compiled.invoke_indexed(&[-1]).unwrap_err().is_arithmetic());
}

#[test]
fn generic_backends_handle_complex_numbers() {
    let folded = Parsed::parse("2 + 2 * (2 + 2)").unwrap().fold(ComplexField).unwrap();
    assert_eq!(folded.value(), Some(&Complex64::new(10.0, 0.0)));

    let folded = Parsed::parse("z * i + 1").unwrap().fold(ComplexField).unwrap();
    assert_eq!(folded.indexer(), &SymbolIndexer::new(["z", "i"]));
    let z = Complex64::new(0.0, 1.0);
    let expected = Complex64::new(0.0, 0.0);
    let compiled: [Box<dyn IndexedExpression<Complex64>>; 2] = [
        Box::new(folded.compile(&BytecodeBackend).unwrap()),
        Box::new(folded.compile(&ClosureBackend).unwrap()),
    ];
    for compiled in compiled {
        assert_eq!(compiled.invoke_indexed(&[z, Complex64::i()]), Ok(expected));
        assert_eq!(compiled.invoke(&bindings! { "z" => z }), Ok(expected));
    }
}

#[test]
fn signed_zero_literals_stay_distinct() {
    let src = "x * 0 + 1 / (y * -0)";
    let arguments = bindings! { "x" => 1.0, "y" => 1.0 };
    let interpreted = Parsed::parse(src).unwrap().interpret(RealField).invoke(&arguments);
    assert_eq!(interpreted, Ok(f64::NEG_INFINITY));

    let folded = real(src);
    assert_eq!(folded.compile(&BytecodeBackend).unwrap().invoke(&arguments), interpreted);
    assert_eq!(folded.compile(&ClosureBackend).unwrap().invoke(&arguments), interpreted);
    assert_eq!(folded.compile(&NativeF64Backend).unwrap().invoke(&arguments), interpreted);
}

#[test]
fn deep_trees_evaluate_without_recursion() {
    const DEPTH: usize = 20_000;
    // Building and folding recurse, so they get a large stack.
    let folded = std::thread::Builder::new()
        .stack_size(256 << 20)
        .spawn(|| {
            let tree = (0..DEPTH).fold(Mst::symbol("x"), |acc, _| acc + 1);
            let folded = Parsed::from_tree(tree).fold(RealField).unwrap();
            let refolded = folded.typed().evaluate_constants(&RealField).unwrap();
            assert_eq!(&refolded, folded.typed());
            folded
        })
        .unwrap()
        .join()
        .unwrap();

    let handle = std::thread::Builder::new()
        .stack_size(256 << 10)
        .spawn(move || {
            let bytecode = folded.compile(&BytecodeBackend).unwrap();
            let arguments = bindings! { "x" => 0.5 };
            (
                folded.typed().interpret(&RealField, &arguments),
                bytecode.invoke_indexed(&[0.5]),
            )
        })
        .unwrap();
    let (interpreted, compiled) = handle.join().unwrap();
    let expected = 0.5 + DEPTH as f64;
    assert_eq!(interpreted, Ok(expected));
    assert_eq!(compiled, Ok(expected));
}

#[test]
fn big_integers_do_not_overflow() {
    let folded = Parsed::parse("x ^ 40 + 1").unwrap().fold(BigIntRing).unwrap();
    let x = num_bigint::BigInt::from(3);
    let expected = x.pow(40) + 1;
    let compiled = folded.compile(&ClosureBackend).unwrap();
    assert_eq!(compiled.invoke(&bindings! { "x" => x }), Ok(expected));
}

#[test]
fn compiled_expressions_are_shareable() {
    let compiled = std::sync::Arc::new(real("x * x + 1").compile(&BytecodeBackend).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|k| {
            let compiled = compiled.clone();
            std::thread::spawn(move || compiled.invoke_indexed(&[k as f64]))
        })
        .collect();
    for (k, handle) in handles.into_iter().enumerate() {
        let x = k as f64;
        assert_eq!(handle.join().unwrap(), Ok(x * x + 1.0));
    }
}

#[test]
fn native_rows() {
    let folded = real("2 * x + y");
    let Compiled::Procedure(native) = folded.compile(&NativeF64Backend).unwrap() else {
        panic!("tree has free symbols");
    };
    let rows: [&[f64]; 3] = [&[1.0, 0.0], &[2.0, 1.0], &[0.5, -1.0]];
    assert_eq!(native.invoke_rows(rows), Ok(vec![2.0, 5.0, 0.0]));
}
