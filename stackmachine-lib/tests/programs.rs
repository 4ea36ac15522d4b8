use pretty_assertions::assert_eq;
use stackmachine_lib::core::Value;
use stackmachine_lib::vm::{self, Vm};
use stackmachine_lib::{execute, load, load_with, DecodePolicy};

fn run(src: &str) -> Result<Vec<Value>, vm::Error> {
    let program = load(src).unwrap_or_else(|e| panic!("failed to load {src:?}: {e}"));
    execute(&program)
}

fn run_err(src: &str) -> vm::Error {
    run(src).unwrap_err().root().clone()
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

#[test]
fn integer_literals_push_their_value() {
    let cases = [
        ("0", 0),
        ("7", 7),
        ("0042", 42),
        ("9223372036854775807", i64::MAX),
        ("0x0", 0),
        ("0x2A", 42),
        ("0Xff", 255),
        ("0x7FFFFFFFFFFFFFFF", i64::MAX),
    ];
    for (literal, expected) in cases {
        assert_eq!(
            run(&format!("push {literal}")),
            Ok(ints(&[expected])),
            "literal {literal}"
        );
    }
}

#[test]
fn arithmetic_and_concatenation() {
    assert_eq!(run("push 2 push 3 add"), Ok(ints(&[5])));
    assert_eq!(run(r#"push "a" push "b" add"#), Ok(vec![Value::from("ab")]));
    assert!(matches!(
        run_err(r#"push 2 push "b" add"#),
        vm::Error::TypeMismatch { .. }
    ));
}

#[test]
fn sub_subtracts() {
    assert_eq!(run("push 5 push 3 sub"), Ok(ints(&[2])));
}

#[test]
fn operand_order_for_non_commutative_operators() {
    assert_eq!(run("push 10 push 4 sub"), Ok(ints(&[6])));
    assert_eq!(run("push 10 push 4 div"), Ok(ints(&[2])));
    assert_eq!(run("push 10 push 4 gt"), Ok(vec![Value::Bool(true)]));
    assert_eq!(run("push 4 push 10 ge"), Ok(vec![Value::Bool(false)]));
}

#[test]
fn division_by_zero_fails() {
    assert_eq!(run_err("push 7 push 0 div"), vm::Error::DivisionByZero);
}

#[test]
fn comparisons_push_booleans() {
    assert_eq!(run("push 1 push 2 lt"), Ok(vec![Value::Bool(true)]));
    assert_eq!(run("push 2 push 1 lt"), Ok(vec![Value::Bool(false)]));
    assert_eq!(run(r#"push "b" push "a" le"#), Ok(vec![Value::Bool(false)]));
}

#[test]
fn jp_skips_instructions() {
    assert_eq!(run("push 1 jp 1 push 99 push 2"), Ok(ints(&[2, 1])));
    assert_eq!(run("push 1 jp 0 push 2"), Ok(ints(&[2, 1])));
    assert_eq!(run("jp 0x2 push 1 push 2 push 3"), Ok(ints(&[3])));
    assert_eq!(run("push 1 jp 100"), Ok(ints(&[1])));
}

#[test]
fn jpn_jumps_unless_condition_holds() {
    assert_eq!(run("push 0 jpn 1 push 1 push 2"), Ok(ints(&[2])));
    assert_eq!(run("push 1 jpn 1 push 1 push 2"), Ok(ints(&[2, 1])));
    assert_eq!(run("push 3 push 4 lt jpn 1 push 10 push 20"), Ok(ints(&[20, 10])));
    assert_eq!(run("push 4 push 3 lt jpn 1 push 10 push 20"), Ok(ints(&[20])));
    assert_eq!(run("push FALSE jpn 0 push 1"), Ok(ints(&[1])));
    assert!(matches!(
        run_err(r#"push "yes" jpn 1"#),
        vm::Error::InvalidCondition { .. }
    ));
}

#[test]
fn popping_an_empty_stack_underflows() {
    for src in [
        "add",
        "push 1 sub",
        "push 1 push 2 add add",
        "jpn 0",
        "push 1 push 1 lt jpn 0 jpn 0",
    ] {
        assert_eq!(run_err(src), vm::Error::StackUnderflow, "{src}");
    }
}

#[test]
fn empty_hex_literal_fails_at_runtime() {
    let program = load("push 1 push 0x").unwrap();
    let err = execute(&program).unwrap_err();
    assert!(matches!(err, vm::Error::At { pc: 1, .. }));
    assert!(matches!(err.root(), vm::Error::MalformedNumber { .. }));
}

#[test]
fn strings_are_unescaped_when_pushed() {
    let src = "push \"tab\\z   \n   stop \\\"quoted\\\" back\\\\slash\"";
    assert_eq!(
        run(src),
        Ok(vec![Value::from("tabstop \"quoted\" back\\slash")])
    );
}

#[test]
fn trailing_backslash_closes_the_string() {
    assert_eq!(
        run(r#"push "C:\" push 1"#),
        Ok(vec![Value::Int(1), Value::from(r"C:\")])
    );
    assert_eq!(run(r#"push "a\" b""#), Ok(vec![Value::from(r#"a" b"#)]));
}

#[test]
fn labels_resolve_to_the_preceding_instruction() {
    let src = "
        push 3      #three
        push 4      #four
        mul         #product
        -- labels are only names, jumps stay relative
        jp 0        #next
    ";
    let program = load(src).unwrap();
    assert_eq!(program.labels.index_of("#three"), Some(0));
    assert_eq!(program.labels.index_of("#product"), Some(2));
    assert_eq!(program.labels.index_of("#product"), Some(2));
    assert_eq!(program.labels.index_of("#next"), Some(3));
    assert_eq!(execute(&program), Ok(ints(&[12])));
}

#[test]
fn reloading_is_deterministic() {
    let src = "push 1 #a push 2 #b add #c jpn 0 #d";
    assert_eq!(load(src).unwrap(), load(src).unwrap());
}

#[test]
fn lenient_decoding_skips_unknown_words() {
    let src = "push 1 print push 2 add";
    assert!(load(src).is_err());
    let program = load_with(src, DecodePolicy::Lenient).unwrap();
    assert_eq!(execute(&program), Ok(ints(&[3])));
}

#[test]
fn stepping_matches_running() {
    let program = load("push 2 push 3 lt jpn 1 push 7 push 8").unwrap();
    let mut vm = Vm::new();
    let mut pcs = vec![vm.pc()];
    while !vm.is_finished(&program) {
        vm.step(&program).unwrap();
        pcs.push(vm.pc());
    }
    assert_eq!(pcs, vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(vm.stack().snapshot(), execute(&program).unwrap());
    assert_eq!(vm.stack().peek(1), Some(&Value::Int(7)));
}
