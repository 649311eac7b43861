//! Raw-memory builtins, pointer operators, and import splicing.

use brook::interpreter::engine::Interpreter;
use brook::interpreter::errors::Fault;
use brook::memory::value::Value;
use pretty_assertions::assert_eq;

fn run(source: &str) -> Value {
    Interpreter::with_captured_output()
        .run_source(source)
        .expect("execution failed")
        .expect("main produced no value")
}

fn run_output(source: &str) -> String {
    let interpreter = Interpreter::with_captured_output();
    interpreter.run_source(source).expect("execution failed");
    interpreter.output()
}

fn run_fault(source: &str) -> Fault {
    Interpreter::with_captured_output()
        .run_source(source)
        .expect_err("execution should fail")
}

#[test]
fn test_alloc_write_read_free() {
    let source = r#"
        fun main() {
            var p = alloc(4);
            p[0] = 10;
            p[1] = 20;
            var r = p[0] + p[1];
            free(p);
            return r;
        }
    "#;
    assert_eq!(run(source), Value::Int(30));
}

#[test]
fn test_alloc_zero_fills() {
    let source = r#"
        fun main() {
            var p = alloc(3);
            var sum = p[0] + p[1] + p[2];
            free(p);
            return sum;
        }
    "#;
    assert_eq!(run(source), Value::Int(0));
}

#[test]
fn test_cells_hold_any_variant() {
    let source = r#"
        fun main() {
            var p = alloc(2);
            p[0] = 'x';
            p[1] = 2.5;
            var ok = (p[0] == 'x') && true;
            assert(ok);
            var sum = p[1] + p[1];
            free(p);
            return sum;
        }
    "#;
    assert_eq!(run(source), Value::Float64(5.0));
}

#[test]
fn test_realloc_preserves_and_zero_fills() {
    let source = r#"
        fun main() {
            var p = alloc(2);
            p[0] = 1;
            p[1] = 2;
            var q = realloc(p, 2, 4);
            q[3] = 4;
            var r = q[0] + q[1] + q[2] + q[3];
            free(q);
            return r;
        }
    "#;
    assert_eq!(run(source), Value::Int(7));
}

#[test]
fn test_use_after_free_is_rejected() {
    let source = r#"
        fun main() {
            var p = alloc(1);
            free(p);
            return p[0];
        }
    "#;
    assert!(matches!(run_fault(source), Fault::InvalidPointer { .. }));
}

#[test]
fn test_double_free_is_rejected() {
    let source = r#"
        fun main() {
            var p = alloc(1);
            free(p);
            free(p);
            return 0;
        }
    "#;
    assert!(matches!(run_fault(source), Fault::InvalidPointer { .. }));
}

#[test]
fn test_alloc_rejects_non_positive_sizes() {
    assert!(matches!(
        run_fault("fun main() { return alloc(0); }"),
        Fault::Alloc { .. }
    ));
    assert!(matches!(
        run_fault("fun main() { return alloc(0 - 4); }"),
        Fault::Alloc { .. }
    ));
}

#[test]
fn test_index_requires_a_pointer_base() {
    assert!(matches!(
        run_fault("fun main() { var x = 5; return x[0]; }"),
        Fault::Type { .. }
    ));
}

#[test]
fn test_pointer_operator_round_trips() {
    let source = r#"
        fun main() {
            var x = 5;
            var p = $x;
            $p = 7;
            return x;
        }
    "#;
    assert_eq!(run(source), Value::Int(7));
}

#[test]
fn test_pointer_operator_reads_through() {
    let source = r#"
        fun main() {
            var x = 11;
            var p = $x;
            x = 13;
            return $p + 1;
        }
    "#;
    assert_eq!(run(source), Value::Int(14));
}

#[test]
fn test_string_literals_live_in_the_data_section() {
    let source = r#"
        fun main() {
            var s = "abc";
            return s[1];
        }
    "#;
    assert_eq!(run(source), Value::Char('b'));
}

#[test]
fn test_println_walks_pointer_strings() {
    let source = r#"
        fun main() {
            var s = "stored";
            println(s);
        }
    "#;
    assert_eq!(run_output(source), "stored\n");
}

#[test]
fn test_strings_are_mutable_cells() {
    let source = r#"
        fun main() {
            var s = "cat";
            s[0] = 'b';
            println(s);
        }
    "#;
    assert_eq!(run_output(source), "bat\n");
}

#[test]
fn test_alloc_builds_printable_strings() {
    let source = r#"
        fun main() {
            var s = alloc(3);
            s[0] = 'h';
            s[1] = 'i';
            s[2] = '\0';
            println(s);
            free(s);
        }
    "#;
    assert_eq!(run_output(source), "hi\n");
}

mod imports {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_import_splices_tokens() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.bk"), "fun helper(n) -> n * 2;").unwrap();
        fs::write(
            dir.path().join("main.bk"),
            "import \"lib.bk\"\nfun main() -> helper(21);",
        )
        .unwrap();

        let interpreter = Interpreter::with_captured_output();
        let result = interpreter
            .run_file(dir.path().join("main.bk"))
            .expect("execution failed")
            .expect("main produced no value");
        assert_eq!(result, Value::Int(42));
    }

    #[test]
    fn test_imports_resolve_relative_to_the_importing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/inner.bk"), "fun inner() -> 7;").unwrap();
        fs::write(
            dir.path().join("nested/outer.bk"),
            "import \"inner.bk\"\nfun outer() -> inner() + 1;",
        )
        .unwrap();
        fs::write(
            dir.path().join("main.bk"),
            "import \"nested/outer.bk\"\nfun main() -> outer();",
        )
        .unwrap();

        let interpreter = Interpreter::with_captured_output();
        let result = interpreter
            .run_file(dir.path().join("main.bk"))
            .expect("execution failed")
            .expect("main produced no value");
        assert_eq!(result, Value::Int(8));
    }

    #[test]
    fn test_cyclic_imports_terminate() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.bk"),
            "import \"b.bk\"\nfun one() -> 1;",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.bk"),
            "import \"a.bk\"\nfun two() -> 2;",
        )
        .unwrap();
        fs::write(
            dir.path().join("main.bk"),
            "import \"a.bk\"\nfun main() -> one() + two();",
        )
        .unwrap();

        let interpreter = Interpreter::with_captured_output();
        let result = interpreter
            .run_file(dir.path().join("main.bk"))
            .expect("execution failed")
            .expect("main produced no value");
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn test_missing_source_file_is_an_io_fault() {
        let result = Interpreter::new().run_file("definitely/not/here.bk");
        assert!(matches!(result, Err(Fault::Io { .. })));
    }
}
