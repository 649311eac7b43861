//! Struct semantics: positional construction, constructor methods, `this`,
//! destructors, and the builtin `array` record.

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

#[test]
fn test_positional_construction() {
    let source = r#"
        struct Point { var x; var y; }

        fun main() {
            var p = Point(3, 4);
            return p.x * p.x + p.y * p.y;
        }
    "#;
    assert_eq!(run(source), Value::Int(25));
}

#[test]
fn test_extra_constructor_arguments_are_ignored() {
    let source = r#"
        struct Pair { var a; var b; }
        fun main() {
            var p = Pair(1, 2, 3);
            return p.a + p.b;
        }
    "#;
    assert_eq!(run(source), Value::Int(3));
}

#[test]
fn test_fields_default_to_zero() {
    let source = r#"
        struct Point { var x; var y; }
        fun main() {
            var p = Point(9);
            return p.x * 10 + p.y;
        }
    "#;
    assert_eq!(run(source), Value::Int(90));
}

#[test]
fn test_constructor_method() {
    let source = r#"
        struct Point {
            var x;
            var y;
            fun Point(a, b) {
                x = a;
                y = b * 2;
            }
        }

        fun main() {
            var p = Point(3, 4);
            return p.x + p.y;
        }
    "#;
    assert_eq!(run(source), Value::Int(11));
}

#[test]
fn test_methods_mutate_through_this() {
    let source = r#"
        struct Counter {
            var n;
            fun bump() { this.n = this.n + 1; }
            fun get() -> this.n;
        }

        fun main() {
            var c = Counter(5);
            c.bump();
            c.bump();
            return c.get();
        }
    "#;
    assert_eq!(run(source), Value::Int(7));
}

#[test]
fn test_field_assignment_through_dot() {
    let source = r#"
        struct Box { var value; }
        fun main() {
            var b = Box(1);
            b.value = 42;
            b.value += 8;
            return b.value;
        }
    "#;
    assert_eq!(run(source), Value::Int(50));
}

#[test]
fn test_fields_are_per_instance() {
    let source = r#"
        struct Box { var value; }
        fun main() {
            var a = Box(1);
            var b = Box(2);
            a.value = 10;
            return a.value * 10 + b.value;
        }
    "#;
    assert_eq!(run(source), Value::Int(102));
}

#[test]
fn test_nested_instances() {
    let source = r#"
        struct Inner { var v; }
        struct Outer { var child; }

        fun main() {
            var o = Outer(Inner(7));
            return o.child.v;
        }
    "#;
    assert_eq!(run(source), Value::Int(7));
}

#[test]
fn test_instances_compare_by_identity() {
    let source = r#"
        struct P { var x; }
        fun main() {
            var a = P(1);
            var b = a;
            var c = P(1);
            return (a == b) && (a != c);
        }
    "#;
    assert_eq!(run(source), Value::Bool(true));
}

#[test]
fn test_opaque_arguments_alias() {
    let source = r#"
        struct Box { var value; }
        fun fill(b) { b.value = 99; }

        fun main() {
            var box = Box(0);
            fill(box);
            return box.value;
        }
    "#;
    assert_eq!(run(source), Value::Int(99));
}

#[test]
fn test_destructor_runs_when_instance_dies() {
    let source = r#"
        struct Logger {
            fun _Logger() { println("logger gone"); }
        }

        fun main() {
            var l = Logger();
            println("before exit");
            return 1;
        }
    "#;
    assert_eq!(run_output(source), "before exit\nlogger gone\n");
}

#[test]
fn test_destructor_not_invoked_while_alive() {
    let source = r#"
        struct Logger {
            fun _Logger() { println("gone"); }
        }

        fun noop(l) -> 0;

        fun main() {
            var l = Logger();
            noop(l);
            println("still alive");
            return 1;
        }
    "#;
    // The by-value argument copy aliases the same instance, so the call
    // must not trigger destruction.
    assert_eq!(run_output(source), "still alive\ngone\n");
}

#[test]
fn test_instances_print_as_non_printable() {
    let source = r#"
        struct Box { var value; }
        fun main() { print(Box(1)); }
    "#;
    assert_eq!(run_output(source), "Non printable");
}

#[test]
fn test_dot_on_non_struct_is_a_type_fault() {
    let fault = Interpreter::with_captured_output()
        .run_source("fun main() { var x = 5; return x.y; }")
        .expect_err("execution should fail");
    assert!(matches!(fault, Fault::Type { .. }));
}

#[test]
fn test_array_add_and_size() {
    let source = r#"
        fun main() {
            var a = array();
            a.add(1);
            a.add(2);
            a.add(3);
            return a.size();
        }
    "#;
    assert_eq!(run(source), Value::Int(3));
}

#[test]
fn test_array_at_returns_elements() {
    let source = r#"
        fun main() {
            var a = array();
            a.add(10, 20, 30);
            return a.at(0) + a.at(2);
        }
    "#;
    assert_eq!(run(source), Value::Int(40));
}

#[test]
fn test_array_instances_have_their_own_data() {
    let source = r#"
        fun main() {
            var a = array();
            var b = array();
            a.add(1);
            a.add(2);
            b.add(3);
            return a.size() * 10 + b.size();
        }
    "#;
    assert_eq!(run(source), Value::Int(21));
}

#[test]
fn test_array_at_out_of_bounds_is_a_fault() {
    let fault = Interpreter::with_captured_output()
        .run_source("fun main() { var a = array(); return a.at(0); }")
        .expect_err("execution should fail");
    assert!(matches!(fault, Fault::Type { .. }));
}

#[test]
fn test_array_aliases_across_calls() {
    let source = r#"
        fun fill(arr) {
            arr.add(42);
        }

        fun main() {
            var a = array();
            fill(a);
            fill(a);
            return a.size();
        }
    "#;
    assert_eq!(run(source), Value::Int(2));
}
