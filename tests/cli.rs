// End-to-end tests driving the plox binary over script files, checking
// stdout, stderr and exit codes.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn plox() -> Command {
    Command::cargo_bin("plox").expect("the plox binary builds")
}

fn run_script(source: &str) -> assert_cmd::assert::Assert {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(source.as_bytes()).expect("write script");
    plox().arg(file.path()).assert()
}

#[test]
fn fibonacci_recursion() {
    run_script(
        "fun fib(n){ if(n<2) return n; return fib(n-1)+fib(n-2); }\n\
         print fib(10);\n",
    )
    .success()
    .stdout("55\n");
}

#[test]
fn closures_capture_by_environment() {
    run_script(
        "fun makeCounter(){ var i=0; fun c(){ i = i+1; return i; } return c; }\n\
         var c = makeCounter(); print c(); print c(); print c();\n",
    )
    .success()
    .stdout("1\n2\n3\n");
}

#[test]
fn resolver_fixes_shadowing() {
    run_script(
        "var a=\"global\";\n\
         { fun show(){ print a; } show(); var a=\"local\"; show(); }\n",
    )
    .success()
    .stdout("global\nglobal\n");
}

#[test]
fn inheritance_and_super() {
    run_script(
        "class A { greet(){ print \"A\"; } }\n\
         class B < A { greet(){ super.greet(); print \"B\"; } }\n\
         B().greet();\n",
    )
    .success()
    .stdout("A\nB\n");
}

#[test]
fn init_with_bare_return_yields_the_instance() {
    run_script("class P { init(){ this.x=1; return; } }\nprint P().x;\n")
        .success()
        .stdout("1\n");
}

#[test]
fn property_access_on_a_non_instance_fails() {
    run_script("var x = 3; print x.y;")
        .code(65)
        .stderr(predicate::str::contains("Only instances have properties"));
}

#[test]
fn number_formatting_strips_integral_point_zero() {
    run_script("print 3.0; print 3.5; print 10/4; print 2+1;")
        .success()
        .stdout("3\n3.5\n2.5\n3\n");
}

#[test]
fn print_formats_the_value_kinds() {
    run_script(
        "print nil; print true; print \"s\";\n\
         fun f() {} print f;\n\
         class C {} print C; print C();\n\
         print clock;\n",
    )
    .success()
    .stdout("nil\ntrue\ns\nfun f()\nclass C\nC instance\nfun clock()\n");
}

#[test]
fn or_returns_the_left_value_without_running_the_right() {
    run_script(
        "fun b() { print \"side\"; return true; }\n\
         print 1 or b();\n",
    )
    .success()
    .stdout("1\n");
}

#[test]
fn break_leaves_the_loop() {
    run_script(
        "var i = 0;\n\
         while (true) { if (i == 2) break; print i; i = i + 1; }\n\
         print \"done\";\n",
    )
    .success()
    .stdout("0\n1\ndone\n");
}

#[test]
fn break_outside_a_loop_is_rejected() {
    run_script("break;")
        .code(65)
        .stderr(predicate::str::contains(
            "Break statement only allowed within a loop.",
        ));
}

#[test]
fn runtime_errors_exit_65() {
    run_script("print 1 / 0;")
        .code(65)
        .stderr(predicate::str::contains("Cannot divide by zero."));
}

#[test]
fn parse_errors_exit_65() {
    run_script("var;")
        .code(65)
        .stderr(predicate::str::contains("Error in line 1"));
}

#[test]
fn resolve_errors_exit_65_and_skip_execution() {
    run_script("print \"before\"; return 1;")
        .code(65)
        .stderr(predicate::str::contains("Cannot return from top-level code."))
        // resolve errors stop the program before anything runs
        .stdout("");
}

#[test]
fn runtime_errors_abort_the_statement_list() {
    run_script("print \"first\"; print missing; print \"never\";")
        .code(65)
        .stdout("first\n")
        .stderr(predicate::str::contains("Undefined variable 'missing'."));
}

#[test]
fn unused_local_warns_but_still_runs() {
    run_script("{ var unused = 1; } print \"ran\";")
        .success()
        .stdout("ran\n")
        .stderr(predicate::str::contains("never referenced in its scope"));
}

#[test]
fn more_than_one_argument_is_a_usage_error() {
    plox()
        .args(["a.lox", "b.lox"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Usage: plox [script]"));
}

#[test]
fn unreadable_file_exits_66() {
    plox()
        .arg("definitely/not/a/real/file.lox")
        .assert()
        .code(66);
}

#[test]
fn repl_echoes_expression_values() {
    plox()
        .write_stdin("1 + 2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("3"))
        .stdout(predicate::str::contains("k thx byeee"));
}

#[test]
fn repl_recovers_after_an_error() {
    plox()
        .write_stdin("missing;\nprint \"ok\";\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}
