mod common;
use common::run_pipeline;

#[test]
#[should_panic]
fn break_at_top_level() {
    run_pipeline("program p; begin break end.");
}

#[test]
#[should_panic]
fn array_bounds_out_of_order() {
    run_pipeline("program p; var a: array [5 .. 1] of integer; begin end.");
}

#[test]
#[should_panic]
fn undeclared_variable() {
    run_pipeline("program p; begin x := 1 end.");
}

#[test]
#[should_panic]
fn unknown_character() {
    run_pipeline("program p; begin writeln(#) end.");
}

#[test]
#[should_panic]
fn missing_final_dot() {
    run_pipeline("program p; begin end");
}

#[test]
#[should_panic]
fn variable_used_as_constant() {
    run_pipeline("program p; var n: integer; const k = n + 1; begin end.");
}

#[test]
#[should_panic]
fn call_in_constant_context() {
    run_pipeline(
        "program p;
         function f(): integer; begin f := 1 end;
         const k = f();
         begin end.",
    );
}

#[test]
#[should_panic]
fn redefined_global() {
    run_pipeline("program p; var x: integer; var x: integer; begin end.");
}

#[test]
#[should_panic]
fn redefined_parameter() {
    run_pipeline(
        "program p;
         procedure q(a: integer, a: integer);
         begin end;
         begin end.",
    );
}

#[test]
#[should_panic]
fn address_of_expression() {
    run_pipeline("program p; var x: integer; begin readln(x + 1) end.");
}

#[test]
#[should_panic]
fn indexing_a_scalar() {
    run_pipeline("program p; var x: integer; begin x[1] := 0 end.");
}

#[test]
#[should_panic]
fn wrong_dimensionality() {
    run_pipeline(
        "program p;
         var m: array [1 .. 2] of array [1 .. 2] of integer;
         begin m[1] := 0 end.",
    );
}

#[test]
#[should_panic]
fn integer_condition() {
    run_pipeline("program p; var x: integer; begin if x then writeln(1) end.");
}

#[test]
#[should_panic]
fn wrong_argument_count() {
    run_pipeline("program p; begin writeln(1, 2) end.");
}

#[test]
#[should_panic]
fn procedure_used_as_value() {
    run_pipeline(
        "program p;
         procedure q; begin end;
         var x: integer;
         begin x := q() end.",
    );
}

#[test]
#[should_panic]
fn for_loop_over_boolean() {
    run_pipeline("program p; var b: boolean; begin for b := 1 to 3 do writeln(1) end.");
}

#[test]
#[should_panic]
fn forward_signature_mismatch() {
    run_pipeline(
        "program p;
         function f(x: integer): integer; forward;
         function f(x: integer): boolean;
         begin f := true end;
         begin end.",
    );
}
