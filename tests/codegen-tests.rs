mod common;
use common::run_pipeline;

#[test]
fn arithmetic_constants_fold_into_the_call() {
    let ir = run_pipeline("program p; begin writeln(1 + 2 * 3) end.");

    assert!(ir.contains("define i32 @main"));
    assert!(ir.contains("declare i32 @writeln(i32)"));
    // the builder folds 1 + 2 * 3 down to a literal argument
    assert!(ir.contains("i32 7"));
}

#[test]
fn for_loop_desugars_into_a_while_loop() {
    let ir =
        run_pipeline("program p; var i: integer; begin for i := 1 to 3 do writeln(i) end.");

    assert!(ir.contains("loopCond"));
    assert!(ir.contains("loopBody"));
    assert!(ir.contains("afterLoop"));
    // `to` compares with signed <=
    assert!(ir.contains("icmp sle"));
}

#[test]
fn downto_compares_with_greater_equal() {
    let ir =
        run_pipeline("program p; var i: integer; begin for i := 3 downto 1 do writeln(i) end.");

    assert!(ir.contains("icmp sge"));
}

#[test]
fn while_loop_produces_loop_blocks() {
    let ir = run_pipeline(
        "program p; var i: integer;
         begin i := 5; while i > 0 do begin writeln(i); i := i - 1 end end.",
    );

    assert!(ir.contains("loopCond"));
    assert!(ir.contains("icmp sgt"));
    assert!(ir.contains("br i1"));
}

#[test]
fn function_result_lives_in_the_name_slot() {
    let ir = run_pipeline(
        "program p;
         function f(x: integer): integer;
         begin f := x * x end;
         begin writeln(f(4)) end.",
    );

    assert!(ir.contains("define i32 @f(i32 %x)"));
    // the return slot is zero-initialised and loaded in the return block
    assert!(ir.contains("%return_addr = alloca i32"));
    assert!(ir.contains("store i32 0, ptr %return_addr"));
    assert!(ir.contains("call i32 @f(i32 4)"));
}

#[test]
fn array_access_shifts_by_the_low_bound() {
    let ir = run_pipeline(
        "program p;
         var a: array [1 .. 3] of integer;
         var i: integer;
         begin
             for i := 1 to 3 do a[i] := i * i;
             writeln(a[2])
         end.",
    );

    assert!(ir.contains("@a = global [3 x i32] zeroinitializer"));
    assert!(ir.contains("getelementptr inbounds [3 x i32]"));
}

#[test]
fn named_constants_are_read_only_globals() {
    let ir = run_pipeline(
        "program p;
         const K = 10;
         var i: integer;
         begin i := K; if i >= 10 then writeln(1) else writeln(0) end.",
    );

    assert!(ir.contains("@K = constant i32 10"));
    assert!(ir.contains("icmp sge"));
    assert!(ir.contains("trueBranch"));
    assert!(ir.contains("falseBranch"));
    assert!(ir.contains("afterIf"));
}

#[test]
fn constant_expressions_fold_at_compile_time() {
    let ir = run_pipeline(
        "program p;
         const A = 6 * 7;
         const B = A + &10 - $a;
         begin writeln(B) end.",
    );

    assert!(ir.contains("@A = constant i32 42"));
    // 42 + 8 - 10
    assert!(ir.contains("@B = constant i32 40"));
}

#[test]
fn exit_branches_to_the_return_block() {
    let ir = run_pipeline(
        "program p;
         function f(x: integer): integer;
         begin
             f := x;
             if x > 10 then exit;
             f := 0
         end;
         begin writeln(f(42)) end.",
    );

    assert!(ir.contains("afterExit"));
    assert!(ir.contains("br label %return"));
}

#[test]
fn break_branches_to_the_loop_exit() {
    let ir = run_pipeline(
        "program p; var i: integer;
         begin
             i := 0;
             while true do
             begin
                 i := i + 1;
                 if i > 3 then break
             end;
             writeln(i)
         end.",
    );

    assert!(ir.contains("afterBreak"));
    assert!(ir.contains("afterLoop"));
}

#[test]
fn pointer_runtime_functions_take_addresses() {
    let ir = run_pipeline(
        "program p; var x: integer;
         begin readln(x); dec(x); writeln(x) end.",
    );

    assert!(ir.contains("declare i32 @readln(ptr)"));
    assert!(ir.contains("declare void @dec(ptr)"));
    assert!(ir.contains("call i32 @readln(ptr @x)"));
    assert!(ir.contains("call void @dec(ptr @x)"));
}

#[test]
fn globals_are_zero_initialised() {
    let ir = run_pipeline(
        "program p;
         var x: integer;
         var flag: boolean;
         var grid: array [0 .. 4] of array [0 .. 4] of integer;
         begin end.",
    );

    assert!(ir.contains("@x = global i32 0"));
    assert!(ir.contains("@flag = global i1 false"));
    assert!(ir.contains("@grid = global [5 x [5 x i32]] zeroinitializer"));
}

#[test]
fn multi_dimensional_access_uses_one_gep() {
    let ir = run_pipeline(
        "program p;
         var m: array [1 .. 2] of array [1 .. 4] of integer;
         begin m[2, 3] := 1; writeln(m[2, 3]) end.",
    );

    assert!(ir.contains("getelementptr inbounds [2 x [4 x i32]]"));
}

#[test]
fn procedures_return_void() {
    let ir = run_pipeline(
        "program p;
         procedure greet(n: integer);
         begin writeln(n) end;
         begin greet(1) end.",
    );

    assert!(ir.contains("define void @greet(i32 %n)"));
    assert!(ir.contains("call void @greet(i32 1)"));
    assert!(ir.contains("ret void"));
}

#[test]
fn forward_declarations_share_one_function() {
    let ir = run_pipeline(
        "program p;
         function f(x: integer): integer; forward;
         function g(x: integer): integer;
         begin g := f(x) end;
         function f(x: integer): integer;
         begin f := x + 1 end;
         begin writeln(g(1)) end.",
    );

    // exactly one definition of f, no renamed duplicate
    assert!(ir.contains("define i32 @f(i32 %x)"));
    assert!(!ir.contains("@f.1"));
}

#[test]
fn division_and_div_lower_identically() {
    let ir = run_pipeline(
        "program p; var a, b: integer;
         begin a := 7; b := 2; writeln(a / b); writeln(a div b); writeln(a mod b) end.",
    );

    assert_eq!(ir.matches("sdiv i32").count(), 2);
    assert!(ir.contains("srem i32"));
}

#[test]
fn negative_low_bounds_shift_upwards() {
    let ir = run_pipeline(
        "program p;
         var a: array [-2 .. 2] of integer;
         begin a[-2] := 1; writeln(a[-2]) end.",
    );

    assert!(ir.contains("@a = global [5 x i32] zeroinitializer"));
}
