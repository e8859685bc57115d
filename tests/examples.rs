mod common;
use common::run_pipeline;

#[test]
fn minimal() {
    run_pipeline(include_str!("../demos/minimal.mila"));
}

#[test]
fn arithmetic() {
    run_pipeline(include_str!("../demos/arithmetic.mila"));
}

#[test]
fn factorial() {
    run_pipeline(include_str!("../demos/factorial.mila"));
}

#[test]
fn fibonacci() {
    run_pipeline(include_str!("../demos/fibonacci.mila"));
}

#[test]
fn sort() {
    run_pipeline(include_str!("../demos/sort.mila"));
}

#[test]
fn matrix() {
    run_pipeline(include_str!("../demos/matrix.mila"));
}

#[test]
fn parity() {
    run_pipeline(include_str!("../demos/parity.mila"));
}

#[test]
fn countdown() {
    run_pipeline(include_str!("../demos/countdown.mila"));
}

#[test]
fn primes() {
    run_pipeline(include_str!("../demos/primes.mila"));
}
