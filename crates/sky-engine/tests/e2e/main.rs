//! End-to-end tests: source text through the checker, compiler and VM.

mod harness;

mod builtins;
mod collections;
mod control_flow;
mod functions;
mod operators;
mod recursion;
