//! Builtin function signatures
//!
//! The global scope is pre-populated with these before any user code is
//! checked. The compiler lowers calls to them onto dedicated opcodes.

use super::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::parser::token::Span;
use crate::parser::types::{FunctionType, Type};

/// Names of the builtin functions, in declaration order.
pub const BUILTIN_FUNCTIONS: &[&str] = &["print", "len", "range"];

/// Whether `name` is a builtin function.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}

/// Signature of a builtin function.
pub fn builtin_signature(name: &str) -> Option<FunctionType> {
    let signature = match name {
        // print(values...): prints each argument on its own line
        "print" => FunctionType::new(vec![Type::ANY], Type::VOID)
            .with_min_params(0)
            .with_variadic(true),
        "len" => FunctionType::new(vec![Type::ANY], Type::INT),
        // range(end) or range(start, end)
        "range" => FunctionType::new(vec![Type::INT, Type::INT], Type::list(Type::INT))
            .with_min_params(1),
        _ => return None,
    };
    Some(signature)
}

/// Define the builtins (and the `nil` constant) in the global scope.
pub fn register_builtins(table: &mut SymbolTable) {
    let global = table.global_scope().id;
    for name in BUILTIN_FUNCTIONS {
        if let Some(signature) = builtin_signature(name) {
            let symbol = Symbol::new(
                *name,
                SymbolKind::Function,
                Type::Function(signature),
                Span::default(),
            );
            // The global scope is empty at this point.
            let _ = table.define_in_scope(global, symbol);
        }
    }

    let nil = Symbol::new("nil", SymbolKind::Constant, Type::NIL, Span::default());
    let _ = table.define_in_scope(global, nil);
}
