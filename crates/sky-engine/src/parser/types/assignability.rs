//! Assignability between types
//!
//! Implements the one-way relation T ~> U (a value of T may be stored where U
//! is expected). `any` is both a universal source and a universal sink, and
//! `int` widens to `float` but not the other way round.

use super::context::TypeContext;
use super::ty::{BasicType, FunctionType, Type};

/// Context for checking assignability
#[derive(Debug, Clone, Copy)]
pub struct AssignabilityContext<'a> {
    /// Needed to walk class inheritance chains
    type_ctx: &'a TypeContext,
}

impl<'a> AssignabilityContext<'a> {
    pub fn new(type_ctx: &'a TypeContext) -> Self {
        Self { type_ctx }
    }

    /// Check if `source` is assignable to `target` (source ~> target)
    pub fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        if source.is_any() || target.is_any() || source == target {
            return true;
        }

        match (source, target) {
            // int ~> float
            (Type::Basic(BasicType::Int), Type::Basic(BasicType::Float)) => true,

            // nil ~> reference types
            (Type::Basic(BasicType::Nil), Type::Pointer(_) | Type::Class { .. }) => true,

            (Type::List(source_elem), Type::List(target_elem)) => {
                self.is_assignable(source_elem, target_elem)
            }

            (Type::Dict(source_key, source_value), Type::Dict(target_key, target_value)) => {
                self.is_assignable(source_key, target_key)
                    && self.is_assignable(source_value, target_value)
            }

            (Type::Function(source_fn), Type::Function(target_fn)) => {
                self.is_function_assignable(source_fn, target_fn)
            }

            (Type::Pointer(source_pointee), Type::Pointer(target_pointee)) => {
                self.is_assignable(source_pointee, target_pointee)
            }

            // Subclass ~> superclass
            (Type::Class { id: source_id, .. }, Type::Class { id: target_id, .. }) => {
                self.type_ctx.is_subclass(*source_id, *target_id)
            }

            _ => false,
        }
    }

    fn is_function_assignable(&self, source: &FunctionType, target: &FunctionType) -> bool {
        source.params.len() == target.params.len()
            && source
                .params
                .iter()
                .zip(&target.params)
                .all(|(s, t)| self.is_assignable(s, t))
            && self.is_assignable(&source.return_type, &target.return_type)
    }
}

impl TypeContext {
    /// Shorthand for [`AssignabilityContext::is_assignable`].
    pub fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        AssignabilityContext::new(self).is_assignable(source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_is_universal() {
        let ctx = TypeContext::new();
        assert!(ctx.is_assignable(&Type::ANY, &Type::INT));
        assert!(ctx.is_assignable(&Type::list(Type::STRING), &Type::ANY));
    }

    #[test]
    fn test_int_widens_to_float_only() {
        let ctx = TypeContext::new();
        assert!(ctx.is_assignable(&Type::INT, &Type::FLOAT));
        assert!(!ctx.is_assignable(&Type::FLOAT, &Type::INT));
        assert!(!ctx.is_assignable(&Type::STRING, &Type::INT));
    }

    #[test]
    fn test_containers_are_element_wise() {
        let ctx = TypeContext::new();
        assert!(ctx.is_assignable(&Type::list(Type::INT), &Type::list(Type::FLOAT)));
        assert!(!ctx.is_assignable(&Type::list(Type::STRING), &Type::list(Type::INT)));
        assert!(ctx.is_assignable(
            &Type::dict(Type::STRING, Type::INT),
            &Type::dict(Type::STRING, Type::ANY)
        ));
        assert!(!ctx.is_assignable(
            &Type::dict(Type::INT, Type::INT),
            &Type::dict(Type::STRING, Type::INT)
        ));
    }

    #[test]
    fn test_function_assignability() {
        let ctx = TypeContext::new();
        let unary = Type::Function(FunctionType::new(vec![Type::INT], Type::INT));
        let widened = Type::Function(FunctionType::new(vec![Type::FLOAT], Type::FLOAT));
        let binary = Type::Function(FunctionType::new(vec![Type::INT, Type::INT], Type::INT));
        assert!(ctx.is_assignable(&unary, &widened));
        assert!(!ctx.is_assignable(&unary, &binary));
    }

    #[test]
    fn test_subclass_assignable_to_superclass() {
        let mut ctx = TypeContext::new();
        let base = ctx.declare_class("Shape", false);
        let derived = ctx.declare_class("Circle", false);
        ctx.set_superclass(derived, base);

        let base_ty = ctx.class_type(base);
        let derived_ty = ctx.class_type(derived);
        assert!(ctx.is_assignable(&derived_ty, &base_ty));
        assert!(!ctx.is_assignable(&base_ty, &derived_ty));
        assert!(ctx.is_assignable(&Type::NIL, &base_ty));
    }
}
