//! Type checker - validates names and types for statements and expressions
//!
//! The checker walks the AST once, maintaining a tree of scopes in the
//! [`SymbolTable`] and inferring a [`Type`] for every expression. Errors are
//! accumulated; checking never stops early.
//!
//! Top-level functions, classes and enums are declared before any body is
//! checked, so forward references and mutual recursion are legal.

use super::builtins::register_builtins;
use super::error::CheckError;
use super::symbols::{DuplicateSymbolError, Symbol, SymbolFlags, SymbolKind, SymbolTable, ScopeKind};
use crate::parser::ast::*;
use crate::parser::token::{Span, Token};
use crate::parser::types::{BasicType, ClassId, FunctionType, Type, TypeContext};

/// Result of checking a program
#[derive(Debug)]
pub struct CheckResult {
    /// Semantic errors in source order of discovery
    pub errors: Vec<CheckError>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Enclosing function while checking a body.
#[derive(Debug, Clone)]
struct FunctionContext {
    return_type: Type,
    is_async: bool,
}

/// What the hoisting pass declared for a top-level statement.
enum Hoisted {
    Nothing,
    Function(FunctionType),
    Class(ClassId),
    Enum(ClassId),
}

/// Type checker
///
/// Owns its symbol table and type context; one checker checks one program.
pub struct TypeChecker {
    type_ctx: TypeContext,
    symbols: SymbolTable,

    errors: Vec<CheckError>,

    /// Innermost enclosing function (None at top level)
    current_function: Option<FunctionContext>,

    /// Number of enclosing loops within the current function
    loop_depth: usize,
}

impl TypeChecker {
    /// Create a checker whose global scope holds the builtins.
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        register_builtins(&mut symbols);
        Self {
            type_ctx: TypeContext::new(),
            symbols,
            errors: Vec::new(),
            current_function: None,
            loop_depth: 0,
        }
    }

    /// Check a whole program.
    pub fn check(mut self, program: &Program) -> CheckResult {
        self.check_top_level(&program.statements);
        CheckResult {
            errors: self.errors,
        }
    }

    pub fn errors(&self) -> &[CheckError] {
        &self.errors
    }

    fn error(&mut self, err: CheckError) {
        self.errors.push(err);
    }

    fn define(&mut self, symbol: Symbol) {
        if let Err(DuplicateSymbolError {
            name,
            original,
            duplicate,
        }) = self.symbols.define(symbol)
        {
            self.error(CheckError::DuplicateSymbol {
                name,
                original,
                span: duplicate,
            });
        }
    }

    fn is_assignable(&self, source: &Type, target: &Type) -> bool {
        self.type_ctx.is_assignable(source, target)
    }

    /// Run `f` inside a fresh child scope.
    fn scoped<R>(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self) -> R) -> R {
        self.symbols.push_scope(kind);
        let result = f(self);
        self.symbols.pop_scope();
        result
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn check_top_level(&mut self, statements: &[Statement]) {
        let hoisted = self.hoist_declarations(statements);
        for (stmt, declared) in statements.iter().zip(hoisted) {
            match (stmt, declared) {
                (Statement::Function(func), Hoisted::Function(ty)) => {
                    self.check_function_body(func, &ty, None)
                }
                (Statement::Class(class), Hoisted::Class(id)) => self.check_class_body(class, id),
                (Statement::Enum(_), Hoisted::Enum(_)) => {}
                _ => self.check_stmt(stmt),
            }
        }
    }

    /// Declare every top-level class, enum and function.
    ///
    /// Classes are named first so that superclass links, member signatures
    /// and function signatures can all refer to any class in the file.
    fn hoist_declarations(&mut self, statements: &[Statement]) -> Vec<Hoisted> {
        let mut hoisted: Vec<Hoisted> = statements
            .iter()
            .map(|stmt| match stmt {
                Statement::Class(class) => {
                    Hoisted::Class(self.declare_class(&class.name, &class.token, false))
                }
                Statement::Enum(decl) => {
                    Hoisted::Enum(self.declare_class(&decl.name, &decl.token, true))
                }
                _ => Hoisted::Nothing,
            })
            .collect();

        for (stmt, declared) in statements.iter().zip(&hoisted) {
            match (stmt, declared) {
                (Statement::Class(class), Hoisted::Class(id)) => self.declare_class_members(class, *id),
                (Statement::Enum(decl), Hoisted::Enum(id)) => self.declare_enum_variants(decl, *id),
                _ => {}
            }
        }

        for (stmt, declared) in statements.iter().zip(hoisted.iter_mut()) {
            if let Statement::Function(func) = stmt {
                *declared = Hoisted::Function(self.declare_function(func));
            }
        }

        hoisted
    }

    fn declare_class(&mut self, name: &Identifier, token: &Token, is_enum: bool) -> ClassId {
        let id = self.type_ctx.declare_class(&name.name, is_enum);
        let ty = self.type_ctx.class_type(id);
        self.define(Symbol::new(&name.name, SymbolKind::Class, ty, token.span));
        id
    }

    /// Link the superclass and record field and method signatures.
    fn declare_class_members(&mut self, class: &ClassStatement, id: ClassId) {
        if let Some(superclass) = &class.superclass {
            self.link_superclass(class, id, superclass);
        }

        for member in &class.body.statements {
            match member {
                Statement::Let(field) => {
                    let ty = self.type_ctx.resolve_optional(field.type_annotation.as_ref());
                    self.type_ctx
                        .class_mut(id)
                        .fields
                        .insert(field.name.name.clone(), ty);
                }
                Statement::Const(field) => {
                    let ty = self.type_ctx.resolve_optional(field.type_annotation.as_ref());
                    self.type_ctx
                        .class_mut(id)
                        .fields
                        .insert(field.name.name.clone(), ty);
                }
                Statement::Function(method) => {
                    let ty = self.function_type(&method.parameters, method.return_type.as_ref());
                    self.type_ctx
                        .class_mut(id)
                        .methods
                        .insert(method.name.name.clone(), ty);
                }
                _ => {}
            }
        }
    }

    fn link_superclass(&mut self, class: &ClassStatement, id: ClassId, superclass: &Identifier) {
        let span = superclass.token.span;
        let resolved = self.symbols.resolve(&superclass.name).map(|s| s.ty.clone());
        match resolved {
            Some(Type::Class { id: super_id, .. }) => {
                if !self.type_ctx.set_superclass(id, super_id) {
                    self.error(CheckError::CyclicInheritance {
                        name: class.name.name.clone(),
                        span,
                    });
                }
            }
            Some(_) => self.error(CheckError::NotAClass {
                name: superclass.name.clone(),
                span,
            }),
            None => self.error(CheckError::UndefinedSuperclass {
                name: superclass.name.clone(),
                span,
            }),
        }
    }

    /// Unit variants become fields of the enum type; payload variants
    /// become constructor methods returning it.
    fn declare_enum_variants(&mut self, decl: &EnumStatement, id: ClassId) {
        let enum_ty = self.type_ctx.class_type(id);
        for variant in &decl.variants {
            let name = variant.name.name.clone();
            let info = self.type_ctx.class(id);
            if info.fields.contains_key(&name) || info.methods.contains_key(&name) {
                self.error(CheckError::DuplicateSymbol {
                    name,
                    original: decl.token.span,
                    span: variant.name.token.span,
                });
                continue;
            }

            if variant.payload.is_empty() {
                self.type_ctx.class_mut(id).fields.insert(name, enum_ty.clone());
            } else {
                let params = variant
                    .payload
                    .iter()
                    .map(|ann| self.type_ctx.resolve_annotation(ann))
                    .collect();
                let ctor = FunctionType::new(params, enum_ty.clone());
                self.type_ctx.class_mut(id).methods.insert(name, ctor);
            }
        }
    }

    /// Signature of a function, lambda or method.
    ///
    /// A variadic parameter contributes its element type; omitted return
    /// annotations mean `any`.
    fn function_type(
        &self,
        parameters: &[Parameter],
        return_type: Option<&TypeAnnotation>,
    ) -> FunctionType {
        let params = parameters
            .iter()
            .map(|p| self.type_ctx.resolve_optional(p.type_annotation.as_ref()))
            .collect();
        let min_params = parameters
            .iter()
            .take_while(|p| p.default.is_none() && !p.variadic)
            .count();
        let variadic = parameters.last().is_some_and(|p| p.variadic);

        FunctionType::new(params, self.type_ctx.resolve_optional(return_type))
            .with_min_params(min_params)
            .with_variadic(variadic)
    }

    fn declare_function(&mut self, func: &FunctionStatement) -> FunctionType {
        let ty = self.function_type(&func.parameters, func.return_type.as_ref());
        let symbol = Symbol::new(
            &func.name.name,
            SymbolKind::Function,
            Type::Function(ty.clone()),
            func.token.span,
        )
        .with_flags(SymbolFlags {
            is_async: func.is_async,
            is_coop: func.is_coop,
            ..SymbolFlags::default()
        });
        self.define(symbol);
        ty
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn check_stmt(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Let(let_stmt) => self.check_let(let_stmt),
            Statement::Const(const_stmt) => self.check_const(const_stmt),
            Statement::Return(ret) => self.check_return(ret),
            Statement::Break(brk) => self.check_loop_control("break", &brk.token),
            Statement::Continue(cont) => self.check_loop_control("continue", &cont.token),
            Statement::Expression(expr) => {
                self.check_expr(&expr.expression);
            }
            Statement::Function(func) => {
                let ty = self.declare_function(func);
                self.check_function_body(func, &ty, None);
            }
            Statement::If(if_stmt) => self.check_if(if_stmt),
            Statement::While(while_stmt) => self.check_while(while_stmt),
            Statement::For(for_stmt) => self.check_for(for_stmt),
            Statement::Class(class) => {
                let id = self.declare_class(&class.name, &class.token, false);
                self.declare_class_members(class, id);
                self.check_class_body(class, id);
            }
            Statement::Import(import) => {
                if let Some(binding) = import.binding() {
                    let symbol =
                        Symbol::new(&binding.name, SymbolKind::Module, Type::ANY, import.token.span);
                    self.define(symbol);
                }
            }
            Statement::Unsafe(unsafe_stmt) => self.check_block(&unsafe_stmt.body, ScopeKind::Block),
            Statement::Enum(decl) => {
                let id = self.declare_class(&decl.name, &decl.token, true);
                self.declare_enum_variants(decl, id);
            }
            Statement::Try(try_stmt) => self.check_try(try_stmt),
            Statement::Throw(throw) => {
                self.check_expr(&throw.value);
            }
            Statement::Block(block) => self.check_block(block, ScopeKind::Block),
        }
    }

    fn check_statements(&mut self, statements: &[Statement]) {
        for stmt in statements {
            self.check_stmt(stmt);
        }
    }

    fn check_block(&mut self, block: &BlockStatement, kind: ScopeKind) {
        self.scoped(kind, |checker| checker.check_statements(&block.statements));
    }

    fn check_let(&mut self, stmt: &LetStatement) {
        let value_ty = stmt.value.as_ref().map(|value| self.check_expr(value));

        let ty = match (&stmt.type_annotation, value_ty) {
            (Some(annotation), value_ty) => {
                let declared = self.type_ctx.resolve_annotation(annotation);
                if let Some(value_ty) = value_ty {
                    self.check_assignable_to(&value_ty, &declared, stmt.token.span);
                }
                declared
            }
            (None, Some(value_ty)) => value_ty,
            (None, None) => Type::ANY,
        };

        self.define(Symbol::new(&stmt.name.name, SymbolKind::Variable, ty, stmt.token.span));
    }

    fn check_const(&mut self, stmt: &ConstStatement) {
        let value_ty = self.check_expr(&stmt.value);

        let ty = match &stmt.type_annotation {
            Some(annotation) => {
                let declared = self.type_ctx.resolve_annotation(annotation);
                self.check_assignable_to(&value_ty, &declared, stmt.token.span);
                declared
            }
            None => value_ty,
        };

        let symbol = Symbol::new(&stmt.name.name, SymbolKind::Constant, ty, stmt.token.span)
            .with_flags(SymbolFlags {
                is_const: true,
                ..SymbolFlags::default()
            });
        self.define(symbol);
    }

    fn check_assignable_to(&mut self, value: &Type, target: &Type, span: Span) {
        if !self.is_assignable(value, target) {
            self.error(CheckError::TypeMismatch {
                expected: target.to_string(),
                actual: value.to_string(),
                span,
            });
        }
    }

    fn check_return(&mut self, ret: &ReturnStatement) {
        let value_ty = match &ret.value {
            Some(value) => self.check_expr(value),
            None => Type::VOID,
        };

        let Some(function) = &self.current_function else {
            self.error(CheckError::ReturnOutsideFunction {
                span: ret.token.span,
            });
            return;
        };

        let expected = function.return_type.clone();
        if !self.is_assignable(&value_ty, &expected) {
            self.error(CheckError::ReturnTypeMismatch {
                expected: expected.to_string(),
                actual: value_ty.to_string(),
                span: ret.token.span,
            });
        }
    }

    fn check_loop_control(&mut self, keyword: &'static str, token: &Token) {
        if self.loop_depth == 0 {
            self.error(CheckError::BreakOutsideLoop {
                keyword,
                span: token.span,
            });
        }
    }

    /// Check parameters and body of a function or method.
    ///
    /// `receiver` is the class a method belongs to; it binds `self` (and
    /// `super` when the class has a superclass).
    fn check_function_body(
        &mut self,
        func: &FunctionStatement,
        ty: &FunctionType,
        receiver: Option<ClassId>,
    ) {
        for decorator in &func.decorators {
            for arg in &decorator.arguments {
                self.check_expr(arg);
            }
        }
        self.check_parameter_defaults(&func.parameters, ty);

        let context = FunctionContext {
            return_type: (*ty.return_type).clone(),
            is_async: func.is_async,
        };

        self.in_function(context, |checker| {
            if let Some(class_id) = receiver {
                checker.bind_receiver(class_id, func.token.span);
            }
            checker.bind_parameters(&func.parameters, ty);
            checker.check_statements(&func.body.statements);
        });
    }

    /// Run `f` in a new function scope with `context` as the enclosing function.
    fn in_function<R>(&mut self, context: FunctionContext, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved_function = self.current_function.replace(context);
        let saved_loops = std::mem::take(&mut self.loop_depth);

        let result = self.scoped(ScopeKind::Function, f);

        self.current_function = saved_function;
        self.loop_depth = saved_loops;
        result
    }

    /// Defaults are evaluated at each call site with only globals and
    /// declarations in view, so they are checked behind a function boundary.
    fn check_parameter_defaults(&mut self, parameters: &[Parameter], ty: &FunctionType) {
        self.scoped(ScopeKind::Function, |checker| {
            for (param, param_ty) in parameters.iter().zip(&ty.params) {
                if let Some(default) = &param.default {
                    let default_ty = checker.check_expr(default);
                    checker.check_assignable_to(&default_ty, param_ty, param.token.span);
                }
            }
        });
    }

    fn bind_parameters(&mut self, parameters: &[Parameter], ty: &FunctionType) {
        for (param, param_ty) in parameters.iter().zip(&ty.params) {
            // The variadic parameter holds the surplus arguments as a list.
            let bound = if param.variadic {
                Type::list(param_ty.clone())
            } else {
                param_ty.clone()
            };
            self.define(Symbol::new(
                &param.name.name,
                SymbolKind::Parameter,
                bound,
                param.token.span,
            ));
        }
    }

    fn bind_receiver(&mut self, class_id: ClassId, span: Span) {
        let flags = SymbolFlags {
            is_readonly: true,
            ..SymbolFlags::default()
        };
        let self_ty = self.type_ctx.class_type(class_id);
        self.define(Symbol::new("self", SymbolKind::Parameter, self_ty, span).with_flags(flags));

        if let Some(super_id) = self.type_ctx.class(class_id).superclass {
            let super_ty = self.type_ctx.class_type(super_id);
            self.define(Symbol::new("super", SymbolKind::Parameter, super_ty, span).with_flags(flags));
        }
    }

    fn check_class_body(&mut self, class: &ClassStatement, id: ClassId) {
        self.scoped(ScopeKind::Class, |checker| {
            for member in &class.body.statements {
                match member {
                    Statement::Function(method) => {
                        let ty = checker.declare_function(method);
                        checker.check_function_body(method, &ty, Some(id));
                    }
                    other => checker.check_stmt(other),
                }
            }
        });
    }

    fn check_condition(&mut self, construct: &'static str, condition: &Expression, span: Span) {
        let ty = self.check_expr(condition);
        if !ty.is_condition() {
            self.error(CheckError::NonBoolCondition {
                construct,
                actual: ty.to_string(),
                span,
            });
        }
    }

    fn check_if(&mut self, stmt: &IfStatement) {
        self.check_condition("if", &stmt.condition, stmt.token.span);
        self.check_block(&stmt.consequence, ScopeKind::Block);

        for elif in &stmt.elifs {
            self.check_condition("elif", &elif.condition, elif.token.span);
            self.check_block(&elif.consequence, ScopeKind::Block);
        }

        if let Some(alternative) = &stmt.alternative {
            self.check_block(alternative, ScopeKind::Block);
        }
    }

    fn check_while(&mut self, stmt: &WhileStatement) {
        self.check_condition("while", &stmt.condition, stmt.token.span);

        self.loop_depth += 1;
        self.check_block(&stmt.body, ScopeKind::Loop);
        self.loop_depth -= 1;
    }

    fn check_for(&mut self, stmt: &ForStatement) {
        let iterable_ty = self.check_expr(&stmt.iterable);
        let element_ty = match iterable_ty.iteration_type() {
            Some(ty) => ty,
            None => {
                self.error(CheckError::NotIterable {
                    ty: iterable_ty.to_string(),
                    span: stmt.iterable.token().span,
                });
                Type::ANY
            }
        };

        self.loop_depth += 1;
        self.scoped(ScopeKind::Loop, |checker| {
            let iterator = Symbol::new(
                &stmt.iterator.name,
                SymbolKind::Variable,
                element_ty,
                stmt.iterator.token.span,
            )
            .with_flags(SymbolFlags {
                is_readonly: true,
                ..SymbolFlags::default()
            });
            checker.define(iterator);
            checker.check_statements(&stmt.body.statements);
        });
        self.loop_depth -= 1;
    }

    fn check_try(&mut self, stmt: &TryStatement) {
        self.check_block(&stmt.body, ScopeKind::Block);

        if let Some(catch) = &stmt.catch {
            self.scoped(ScopeKind::Block, |checker| {
                if let Some(name) = &catch.name {
                    checker.define(Symbol::new(
                        &name.name,
                        SymbolKind::Variable,
                        Type::ANY,
                        name.token.span,
                    ));
                }
                checker.check_statements(&catch.body.statements);
            });
        }

        if let Some(finally) = &stmt.finally {
            self.check_block(finally, ScopeKind::Block);
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Infer the type of an expression, reporting any errors inside it.
    pub fn check_expr(&mut self, expr: &Expression) -> Type {
        match expr {
            Expression::Identifier(ident) => self.check_identifier(ident),
            Expression::Integer(_) => Type::INT,
            Expression::Float(_) => Type::FLOAT,
            Expression::String(_) => Type::STRING,
            Expression::Boolean(_) => Type::BOOL,
            Expression::List(list) => self.check_list(list),
            Expression::Dict(dict) => self.check_dict(dict),
            Expression::Prefix(prefix) => self.check_prefix(prefix),
            Expression::Infix(infix) => self.check_infix(infix),
            Expression::Call(call) => self.check_call(call),
            Expression::Index(index) => self.check_index(index),
            Expression::Member(member) => self.check_member(member),
            Expression::Await(await_expr) => {
                let in_async = self.current_function.as_ref().is_some_and(|f| f.is_async);
                if !in_async {
                    self.error(CheckError::AwaitOutsideAsync {
                        span: await_expr.token.span,
                    });
                }
                self.check_expr(&await_expr.value)
            }
            Expression::Yield(yield_expr) => {
                if self.current_function.is_none() {
                    self.error(CheckError::YieldOutsideFunction {
                        span: yield_expr.token.span,
                    });
                }
                match &yield_expr.value {
                    Some(value) => self.check_expr(value),
                    None => Type::VOID,
                }
            }
            Expression::Match(match_expr) => self.check_match(match_expr),
            Expression::EnumConstructor(ctor) => self.check_enum_constructor(ctor),
            Expression::Lambda(lambda) => self.check_lambda(lambda),
        }
    }

    fn check_identifier(&mut self, ident: &Identifier) -> Type {
        if let Some(symbol) = self.symbols.resolve(&ident.name) {
            return symbol.ty.clone();
        }

        // `self`/`super` outside a method are left to the runtime.
        if ident.name != "self" && ident.name != "super" {
            self.error(CheckError::UndefinedVariable {
                name: ident.name.clone(),
                span: ident.token.span,
            });
        }
        Type::ANY
    }

    /// The first element fixes the element type; later ones must conform.
    fn check_list(&mut self, list: &ListLiteral) -> Type {
        let Some((first, rest)) = list.elements.split_first() else {
            return Type::list(Type::ANY);
        };

        let element_ty = self.check_expr(first);
        for element in rest {
            let ty = self.check_expr(element);
            if !self.is_assignable(&ty, &element_ty) {
                self.error(CheckError::ListElementMismatch {
                    expected: element_ty.to_string(),
                    actual: ty.to_string(),
                    span: element.token().span,
                });
            }
        }
        Type::list(element_ty)
    }

    fn check_dict(&mut self, dict: &DictLiteral) -> Type {
        let Some(((first_key, first_value), rest)) = dict.pairs.split_first() else {
            return Type::dict(Type::ANY, Type::ANY);
        };

        let key_ty = self.check_expr(first_key);
        let value_ty = self.check_expr(first_value);
        for (key, value) in rest {
            let ty = self.check_expr(key);
            if !self.is_assignable(&ty, &key_ty) {
                self.error(CheckError::DictKeyMismatch {
                    expected: key_ty.to_string(),
                    actual: ty.to_string(),
                    span: key.token().span,
                });
            }
            let ty = self.check_expr(value);
            if !self.is_assignable(&ty, &value_ty) {
                self.error(CheckError::DictValueMismatch {
                    expected: value_ty.to_string(),
                    actual: ty.to_string(),
                    span: value.token().span,
                });
            }
        }
        Type::dict(key_ty, value_ty)
    }

    fn check_prefix(&mut self, prefix: &PrefixExpression) -> Type {
        let operand = self.check_expr(&prefix.right);
        let span = prefix.token.span;

        match prefix.operator {
            PrefixOperator::Not => {
                if !operand.is_condition() {
                    self.error(CheckError::InvalidUnaryOp {
                        op: "!",
                        ty: operand.to_string(),
                        span,
                    });
                }
                Type::BOOL
            }
            PrefixOperator::Negate | PrefixOperator::Plus => {
                if !operand.is_numeric() && !operand.is_any() {
                    let op = if prefix.operator == PrefixOperator::Negate { "-" } else { "+" };
                    self.error(CheckError::InvalidUnaryOp {
                        op,
                        ty: operand.to_string(),
                        span,
                    });
                }
                operand
            }
        }
    }

    fn check_infix(&mut self, infix: &InfixExpression) -> Type {
        if infix.operator.is_assignment() {
            return self.check_assignment(infix);
        }

        let left = self.check_expr(&infix.left);
        let right = self.check_expr(&infix.right);

        if infix.operator.is_comparison() || infix.operator.is_logical() {
            Type::BOOL
        } else {
            arithmetic_result(infix.operator, &left, &right)
        }
    }

    fn check_assignment(&mut self, infix: &InfixExpression) -> Type {
        let span = infix.token.span;

        let target_ty = match infix.left.as_identifier() {
            Some(ident) => {
                let immutable = self
                    .symbols
                    .resolve(&ident.name)
                    .is_some_and(|symbol| !symbol.is_mutable());
                if immutable {
                    self.error(CheckError::ConstReassignment {
                        name: ident.name.clone(),
                        span,
                    });
                }
                self.check_identifier(ident)
            }
            None => {
                self.error(CheckError::InvalidAssignmentTarget {
                    target: infix.left.to_string(),
                    span,
                });
                self.check_expr(&infix.left)
            }
        };

        let right = self.check_expr(&infix.right);
        let value_ty = match infix.operator.compound_operator() {
            Some(op) => arithmetic_result(op, &target_ty, &right),
            None => right,
        };
        self.check_assignable_to(&value_ty, &target_ty, span);

        target_ty
    }

    fn check_call(&mut self, call: &CallExpression) -> Type {
        let callee = self.check_expr(&call.function);
        let span = call.token.span;

        match callee {
            Type::Function(func) => {
                self.check_arguments(&func, &call.arguments, span);
                *func.return_type
            }
            // Calling a class constructs an instance.
            class @ Type::Class { .. } => {
                for arg in &call.arguments {
                    self.check_expr(arg);
                }
                class
            }
            ty if ty.is_any() => {
                for arg in &call.arguments {
                    self.check_expr(arg);
                }
                Type::ANY
            }
            ty => {
                self.error(CheckError::NotCallable {
                    ty: ty.to_string(),
                    span,
                });
                for arg in &call.arguments {
                    self.check_expr(arg);
                }
                Type::ANY
            }
        }
    }

    fn check_arguments(&mut self, func: &FunctionType, arguments: &[Expression], span: Span) {
        let count = arguments.len();
        let min = func.min_params;

        let expected = match func.max_params() {
            None if count < min => Some(format!("at least {}", min)),
            Some(max) if count < min || count > max => {
                if min == max {
                    Some(max.to_string())
                } else {
                    Some(format!("{}-{}", min, max))
                }
            }
            _ => None,
        };
        if let Some(expected) = expected {
            self.error(CheckError::ArgumentCountMismatch {
                expected,
                actual: count,
                span,
            });
        }

        for (i, arg) in arguments.iter().enumerate() {
            let arg_ty = self.check_expr(arg);
            if let Some(param_ty) = func.param_at(i) {
                if !self.is_assignable(&arg_ty, param_ty) {
                    self.error(CheckError::ArgumentTypeMismatch {
                        index: i + 1,
                        expected: param_ty.to_string(),
                        actual: arg_ty.to_string(),
                        span,
                    });
                }
            }
        }
    }

    fn check_index(&mut self, index: &IndexExpression) -> Type {
        let left = self.check_expr(&index.left);
        let index_ty = self.check_expr(&index.index);
        let span = index.token.span;

        match left {
            Type::List(element) => {
                if index_ty != Type::INT && !index_ty.is_any() {
                    self.error(CheckError::InvalidListIndex {
                        actual: index_ty.to_string(),
                        span,
                    });
                }
                *element
            }
            Type::Dict(key, value) => {
                if !self.is_assignable(&index_ty, &key) {
                    self.error(CheckError::DictKeyMismatch {
                        expected: key.to_string(),
                        actual: index_ty.to_string(),
                        span,
                    });
                }
                *value
            }
            Type::Basic(BasicType::String) => Type::STRING,
            _ => Type::ANY,
        }
    }

    fn check_member(&mut self, member: &MemberExpression) -> Type {
        let object = self.check_expr(&member.object);
        match object {
            Type::Class { id, name } => match self.type_ctx.find_member(id, &member.member.name) {
                Some(ty) => ty,
                None => {
                    self.error(CheckError::UndefinedMember {
                        ty: name,
                        member: member.member.name.clone(),
                        span: member.member.token.span,
                    });
                    Type::ANY
                }
            },
            _ => Type::ANY,
        }
    }

    fn check_match(&mut self, match_expr: &MatchExpression) -> Type {
        self.check_expr(&match_expr.subject);

        let mut result: Option<Type> = None;
        let mut uniform = true;
        for arm in &match_expr.arms {
            if !arm.is_wildcard() {
                self.check_expr(&arm.pattern);
            }
            let body_ty = self.check_expr(&arm.body);
            match &result {
                None => result = Some(body_ty),
                Some(first) if *first != body_ty => uniform = false,
                Some(_) => {}
            }
        }

        match result {
            Some(ty) if uniform => ty,
            Some(_) => Type::ANY,
            None => Type::NIL,
        }
    }

    fn check_enum_constructor(&mut self, ctor: &EnumConstructorExpression) -> Type {
        let span = ctor.token.span;
        let enum_ty = match self.symbols.resolve(&ctor.enum_name).map(|s| s.ty.clone()) {
            Some(ty) => ty,
            None => {
                self.error(CheckError::UndefinedVariable {
                    name: ctor.enum_name.clone(),
                    span,
                });
                for arg in &ctor.arguments {
                    self.check_expr(arg);
                }
                return Type::ANY;
            }
        };

        let Type::Class { id, .. } = &enum_ty else {
            self.error(CheckError::NotAClass {
                name: ctor.enum_name.clone(),
                span,
            });
            return Type::ANY;
        };

        match self.type_ctx.find_member(*id, &ctor.variant) {
            Some(Type::Function(variant)) => {
                self.check_arguments(&variant, &ctor.arguments, span);
                *variant.return_type
            }
            Some(ty) => {
                if !ctor.arguments.is_empty() {
                    self.check_arguments(&FunctionType::new(vec![], ty.clone()), &ctor.arguments, span);
                }
                ty
            }
            None => {
                self.error(CheckError::UndefinedMember {
                    ty: ctor.enum_name.clone(),
                    member: ctor.variant.clone(),
                    span,
                });
                Type::ANY
            }
        }
    }

    fn check_lambda(&mut self, lambda: &LambdaExpression) -> Type {
        let declared = self.function_type(&lambda.parameters, lambda.return_type.as_ref());
        self.check_parameter_defaults(&lambda.parameters, &declared);

        let context = FunctionContext {
            return_type: (*declared.return_type).clone(),
            is_async: false,
        };
        let body_ty = self.in_function(context, |checker| {
            checker.bind_parameters(&lambda.parameters, &declared);
            checker.check_expr(&lambda.body)
        });

        let return_type = match &lambda.return_type {
            Some(_) => {
                if !self.is_assignable(&body_ty, &declared.return_type) {
                    self.error(CheckError::ReturnTypeMismatch {
                        expected: declared.return_type.to_string(),
                        actual: body_ty.to_string(),
                        span: lambda.body.token().span,
                    });
                }
                (*declared.return_type).clone()
            }
            None => body_ty,
        };

        Type::Function(FunctionType {
            return_type: Box::new(return_type),
            ..declared
        })
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type of an arithmetic operator.
///
/// Any float operand makes the result float, two ints give int, and `+` on
/// two strings concatenates. Everything else is only known at runtime.
fn arithmetic_result(op: InfixOperator, left: &Type, right: &Type) -> Type {
    if *left == Type::FLOAT || *right == Type::FLOAT {
        Type::FLOAT
    } else if *left == Type::INT && *right == Type::INT {
        Type::INT
    } else if *left == Type::STRING && *right == Type::STRING && op == InfixOperator::Add {
        Type::STRING
    } else {
        Type::ANY
    }
}

/// Check a program with a fresh checker.
pub fn check_program(program: &Program) -> Vec<CheckError> {
    TypeChecker::new().check(program).errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn check(source: &str) -> Vec<String> {
        let (program, errors) = Parser::new(source, "test.sky").parse();
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        check_program(&program)
            .iter()
            .map(|err| err.to_string())
            .collect()
    }

    #[test]
    fn test_valid_program_has_no_errors() {
        let errors = check(
            "function add(a: int, b: int): int\n    return a + b\nend\nlet x: int = add(2, 3)\nprint(x)\n",
        );
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_let_type_mismatch() {
        assert_eq!(
            check("let x: int = \"hello\"\n"),
            vec!["type mismatch: cannot assign string to int"]
        );
    }

    #[test]
    fn test_int_widens_to_float() {
        assert!(check("let x: float = 1\n").is_empty());
        assert_eq!(
            check("let x: int = 1.5\n"),
            vec!["type mismatch: cannot assign float to int"]
        );
    }

    #[test]
    fn test_const_reassignment() {
        assert_eq!(
            check("const PI = 3.14\nPI = 3.15\n"),
            vec!["cannot assign to const variable 'PI'"]
        );
    }

    #[test]
    fn test_undefined_symbol() {
        assert_eq!(check("print(y)\n"), vec!["undefined: y"]);
    }

    #[test]
    fn test_duplicate_symbol_same_scope_only() {
        assert_eq!(
            check("let x = 1\nlet x = 2\n"),
            vec!["symbol 'x' already defined in this scope"]
        );
        assert!(check("let x = 1\nif true\n    let x = \"s\"\nend\n").is_empty());
    }

    #[test]
    fn test_block_scope_is_discarded() {
        assert_eq!(
            check("if true\n    let inner = 1\nend\nprint(inner)\n"),
            vec!["undefined: inner"]
        );
    }

    #[test]
    fn test_return_checks() {
        assert_eq!(check("return 1\n"), vec!["return statement outside of function"]);
        assert_eq!(
            check("function f(): int\n    return \"s\"\nend\n"),
            vec!["return type mismatch: expected int, got string"]
        );
        assert!(check("function f()\n    return \"s\"\nend\n").is_empty());
    }

    #[test]
    fn test_condition_must_be_bool() {
        assert_eq!(
            check("if 1\n    print(1)\nend\n"),
            vec!["if condition must be bool, got int"]
        );
        assert_eq!(
            check("while \"x\"\n    break\nend\n"),
            vec!["while condition must be bool, got string"]
        );
    }

    #[test]
    fn test_arity_messages() {
        let source = "function f(a, b)\n    return a\nend\nf(1)\n";
        assert_eq!(check(source), vec!["wrong number of arguments: expected 2, got 1"]);

        let source = "function g(a, b = 2)\n    return a\nend\ng(1, 2, 3)\n";
        assert_eq!(check(source), vec!["wrong number of arguments: expected 1-2, got 3"]);

        let source = "function h(a, ...rest)\n    return a\nend\nh()\nh(1, 2, 3)\n";
        assert_eq!(
            check(source),
            vec!["wrong number of arguments: expected at least 1, got 0"]
        );
    }

    #[test]
    fn test_argument_type_mismatch() {
        let source = "function f(a: int)\n    return a\nend\nf(\"x\")\n";
        assert_eq!(
            check(source),
            vec!["argument 1 type mismatch: expected int, got string"]
        );
    }

    #[test]
    fn test_await_outside_async() {
        let source = "function f()\n    return await g()\nend\nasync function g()\n    return 1\nend\n";
        assert_eq!(check(source), vec!["await can only be used in async functions"]);
    }

    #[test]
    fn test_forward_references_and_recursion() {
        let source = "function even(n: int): bool\n    if n == 0\n        return true\n    end\n    return odd(n - 1)\nend\nfunction odd(n: int): bool\n    if n == 0\n        return false\n    end\n    return even(n - 1)\nend\n";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_break_outside_loop() {
        assert_eq!(check("break\n"), vec!["break can only be used inside a loop"]);
        assert!(check("for i in range(3)\n    continue\nend\n").is_empty());
    }

    #[test]
    fn test_literal_element_types() {
        assert_eq!(
            check("let xs = [1, \"two\"]\n"),
            vec!["list element type mismatch: expected int, got string"]
        );
        assert_eq!(
            check("let d = {\"a\": 1, 2: 3}\n"),
            vec!["dict key type mismatch: expected string, got int"]
        );
        assert!(check("let xs: [float] = [1, 2]\n").is_empty());
    }

    #[test]
    fn test_loop_variable_takes_element_type() {
        assert_eq!(
            check("for s in [\"a\"]\n    let n: int = s\nend\n"),
            vec!["type mismatch: cannot assign string to int"]
        );
        assert_eq!(check("for x in 5\n    print(x)\nend\n"), vec!["cannot iterate over int"]);
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            check("let xs = [1]\nxs[0] = 2\n"),
            vec!["invalid assignment target: (xs[0])"]
        );
    }

    #[test]
    fn test_compound_assignment_result_type() {
        assert!(check("let x = 1.5\nx += 1\n").is_empty());
        assert_eq!(
            check("let n = 1\nn += 0.5\n"),
            vec!["type mismatch: cannot assign float to int"]
        );
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(check("let b = !1\n"), vec!["operator ! cannot be applied to int"]);
        assert_eq!(check("let s = -\"x\"\n"), vec!["operator - cannot be applied to string"]);
    }

    #[test]
    fn test_class_members_and_inheritance() {
        let source = "class Animal\n    let name: string = \"a\"\n    function speak(): string\n        return self.name\n    end\nend\nclass Dog(Animal)\n    function bark(): string\n        return self.speak()\n    end\nend\nlet a: Animal = Dog()\n";
        assert!(check(source).is_empty(), "{:?}", check(source));

        assert_eq!(check("class A(B)\nend\n"), vec!["undefined superclass: B"]);
        assert_eq!(check("class A(print)\nend\n"), vec!["print is not a class"]);
    }

    #[test]
    fn test_enum_variants() {
        let source = "enum Shape\n    Circle(float)\n    Empty\nend\nlet s: Shape = Shape.Circle(1.0)\nlet e: Shape = Shape.Empty\nlet bad = Shape.Square\n";
        assert_eq!(check(source), vec!["Shape has no member 'Square'"]);
    }

    #[test]
    fn test_catch_binds_name() {
        assert!(check("try\n    throw \"boom\"\ncatch e\n    print(e)\nend\n").is_empty());
    }

    #[test]
    fn test_lambda_infers_return_type() {
        assert_eq!(
            check("let double = function(x: int) x * 2 end\nlet s: string = double(2)\n"),
            vec!["type mismatch: cannot assign int to string"]
        );
    }

    #[test]
    fn test_lambda_cannot_read_enclosing_locals() {
        let source = "function main()\n    let k = 3\n    let f = function(x) x + k end\n    print(f(1))\nend\n";
        assert_eq!(check(source), vec!["undefined: k"]);
    }

    #[test]
    fn test_nested_function_cannot_read_enclosing_locals() {
        let source = "function outer()\n    let k = 3\n    function inner()\n        return k\n    end\n    return inner()\nend\n";
        assert_eq!(check(source), vec!["undefined: k"]);
    }

    #[test]
    fn test_nested_scopes_still_see_globals_and_functions() {
        let source = "let k = 10\nfunction twice(n: int): int\n    return n * 2\nend\nfunction main()\n    let k = \"shadow\"\n    let f = function(x: int): int twice(x) + k end\n    function inner(): int\n        return k\n    end\n    print(f(1), inner())\nend\n";
        assert!(check(source).is_empty(), "{:?}", check(source));
    }

    #[test]
    fn test_defaults_see_only_globals() {
        let source = "function outer()\n    let local = 1\n    function f(a = local)\n        return a\n    end\n    return f()\nend\n";
        assert_eq!(check(source), vec!["undefined: local"]);

        let source = "let x = 10\nfunction f(a: int = x): int\n    return a\nend\nfunction main()\n    let x = \"local\"\n    print(f())\nend\n";
        assert!(check(source).is_empty(), "{:?}", check(source));
    }

    #[test]
    fn test_yield_outside_function() {
        assert_eq!(check("yield 1\n"), vec!["yield can only be used in coop functions"]);
    }
}
