//! Statement AST nodes
//!
//! Declarations (let, const, function, class, enum, import), control flow
//! (if, while, for, return, break, continue, try, throw) and blocks.

use std::fmt;

use super::{join, Expression, Identifier, TypeAnnotation};
use crate::parser::token::Token;

/// Statement (does not produce a value)
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// let x: int = 5
    Let(LetStatement),

    /// const PI = 3.14
    Const(ConstStatement),

    /// return expr
    Return(ReturnStatement),

    /// break
    Break(BreakStatement),

    /// continue
    Continue(ContinueStatement),

    /// Expression used as a statement: print(x), x += 1
    Expression(ExpressionStatement),

    /// function name(params) ... end
    Function(FunctionStatement),

    /// if / elif / else / end
    If(IfStatement),

    /// while cond ... end
    While(WhileStatement),

    /// for x in iterable ... end
    For(ForStatement),

    /// class Name(Super) ... end
    Class(ClassStatement),

    /// import a.b as c
    Import(ImportStatement),

    /// unsafe ... end
    Unsafe(UnsafeStatement),

    /// enum Name ... end
    Enum(EnumStatement),

    /// try / catch / finally / end
    Try(TryStatement),

    /// throw expr
    Throw(ThrowStatement),

    /// Nested block
    Block(BlockStatement),
}

impl Statement {
    /// The token this statement originated from.
    pub fn token(&self) -> &Token {
        match self {
            Statement::Let(s) => &s.token,
            Statement::Const(s) => &s.token,
            Statement::Return(s) => &s.token,
            Statement::Break(s) => &s.token,
            Statement::Continue(s) => &s.token,
            Statement::Expression(s) => &s.token,
            Statement::Function(s) => &s.token,
            Statement::If(s) => &s.token,
            Statement::While(s) => &s.token,
            Statement::For(s) => &s.token,
            Statement::Class(s) => &s.token,
            Statement::Import(s) => &s.token,
            Statement::Unsafe(s) => &s.token,
            Statement::Enum(s) => &s.token,
            Statement::Try(s) => &s.token,
            Statement::Throw(s) => &s.token,
            Statement::Block(s) => &s.token,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(s) => {
                write!(f, "let {}", s.name)?;
                if let Some(ty) = &s.type_annotation {
                    write!(f, ": {}", ty)?;
                }
                if let Some(value) = &s.value {
                    write!(f, " = {}", value)?;
                }
                Ok(())
            }
            Statement::Const(s) => {
                write!(f, "const {}", s.name)?;
                if let Some(ty) = &s.type_annotation {
                    write!(f, ": {}", ty)?;
                }
                write!(f, " = {}", s.value)
            }
            Statement::Return(s) => match &s.value {
                Some(value) => write!(f, "return {}", value),
                None => f.write_str("return"),
            },
            Statement::Break(_) => f.write_str("break"),
            Statement::Continue(_) => f.write_str("continue"),
            Statement::Expression(s) => write!(f, "{}", s.expression),
            Statement::Function(s) => {
                for decorator in &s.decorators {
                    write!(f, "{} ", decorator)?;
                }
                if s.is_async {
                    f.write_str("async ")?;
                }
                if s.is_coop {
                    f.write_str("coop ")?;
                }
                write!(f, "function {}({})", s.name, join(&s.parameters))?;
                if let Some(ret) = &s.return_type {
                    write!(f, ": {}", ret)?;
                }
                write!(f, " {} end", s.body)
            }
            Statement::If(s) => {
                write!(f, "if {} {}", s.condition, s.consequence)?;
                for elif in &s.elifs {
                    write!(f, " elif {} {}", elif.condition, elif.consequence)?;
                }
                if let Some(alt) = &s.alternative {
                    write!(f, " else {}", alt)?;
                }
                f.write_str(" end")
            }
            Statement::While(s) => write!(f, "while {} {} end", s.condition, s.body),
            Statement::For(s) => write!(f, "for {} in {} {} end", s.iterator, s.iterable, s.body),
            Statement::Class(s) => {
                write!(f, "class {}", s.name)?;
                if let Some(sup) = &s.superclass {
                    write!(f, "({})", sup)?;
                }
                write!(f, " {} end", s.body)
            }
            Statement::Import(s) => {
                write!(f, "import {}", s.module_path())?;
                if let Some(alias) = &s.alias {
                    write!(f, " as {}", alias)?;
                }
                Ok(())
            }
            Statement::Unsafe(s) => write!(f, "unsafe {} end", s.body),
            Statement::Enum(s) => {
                let variants: Vec<String> = s.variants.iter().map(|v| v.to_string()).collect();
                write!(f, "enum {} {{ {} }} end", s.name, variants.join(", "))
            }
            Statement::Try(s) => {
                write!(f, "try {}", s.body)?;
                if let Some(catch) = &s.catch {
                    f.write_str(" catch")?;
                    if let Some(name) = &catch.name {
                        write!(f, " {}", name)?;
                    }
                    write!(f, " {}", catch.body)?;
                }
                if let Some(finally) = &s.finally {
                    write!(f, " finally {}", finally)?;
                }
                f.write_str(" end")
            }
            Statement::Throw(s) => write!(f, "throw {}", s.value),
            Statement::Block(s) => write!(f, "{}", s),
        }
    }
}

/// let x[: T] [= value]
#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub type_annotation: Option<TypeAnnotation>,
    pub value: Option<Expression>,
}

/// const X[: T] = value
#[derive(Debug, Clone, PartialEq)]
pub struct ConstStatement {
    pub token: Token,
    pub name: Identifier,
    pub type_annotation: Option<TypeAnnotation>,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStatement {
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionStatement {
    pub token: Token,
    pub name: Identifier,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub body: BlockStatement,
    pub is_async: bool,
    pub is_coop: bool,
    pub decorators: Vec<Decorator>,
}

impl FunctionStatement {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_variadic(&self) -> bool {
        self.parameters.last().map(|p| p.variadic).unwrap_or(false)
    }

    /// Number of parameters a caller must supply.
    pub fn required_parameters(&self) -> usize {
        self.parameters
            .iter()
            .take_while(|p| p.default.is_none() && !p.variadic)
            .count()
    }
}

/// Function parameter: name[: T][= default] or ...name[: T]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub token: Token,
    pub name: Identifier,
    pub type_annotation: Option<TypeAnnotation>,
    pub default: Option<Expression>,
    pub variadic: bool,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            f.write_str("...")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(ty) = &self.type_annotation {
            write!(f, ": {}", ty)?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

/// Decorator: @name or @name(args)
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub token: Token,
    pub name: Identifier,
    pub arguments: Vec<Expression>,
}

impl fmt::Display for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "({})", join(&self.arguments))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub token: Token,
    pub condition: Expression,
    pub consequence: BlockStatement,
    pub elifs: Vec<ElifClause>,
    pub alternative: Option<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElifClause {
    pub token: Token,
    pub condition: Expression,
    pub consequence: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub token: Token,
    pub condition: Expression,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub token: Token,
    pub iterator: Identifier,
    pub iterable: Expression,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassStatement {
    pub token: Token,
    pub name: Identifier,
    pub superclass: Option<Identifier>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub token: Token,
    pub path: Vec<Identifier>,
    pub alias: Option<Identifier>,
}

impl ImportStatement {
    /// Dotted module path: `a.b.c`
    pub fn module_path(&self) -> String {
        self.path
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Name the import binds in the importing scope.
    pub fn binding(&self) -> Option<&Identifier> {
        self.alias.as_ref().or_else(|| self.path.last())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnsafeStatement {
    pub token: Token,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumStatement {
    pub token: Token,
    pub name: Identifier,
    pub variants: Vec<EnumVariant>,
}

/// Enum variant with optional payload types
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    pub name: Identifier,
    pub payload: Vec<TypeAnnotation>,
}

impl fmt::Display for EnumVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.payload.is_empty() {
            write!(f, "({})", join(&self.payload))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    pub token: Token,
    pub body: BlockStatement,
    pub catch: Option<CatchClause>,
    pub finally: Option<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub token: Token,
    pub name: Option<Identifier>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    pub token: Token,
    pub value: Expression,
}

/// Sequence of statements; opened by NEWLINE + INDENT, closed by DEDENT.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, stmt) in self.statements.iter().enumerate() {
            let sep = if i == 0 { " " } else { "; " };
            write!(f, "{}{}", sep, stmt)?;
        }
        f.write_str(" }")
    }
}
