//! Core type definitions for the Sky type system

use std::fmt;

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    /// 64-bit signed integer
    Int,
    /// IEEE 754 double
    Float,
    String,
    Bool,
    /// Dynamic type; assignable to and from everything
    Any,
    /// Result of functions that return nothing
    Void,
    /// Type of the `nil` literal
    Nil,
}

impl BasicType {
    /// Look up a basic type by its source spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "int" => BasicType::Int,
            "float" => BasicType::Float,
            "string" => BasicType::String,
            "bool" => BasicType::Bool,
            "any" => BasicType::Any,
            "void" => BasicType::Void,
            "nil" => BasicType::Nil,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BasicType::Int => "int",
            BasicType::Float => "float",
            BasicType::String => "string",
            BasicType::Bool => "bool",
            BasicType::Any => "any",
            BasicType::Void => "void",
            BasicType::Nil => "nil",
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a class in the [`TypeContext`](super::TypeContext) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Function type: (T1, T2, ..., Tn) => R
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    /// Parameter types. A variadic parameter is listed last with its element type.
    pub params: Vec<Type>,
    /// Return type
    pub return_type: Box<Type>,
    /// Whether the last parameter collects surplus arguments
    pub variadic: bool,
    /// Number of leading parameters without a default value
    pub min_params: usize,
}

impl FunctionType {
    /// A function type where every parameter is required.
    pub fn new(params: Vec<Type>, return_type: Type) -> Self {
        let min_params = params.len();
        Self {
            params,
            return_type: Box::new(return_type),
            variadic: false,
            min_params,
        }
    }

    pub fn with_min_params(mut self, min_params: usize) -> Self {
        self.min_params = min_params;
        self
    }

    pub fn with_variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }

    /// Upper bound on accepted arguments, or `None` when variadic.
    pub fn max_params(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            Some(self.params.len())
        }
    }

    /// Type expected for the argument at `index`, following the variadic tail.
    pub fn param_at(&self, index: usize) -> Option<&Type> {
        match self.params.get(index) {
            Some(ty) => Some(ty),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        if self.variadic {
            f.write_str("...")?;
        }
        write!(f, ") => {}", self.return_type)
    }
}

/// A Sky type. Equality is structural; classes compare by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// int, float, string, bool, any, void, nil
    Basic(BasicType),

    /// List type: [T]
    List(Box<Type>),

    /// Dict type: {K: V}
    Dict(Box<Type>, Box<Type>),

    /// Function type
    Function(FunctionType),

    /// Pointer type: *T
    Pointer(Box<Type>),

    /// Class or enum type. Members live in the type context.
    Class { id: ClassId, name: String },
}

impl Type {
    pub const INT: Type = Type::Basic(BasicType::Int);
    pub const FLOAT: Type = Type::Basic(BasicType::Float);
    pub const STRING: Type = Type::Basic(BasicType::String);
    pub const BOOL: Type = Type::Basic(BasicType::Bool);
    pub const ANY: Type = Type::Basic(BasicType::Any);
    pub const VOID: Type = Type::Basic(BasicType::Void);
    pub const NIL: Type = Type::Basic(BasicType::Nil);

    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn dict(key: Type, value: Type) -> Self {
        Type::Dict(Box::new(key), Box::new(value))
    }

    pub fn pointer(pointee: Type) -> Self {
        Type::Pointer(Box::new(pointee))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Basic(BasicType::Any))
    }

    /// int or float
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Basic(BasicType::Int | BasicType::Float))
    }

    /// Acceptable as a condition: bool, or any when the static type is unknown.
    pub fn is_condition(&self) -> bool {
        matches!(self, Type::Basic(BasicType::Bool | BasicType::Any))
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Element type produced by iterating over a value of this type.
    ///
    /// Lists yield elements, dicts yield keys, strings yield one-character
    /// strings. Returns `None` for types that cannot be iterated.
    pub fn iteration_type(&self) -> Option<Type> {
        match self {
            Type::List(element) => Some((**element).clone()),
            Type::Dict(key, _) => Some((**key).clone()),
            Type::Basic(BasicType::String) => Some(Type::STRING),
            Type::Basic(BasicType::Any) => Some(Type::ANY),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(basic) => write!(f, "{}", basic),
            Type::List(element) => write!(f, "[{}]", element),
            Type::Dict(key, value) => write!(f, "{{{}: {}}}", key, value),
            Type::Function(func) => write!(f, "{}", func),
            Type::Pointer(pointee) => write!(f, "*{}", pointee),
            Type::Class { name, .. } => f.write_str(name),
        }
    }
}
