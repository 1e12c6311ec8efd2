//! Type context owning class and enum definitions
//!
//! Class types are stored in an arena and referred to by [`ClassId`], so
//! superclass links and member tables never form pointer cycles.

use rustc_hash::FxHashMap;

use super::ty::{BasicType, ClassId, FunctionType, Type};
use crate::parser::ast::TypeAnnotation;

/// Definition of a class (or enum) type.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub name: String,
    pub superclass: Option<ClassId>,
    pub fields: FxHashMap<String, Type>,
    pub methods: FxHashMap<String, FunctionType>,
    /// Declared with `enum`; variants are stored as fields (unit) or methods (payload)
    pub is_enum: bool,
}

impl ClassInfo {
    fn new(name: &str, is_enum: bool) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            fields: FxHashMap::default(),
            methods: FxHashMap::default(),
            is_enum,
        }
    }
}

/// Type context that manages all class types in a program.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    /// Storage for all classes, indexed by ClassId
    classes: Vec<ClassInfo>,

    /// Named class definitions; a later declaration shadows an earlier one
    named_classes: FxHashMap<String, ClassId>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new class type and register its name.
    pub fn declare_class(&mut self, name: &str, is_enum: bool) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassInfo::new(name, is_enum));
        self.named_classes.insert(name.to_string(), id);
        id
    }

    pub fn class(&self, id: ClassId) -> &ClassInfo {
        &self.classes[id.0 as usize]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassInfo {
        &mut self.classes[id.0 as usize]
    }

    pub fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.named_classes.get(name).copied()
    }

    /// The [`Type`] value referring to a class.
    pub fn class_type(&self, id: ClassId) -> Type {
        Type::Class {
            id,
            name: self.class(id).name.clone(),
        }
    }

    /// Link `id` to its superclass.
    ///
    /// Returns `false` (leaving the class unchanged) if the link would make
    /// the inheritance chain cyclic.
    pub fn set_superclass(&mut self, id: ClassId, superclass: ClassId) -> bool {
        if self.is_subclass(superclass, id) {
            return false;
        }
        self.class_mut(id).superclass = Some(superclass);
        true
    }

    /// Whether `id` is `ancestor` or inherits from it.
    pub fn is_subclass(&self, id: ClassId, ancestor: ClassId) -> bool {
        self.ancestors(id).any(|class| class == ancestor)
    }

    /// `id` followed by its superclasses, nearest first.
    pub fn ancestors(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        // Chains are acyclic (see set_superclass), so at most classes.len() steps.
        std::iter::successors(Some(id), move |current| self.class(*current).superclass)
            .take(self.classes.len())
    }

    /// Find a field or method on a class, searching up the superclass chain.
    pub fn find_member(&self, id: ClassId, member: &str) -> Option<Type> {
        self.ancestors(id).find_map(|class| {
            let info = self.class(class);
            info.fields
                .get(member)
                .cloned()
                .or_else(|| info.methods.get(member).cloned().map(Type::Function))
        })
    }

    /// Convert a source annotation into a type.
    ///
    /// Unknown names resolve to `any`, so annotations mentioning types from
    /// unchecked modules never block compilation.
    pub fn resolve_annotation(&self, annotation: &TypeAnnotation) -> Type {
        match annotation {
            TypeAnnotation::Basic { name, .. } => match BasicType::from_name(name) {
                Some(basic) => Type::Basic(basic),
                None => match self.lookup_class(name) {
                    Some(id) => self.class_type(id),
                    None => Type::ANY,
                },
            },
            TypeAnnotation::Pointer { pointee, .. } => {
                Type::pointer(self.resolve_annotation(pointee))
            }
            TypeAnnotation::List { element, .. } => Type::list(self.resolve_annotation(element)),
            TypeAnnotation::Dict { key, value, .. } => {
                Type::dict(self.resolve_annotation(key), self.resolve_annotation(value))
            }
        }
    }

    /// Resolve an optional annotation, defaulting to `any`.
    pub fn resolve_optional(&self, annotation: Option<&TypeAnnotation>) -> Type {
        annotation.map_or(Type::ANY, |ann| self.resolve_annotation(ann))
    }
}
