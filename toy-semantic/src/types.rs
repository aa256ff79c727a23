use serde::Serialize;
use toy_syntax::PrimitiveKeyword;

use crate::ids::{FunctionTypeId, ScopeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveType {
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Byte,
    Short,
    Char,
    String,
}

impl PrimitiveType {
    pub fn for_keyword(keyword: PrimitiveKeyword) -> Self {
        match keyword {
            PrimitiveKeyword::Boolean => PrimitiveType::Boolean,
            PrimitiveKeyword::Int => PrimitiveType::Integer,
            PrimitiveKeyword::Long => PrimitiveType::Long,
            PrimitiveKeyword::Float => PrimitiveType::Float,
            PrimitiveKeyword::Double => PrimitiveType::Double,
            PrimitiveKeyword::Byte => PrimitiveType::Byte,
            PrimitiveKeyword::Short => PrimitiveType::Short,
            PrimitiveKeyword::Char => PrimitiveType::Char,
            PrimitiveKeyword::String => PrimitiveType::String,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::String => "string",
        }
    }
}

/// Handle to a resolved type.
///
/// Primitives and `Void` carry no payload, so every handle for the same
/// keyword is the same value and `==` is an identity check. Class types are
/// identified by their scope, function types by the slot allocated for the
/// syntax that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    Primitive(PrimitiveType),
    /// Only valid as a function return type.
    Void,
    Class(ScopeId),
    Function(FunctionTypeId),
}

impl Type {
    pub fn primitive_for(keyword: PrimitiveKeyword) -> Type {
        Type::Primitive(PrimitiveType::for_keyword(keyword))
    }

    pub fn void() -> Type {
        Type::Void
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionType {
    pub return_type: Type,
    pub param_types: Vec<Type>,
}

/// Owner of every function type and registry of all discovered types.
#[derive(Debug, Default, Serialize)]
pub struct TypeTable {
    functions: Vec<FunctionType>,
    discovered: Vec<Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh function type and register it. Function types are
    /// never interned: two identical signatures get two handles.
    pub fn alloc_function(&mut self, return_type: Type, param_types: Vec<Type>) -> Type {
        let id = FunctionTypeId::from_raw(self.functions.len() as u32);
        self.functions.push(FunctionType {
            return_type,
            param_types,
        });

        let ty = Type::Function(id);
        self.discovered.push(ty);
        ty
    }

    pub fn register(&mut self, ty: Type) {
        if !self.discovered.contains(&ty) {
            self.discovered.push(ty);
        }
    }

    pub fn function(&self, id: FunctionTypeId) -> &FunctionType {
        &self.functions[id.index()]
    }

    /// Every type discovered so far, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = Type> + '_ {
        self.discovered.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.discovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discovered.is_empty()
    }

    /// Identity for primitives, void and classes; (return, params) equality
    /// for function types.
    pub fn same_type(&self, lhs: Type, rhs: Type) -> bool {
        match (lhs, rhs) {
            (Type::Function(lhs), Type::Function(rhs)) => {
                let lhs = self.function(lhs);
                let rhs = self.function(rhs);
                self.same_type(lhs.return_type, rhs.return_type)
                    && self.match_parameter_types(&lhs.param_types, &rhs.param_types)
            }
            (lhs, rhs) => lhs == rhs,
        }
    }

    /// Positional exact match. No widening and no subclass covariance.
    pub fn match_parameter_types(&self, candidate: &[Type], declared: &[Type]) -> bool {
        candidate.len() == declared.len()
            && candidate
                .iter()
                .zip(declared)
                .all(|(lhs, rhs)| self.same_type(*lhs, *rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INT: Type = Type::Primitive(PrimitiveType::Integer);
    const LONG: Type = Type::Primitive(PrimitiveType::Long);

    #[test]
    fn test_keywords_map_to_distinct_primitives() {
        let types: Vec<Type> = PrimitiveKeyword::ALL
            .into_iter()
            .map(Type::primitive_for)
            .collect();

        for (i, lhs) in types.iter().enumerate() {
            for (j, rhs) in types.iter().enumerate() {
                assert_eq!(i == j, lhs == rhs);
            }
        }
        assert_eq!(Type::primitive_for(PrimitiveKeyword::Int), INT);
    }

    #[test]
    fn test_function_types_are_not_interned() {
        let mut table = TypeTable::new();
        let first = table.alloc_function(INT, vec![INT]);
        let second = table.alloc_function(INT, vec![INT]);

        assert_ne!(first, second);
        assert!(table.same_type(first, second));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_nested_function_types_compare_structurally() {
        let mut table = TypeTable::new();
        let callback = table.alloc_function(Type::void(), vec![INT]);
        let other_callback = table.alloc_function(Type::void(), vec![LONG]);
        let lhs = table.alloc_function(INT, vec![callback]);
        let rhs = table.alloc_function(INT, vec![callback]);
        let different = table.alloc_function(INT, vec![other_callback]);

        assert!(table.same_type(lhs, rhs));
        assert!(!table.same_type(lhs, different));
    }

    #[test]
    fn test_match_parameter_types_is_positional() {
        let table = TypeTable::new();

        assert!(table.match_parameter_types(&[INT, LONG], &[INT, LONG]));
        assert!(!table.match_parameter_types(&[LONG, INT], &[INT, LONG]));
        assert!(!table.match_parameter_types(&[INT], &[INT, INT]));
        assert!(table.match_parameter_types(&[], &[]));
    }

    #[test]
    fn test_register_keeps_discovery_order() {
        let mut table = TypeTable::new();
        table.register(Type::Class(ScopeId::from_raw(3)));
        let function = table.alloc_function(Type::void(), Vec::new());
        table.register(Type::Class(ScopeId::from_raw(3)));

        let discovered: Vec<Type> = table.iter().collect();
        assert_eq!(discovered, vec![Type::Class(ScopeId::from_raw(3)), function]);
    }
}
