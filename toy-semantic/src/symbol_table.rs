use serde::Serialize;
use toy_core::Location;
use toy_syntax::NodeId;

use crate::ids::{ScopeId, SymbolId};
use crate::types::{Type, TypeTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    Namespace { name: String },
    /// The scope of a class type. The class symbol lives in the enclosing scope.
    Class { symbol: SymbolId },
    /// The scope holding a function's parameters.
    Function { symbol: SymbolId },
    Block,
}

impl ScopeKind {
    pub fn is_class(&self) -> bool {
        matches!(self, ScopeKind::Class { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self, ScopeKind::Function { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub enclosing: Option<ScopeId>,
    symbols: Vec<SymbolId>,
    blocks: Vec<ScopeId>,
}

impl Scope {
    /// Symbols declared directly in this scope, in source order.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    /// Block scopes nested directly in this scope.
    pub fn blocks(&self) -> &[ScopeId] {
        &self.blocks
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    Variable {
        ty: Option<Type>,
    },
    Function {
        scope: ScopeId,
        return_type: Option<Type>,
        parameters: Vec<SymbolId>,
    },
    Class {
        scope: ScopeId,
        superclass: Option<ScopeId>,
    },
}

impl SymbolKind {
    pub fn name(&self) -> &'static str {
        match self {
            SymbolKind::Variable { .. } => "variable",
            SymbolKind::Function { .. } => "function",
            SymbolKind::Class { .. } => "class",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Scope that owns this symbol.
    pub enclosing: ScopeId,
    /// Syntax node that declared this symbol.
    pub node: NodeId,
    pub location: Location,
}

impl Symbol {
    pub fn variable_type(&self) -> Option<Type> {
        match self.kind {
            SymbolKind::Variable { ty } => ty,
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<Type> {
        match self.kind {
            SymbolKind::Function { return_type, .. } => return_type,
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[SymbolId] {
        match &self.kind {
            SymbolKind::Function { parameters, .. } => parameters,
            _ => &[],
        }
    }

    /// The scope this symbol introduces, for classes and functions.
    pub fn own_scope(&self) -> Option<ScopeId> {
        match self.kind {
            SymbolKind::Function { scope, .. } | SymbolKind::Class { scope, .. } => Some(scope),
            SymbolKind::Variable { .. } => None,
        }
    }
}

/// Arena of scopes and symbols. Scope 0 is the root namespace; every other
/// scope points at its enclosing scope by index, so ownership only runs from
/// the root towards the leaves.
#[derive(Debug, Serialize)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new(namespace: impl Into<String>) -> Self {
        let mut table = Self {
            scopes: Vec::new(),
            symbols: Vec::new(),
        };

        let kind = ScopeKind::Namespace {
            name: namespace.into(),
        };
        table.push_scope(kind, None);
        table
    }

    pub fn root(&self) -> ScopeId {
        ScopeId::from_raw(0)
    }

    fn next_scope_id(&self) -> ScopeId {
        ScopeId::from_raw(self.scopes.len() as u32)
    }

    fn next_symbol_id(&self) -> SymbolId {
        SymbolId::from_raw(self.symbols.len() as u32)
    }

    fn push_scope(&mut self, kind: ScopeKind, enclosing: Option<ScopeId>) -> ScopeId {
        let id = self.next_scope_id();
        self.scopes.push(Scope {
            id,
            kind,
            enclosing,
            symbols: Vec::new(),
            blocks: Vec::new(),
        });
        id
    }

    /// Add a symbol to `scope`. Duplicates are not rejected here; callers
    /// check with the `find_*` methods at the point of declaration.
    ///
    /// The scope keeps its symbols ordered by declaring location, so members
    /// registered by different passes still list in source order. Ties, e.g.
    /// a tree loaded without locations, fall back to node order, which is
    /// allocation order and so source order for builder and parser arenas.
    pub fn add_symbol(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        kind: SymbolKind,
        node: NodeId,
        location: Location,
    ) -> SymbolId {
        let id = self.next_symbol_id();
        self.symbols.push(Symbol {
            id,
            name: name.into(),
            kind,
            enclosing: scope,
            node,
            location,
        });

        let symbols = &self.symbols;
        let owned = &mut self.scopes[scope.index()].symbols;
        let key = (location.start_byte, node);
        let at = owned.partition_point(|existing| {
            let existing = &symbols[existing.index()];
            (existing.location.start_byte, existing.node) <= key
        });
        owned.insert(at, id);
        id
    }

    pub fn declare_variable(
        &mut self,
        scope: ScopeId,
        name: &str,
        node: NodeId,
        location: Location,
    ) -> SymbolId {
        self.add_symbol(scope, name, SymbolKind::Variable { ty: None }, node, location)
    }

    pub fn declare_function(
        &mut self,
        enclosing: ScopeId,
        name: &str,
        node: NodeId,
        location: Location,
    ) -> (SymbolId, ScopeId) {
        let symbol = self.next_symbol_id();
        let scope = self.push_scope(ScopeKind::Function { symbol }, Some(enclosing));
        let kind = SymbolKind::Function {
            scope,
            return_type: None,
            parameters: Vec::new(),
        };
        (self.add_symbol(enclosing, name, kind, node, location), scope)
    }

    pub fn declare_class(
        &mut self,
        enclosing: ScopeId,
        name: &str,
        node: NodeId,
        location: Location,
    ) -> (SymbolId, ScopeId) {
        let symbol = self.next_symbol_id();
        let scope = self.push_scope(ScopeKind::Class { symbol }, Some(enclosing));
        let kind = SymbolKind::Class {
            scope,
            superclass: None,
        };
        (self.add_symbol(enclosing, name, kind, node, location), scope)
    }

    pub fn push_block(&mut self, enclosing: ScopeId) -> ScopeId {
        let scope = self.push_scope(ScopeKind::Block, Some(enclosing));
        self.scopes[enclosing.index()].blocks.push(scope);
        scope
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    pub fn symbols_in(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.scope(scope)
            .symbols
            .iter()
            .map(|id| &self.symbols[id.index()])
    }

    /// The class or function symbol a scope belongs to.
    pub fn owner(&self, scope: ScopeId) -> Option<SymbolId> {
        match self.scope(scope).kind {
            ScopeKind::Class { symbol } | ScopeKind::Function { symbol } => Some(symbol),
            ScopeKind::Namespace { .. } | ScopeKind::Block => None,
        }
    }

    fn chain(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |id| self.scope(*id).enclosing)
    }

    /// Variable named `name` declared directly in `scope`.
    pub fn find_variable(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.symbols_in(scope)
            .find(|symbol| symbol.name == name && matches!(symbol.kind, SymbolKind::Variable { .. }))
            .map(|symbol| symbol.id)
    }

    /// Innermost variable named `name`, walking out through enclosing scopes.
    pub fn lookup_variable(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.chain(scope)
            .find_map(|scope| self.find_variable(scope, name))
    }

    /// Function declared directly in `scope` with this exact signature.
    pub fn find_function(
        &self,
        scope: ScopeId,
        name: &str,
        param_types: &[Type],
        types: &TypeTable,
    ) -> Option<SymbolId> {
        self.symbols_in(scope)
            .filter(|symbol| symbol.name == name)
            .find(|symbol| {
                self.parameter_types(symbol.id).is_some_and(|declared| {
                    types.match_parameter_types(param_types, &declared)
                })
            })
            .map(|symbol| symbol.id)
    }

    pub fn lookup_function(
        &self,
        scope: ScopeId,
        name: &str,
        param_types: &[Type],
        types: &TypeTable,
    ) -> Option<SymbolId> {
        self.chain(scope)
            .find_map(|scope| self.find_function(scope, name, param_types, types))
    }

    pub fn lookup_class(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.chain(scope).find_map(|scope| {
            self.symbols_in(scope)
                .find(|symbol| symbol.name == name && matches!(symbol.kind, SymbolKind::Class { .. }))
                .map(|symbol| symbol.id)
        })
    }

    /// Parameter types of a function symbol, or `None` while any parameter
    /// is still untyped.
    pub fn parameter_types(&self, function: SymbolId) -> Option<Vec<Type>> {
        let SymbolKind::Function { parameters, .. } = &self.symbol(function).kind else {
            return None;
        };

        parameters
            .iter()
            .map(|param| self.symbol(*param).variable_type())
            .collect()
    }

    pub fn set_variable_type(&mut self, variable: SymbolId, ty: Option<Type>) {
        if let SymbolKind::Variable { ty: slot } = &mut self.symbol_mut(variable).kind {
            *slot = ty;
        }
    }

    pub fn set_return_type(&mut self, function: SymbolId, ty: Option<Type>) {
        if let SymbolKind::Function { return_type, .. } = &mut self.symbol_mut(function).kind {
            *return_type = ty;
        }
    }

    pub fn push_parameter(&mut self, function: SymbolId, parameter: SymbolId) {
        if let SymbolKind::Function { parameters, .. } = &mut self.symbol_mut(function).kind
            && !parameters.contains(&parameter)
        {
            parameters.push(parameter);
        }
    }

    pub fn set_superclass(&mut self, class: SymbolId, superclass: ScopeId) {
        if let SymbolKind::Class { superclass: slot, .. } = &mut self.symbol_mut(class).kind {
            *slot = Some(superclass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;

    const INT: Type = Type::Primitive(PrimitiveType::Integer);
    const NODE: NodeId = NodeId(0);
    const AT: Location = Location {
        start_byte: 0,
        end_byte: 0,
    };

    #[test]
    fn test_lookup_variable_prefers_innermost() {
        let mut table = SymbolTable::new("unit");
        let root = table.root();
        let (_, class) = table.declare_class(root, "A", NODE, AT);
        let (_, function) = table.declare_function(class, "f", NODE, AT);

        let field = table.declare_variable(class, "x", NODE, AT);
        let param = table.declare_variable(function, "x", NODE, AT);
        let other = table.declare_variable(class, "y", NODE, AT);

        assert_eq!(table.lookup_variable(function, "x"), Some(param));
        assert_eq!(table.lookup_variable(class, "x"), Some(field));
        assert_eq!(table.lookup_variable(function, "y"), Some(other));
        assert_eq!(table.lookup_variable(function, "z"), None);
        assert_eq!(table.find_variable(function, "y"), None);
    }

    #[test]
    fn test_lookup_variable_ignores_functions() {
        let mut table = SymbolTable::new("unit");
        let root = table.root();
        table.declare_function(root, "x", NODE, AT);

        assert_eq!(table.lookup_variable(root, "x"), None);
    }

    #[test]
    fn test_find_function_matches_signature() {
        let types = TypeTable::new();
        let mut table = SymbolTable::new("unit");
        let root = table.root();

        let (one, one_scope) = table.declare_function(root, "f", NODE, AT);
        let p = table.declare_variable(one_scope, "p", NODE, AT);
        table.set_variable_type(p, Some(INT));
        table.push_parameter(one, p);

        let (two, two_scope) = table.declare_function(root, "f", NODE, AT);
        for name in ["a", "b"] {
            let param = table.declare_variable(two_scope, name, NODE, AT);
            table.set_variable_type(param, Some(INT));
            table.push_parameter(two, param);
        }

        assert_eq!(table.find_function(root, "f", &[INT], &types), Some(one));
        assert_eq!(table.find_function(root, "f", &[INT, INT], &types), Some(two));
        assert_eq!(table.find_function(root, "f", &[], &types), None);
        assert_eq!(table.lookup_function(two_scope, "f", &[INT], &types), Some(one));
    }

    #[test]
    fn test_untyped_parameters_never_match() {
        let types = TypeTable::new();
        let mut table = SymbolTable::new("unit");
        let root = table.root();
        let (function, scope) = table.declare_function(root, "f", NODE, AT);
        let param = table.declare_variable(scope, "p", NODE, AT);
        table.push_parameter(function, param);

        assert_eq!(table.parameter_types(function), None);
        assert_eq!(table.find_function(root, "f", &[INT], &types), None);
    }

    #[test]
    fn test_symbols_keep_insertion_order() {
        let mut table = SymbolTable::new("unit");
        let root = table.root();
        table.declare_variable(root, "b", NODE, AT);
        table.declare_function(root, "c", NODE, AT);
        table.declare_variable(root, "a", NODE, AT);

        let names: Vec<&str> = table.symbols_in(root).map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn test_symbols_ordered_by_location() {
        let mut table = SymbolTable::new("unit");
        let root = table.root();
        table.declare_function(root, "late", NODE, Location::new(20, 24));
        table.declare_variable(root, "early", NODE, Location::new(4, 9));
        table.declare_variable(root, "last", NODE, Location::new(30, 34));

        let names: Vec<&str> = table.symbols_in(root).map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["early", "late", "last"]);
    }

    #[test]
    fn test_same_location_ordered_by_node() {
        let mut table = SymbolTable::new("unit");
        let root = table.root();
        // functions are declared first by the pre-pass
        table.declare_function(root, "f", NodeId(9), AT);
        table.declare_variable(root, "x", NodeId(2), AT);
        table.declare_variable(root, "y", NodeId(12), AT);

        let names: Vec<&str> = table.symbols_in(root).map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["x", "f", "y"]);
    }

    #[test]
    fn test_push_parameter_is_idempotent() {
        let mut table = SymbolTable::new("unit");
        let root = table.root();
        let (function, scope) = table.declare_function(root, "f", NODE, AT);
        let param = table.declare_variable(scope, "p", NODE, AT);
        table.push_parameter(function, param);
        table.push_parameter(function, param);

        assert_eq!(table.symbol(function).parameters(), [param]);
    }
}
