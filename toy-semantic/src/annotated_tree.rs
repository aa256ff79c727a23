use std::fmt::Write;

use toy_core::Location;
use toy_syntax::{NodeId, SyntaxTree};

use crate::diagnostics::{DiagnosticCode, SemanticDiagnostic};
use crate::error::{Result, SemanticError};
use crate::ids::{ScopeId, SymbolId};
use crate::symbol_table::{ScopeKind, SymbolKind, SymbolTable};
use crate::types::{Type, TypeTable};

/// Results of semantic analysis, cross-referenced to the syntax tree.
///
/// The three node tables are indexed by [`NodeId`] and sized to the tree
/// they were created for. A node whose type is absent has not been resolved,
/// either because no pass visited it or because resolution failed and a
/// diagnostic was logged.
#[derive(Debug)]
pub struct AnnotatedTree {
    symbol_table: SymbolTable,
    types: TypeTable,
    node_scopes: Vec<Option<ScopeId>>,
    node_symbols: Vec<Option<SymbolId>>,
    node_types: Vec<Option<Type>>,
    checked: Vec<bool>,
    diagnostics: Vec<SemanticDiagnostic>,
}

impl AnnotatedTree {
    pub fn new(tree: &SyntaxTree, namespace: impl Into<String>) -> Self {
        Self {
            symbol_table: SymbolTable::new(namespace),
            types: TypeTable::new(),
            node_scopes: vec![None; tree.len()],
            node_symbols: vec![None; tree.len()],
            node_types: vec![None; tree.len()],
            checked: vec![false; tree.len()],
            diagnostics: Vec::new(),
        }
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn symbol_table_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbol_table
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeTable {
        &mut self.types
    }

    pub fn type_of(&self, node: NodeId) -> Option<Type> {
        self.node_types.get(node.index()).copied().flatten()
    }

    pub fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(node.index()).copied().flatten()
    }

    /// Scope bound to `node` by the pre-registration pass. Nodes that
    /// introduce a scope are bound to that scope, every other node to the
    /// scope it appears in.
    pub fn scope_of(&self, node: NodeId) -> Result<ScopeId> {
        self.node_scopes
            .get(node.index())
            .copied()
            .flatten()
            .ok_or(SemanticError::MissingScopeBinding { node })
    }

    /// Scope that contains a scope-introducing node such as a function
    /// declaration.
    pub fn enclosing_scope_of(&self, node: NodeId) -> Result<ScopeId> {
        let scope = self.scope_of(node)?;
        self.symbol_table
            .scope(scope)
            .enclosing
            .ok_or(SemanticError::UnexpectedScope {
                node,
                expected: "nested scope",
            })
    }

    pub fn set_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.node_scopes[node.index()] = Some(scope);
    }

    pub fn set_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.node_symbols[node.index()] = Some(symbol);
    }

    pub fn set_type(&mut self, node: NodeId, ty: Type) {
        self.node_types[node.index()] = Some(ty);
    }

    /// Marks `node` as checked for declaration errors. Returns `false` if it
    /// already was, so a node walked by several passes reports once.
    pub fn check_once(&mut self, node: NodeId) -> bool {
        !std::mem::replace(&mut self.checked[node.index()], true)
    }

    pub fn log(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        node: NodeId,
        location: Location,
    ) {
        self.diagnostics.push(SemanticDiagnostic {
            node,
            location,
            code,
            message: message.into(),
        });
    }

    pub fn diagnostics(&self) -> &[SemanticDiagnostic] {
        &self.diagnostics
    }

    pub fn display_type(&self, ty: Type) -> String {
        match ty {
            Type::Primitive(primitive) => primitive.keyword().to_string(),
            Type::Void => "void".to_string(),
            Type::Class(scope) => match self.symbol_table.owner(scope) {
                Some(symbol) => self.symbol_table.symbol(symbol).name.clone(),
                None => "<class>".to_string(),
            },
            Type::Function(id) => {
                let function = self.types.function(id);
                format!(
                    "function({}): {}",
                    self.display_types(&function.param_types),
                    self.display_type(function.return_type)
                )
            }
        }
    }

    fn display_types(&self, types: &[Type]) -> String {
        types
            .iter()
            .map(|ty| self.display_type(*ty))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn display_optional(&self, ty: Option<Type>) -> String {
        ty.map_or_else(|| "?".to_string(), |ty| self.display_type(ty))
    }

    /// `name(int, long)` for a function symbol.
    pub fn signature(&self, function: SymbolId) -> String {
        let symbol = self.symbol_table.symbol(function);
        let params = symbol
            .parameters()
            .iter()
            .map(|param| self.display_optional(self.symbol_table.symbol(*param).variable_type()))
            .collect::<Vec<_>>()
            .join(", ");

        format!("{}({params})", symbol.name)
    }

    /// Indented dump of the scope tree, starting at the root namespace.
    pub fn scope_tree_string(&self) -> String {
        let mut out = String::new();
        self.write_scope(&mut out, self.symbol_table.root(), 0);
        out
    }

    fn write_scope(&self, out: &mut String, scope: ScopeId, depth: usize) {
        let indent = "  ".repeat(depth);
        let table = &self.symbol_table;

        match &table.scope(scope).kind {
            ScopeKind::Namespace { name } => _ = writeln!(out, "{indent}namespace {name}"),
            ScopeKind::Block => _ = writeln!(out, "{indent}block"),
            ScopeKind::Class { symbol } => {
                let symbol = table.symbol(*symbol);
                _ = write!(out, "{indent}class {}", symbol.name);
                if let SymbolKind::Class {
                    superclass: Some(superclass),
                    ..
                } = symbol.kind
                {
                    _ = write!(out, " extends {}", self.display_type(Type::Class(superclass)));
                }
                out.push('\n');
            }
            ScopeKind::Function { symbol } => {
                _ = write!(out, "{indent}function {}", self.signature(*symbol));
                if let Some(return_type) = table.symbol(*symbol).return_type() {
                    _ = write!(out, ": {}", self.display_type(return_type));
                }
                out.push('\n');
            }
        }

        for symbol in table.symbols_in(scope) {
            match symbol.own_scope() {
                Some(own) => self.write_scope(out, own, depth + 1),
                None => {
                    _ = writeln!(
                        out,
                        "{indent}  variable {}: {}",
                        symbol.name,
                        self.display_optional(symbol.variable_type())
                    );
                }
            }
        }

        for block in table.scope(scope).blocks() {
            self.write_scope(out, *block, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use toy_syntax::{PrimitiveKeyword, TreeBuilder};

    use super::*;
    use crate::types::PrimitiveType;

    fn empty_tree() -> SyntaxTree {
        let mut b = TreeBuilder::new();
        let statement = b.block(Vec::new());
        b.finish(vec![statement])
    }

    #[test]
    fn test_unbound_node_is_structural_error() {
        let tree = empty_tree();
        let annotated = AnnotatedTree::new(&tree, "unit");

        assert_eq!(
            annotated.scope_of(tree.root()),
            Err(SemanticError::MissingScopeBinding { node: tree.root() })
        );
        assert_eq!(annotated.type_of(tree.root()), None);
        assert_eq!(annotated.symbol_of(NodeId(99)), None);
    }

    #[test]
    fn test_log_keeps_order() {
        let tree = empty_tree();
        let mut annotated = AnnotatedTree::new(&tree, "unit");
        let root = tree.root();

        annotated.log(DiagnosticCode::UnknownType, "first", root, Location::new(0, 1));
        annotated.log(DiagnosticCode::UnknownType, "second", root, Location::new(2, 3));

        let messages: Vec<&str> = annotated
            .diagnostics()
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn test_check_once() {
        let tree = empty_tree();
        let mut annotated = AnnotatedTree::new(&tree, "unit");

        assert!(annotated.check_once(tree.root()));
        assert!(!annotated.check_once(tree.root()));
    }

    #[test]
    fn test_display_nested_function_type() {
        let tree = empty_tree();
        let mut annotated = AnnotatedTree::new(&tree, "unit");
        let int = Type::primitive_for(PrimitiveKeyword::Int);
        let callback = annotated.types_mut().alloc_function(Type::void(), vec![int]);
        let outer = annotated
            .types_mut()
            .alloc_function(Type::Primitive(PrimitiveType::Boolean), vec![callback, int]);

        assert_eq!(
            annotated.display_type(outer),
            "function(function(int): void, int): boolean"
        );
    }
}
