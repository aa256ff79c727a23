use toy_syntax::{NodeId, NodeKind, SyntaxListener, SyntaxTree};

use crate::annotated_tree::AnnotatedTree;
use crate::diagnostics::DiagnosticCode;
use crate::error::{Result, SemanticError};
use crate::ids::{ScopeId, SymbolId};
use crate::symbol_table::ScopeKind;
use crate::types::Type;

/// Which declarator ids get a variable symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Class fields and function parameters only. Locals are left for a
    /// later pass that declares them while resolving references, so a use
    /// can never bind to a local declared after it.
    #[default]
    MembersOnly,
    /// Fields, parameters and block-local variables.
    WithLocals,
}

/// Resolves every type annotation bottom-up and declares the variables the
/// mode asks for.
///
/// Runs after [`crate::ScopeBuilder`]: every visited node must already be
/// bound to a scope. Duplicate declarations are logged on the annotated
/// tree and skipped; only structural problems stop the walk.
#[derive(Debug)]
pub struct TypeResolver<'a> {
    annotated: &'a mut AnnotatedTree,
    mode: ResolveMode,
}

impl<'a> TypeResolver<'a> {
    pub fn new(annotated: &'a mut AnnotatedTree, mode: ResolveMode) -> Self {
        Self { annotated, mode }
    }

    pub fn resolve(&mut self, tree: &SyntaxTree) -> Result<()> {
        tree.walk(self)
    }

    /// Resolve the subtree under `node` only, e.g. one function body.
    pub fn resolve_node(&mut self, tree: &SyntaxTree, node: NodeId) -> Result<()> {
        tree.walk_from(node, self)
    }

    fn declares_in(&self, scope: ScopeId) -> bool {
        match self.annotated.symbol_table().scope(scope).kind {
            ScopeKind::Class { .. } | ScopeKind::Function { .. } => true,
            ScopeKind::Namespace { .. } | ScopeKind::Block => self.mode == ResolveMode::WithLocals,
        }
    }

    fn types_in(&self, scope: ScopeId) -> bool {
        self.annotated.symbol_table().scope(scope).kind.is_class()
            || self.mode == ResolveMode::WithLocals
    }

    fn function_symbol(&self, node: NodeId) -> Result<SymbolId> {
        let scope = self.annotated.scope_of(node)?;
        match self.annotated.symbol_table().scope(scope).kind {
            ScopeKind::Function { symbol } => Ok(symbol),
            _ => Err(SemanticError::UnexpectedScope {
                node,
                expected: "function",
            }),
        }
    }

    fn class_symbol(&self, node: NodeId) -> Result<(SymbolId, ScopeId)> {
        let scope = self.annotated.scope_of(node)?;
        match self.annotated.symbol_table().scope(scope).kind {
            ScopeKind::Class { symbol } => Ok((symbol, scope)),
            _ => Err(SemanticError::UnexpectedScope {
                node,
                expected: "class",
            }),
        }
    }

    fn enter_variable_declarator_id(
        &mut self,
        tree: &SyntaxTree,
        id: NodeId,
        name: &str,
    ) -> Result<()> {
        if self.annotated.symbol_of(id).is_some() {
            return Ok(());
        }

        let scope = self.annotated.scope_of(id)?;
        if !self.declares_in(scope) || !self.annotated.check_once(id) {
            return Ok(());
        }

        if self.annotated.symbol_table().find_variable(scope, name).is_some() {
            self.annotated.log(
                DiagnosticCode::DuplicateDeclaration,
                format!("variable or parameter already declared: {name}"),
                id,
                tree.location(id),
            );
            return Ok(());
        }

        let symbol = self
            .annotated
            .symbol_table_mut()
            .declare_variable(scope, name, id, tree.location(id));
        self.annotated.set_symbol(id, symbol);
        tracing::trace!(variable = %name, ?scope, "declared variable");

        Ok(())
    }

    fn exit_variable_declarators(
        &mut self,
        tree: &SyntaxTree,
        id: NodeId,
        type_type: NodeId,
        declarators: &[NodeId],
    ) -> Result<()> {
        let scope = self.annotated.scope_of(id)?;
        if !self.types_in(scope) {
            return Ok(());
        }

        let ty = self.annotated.type_of(type_type);
        for declarator in declarators {
            let declarator_id = match tree.kind(*declarator) {
                NodeKind::VariableDeclarator { id, .. } => *id,
                other => {
                    return Err(SemanticError::UnexpectedNode {
                        node: *declarator,
                        found: other.name(),
                        expected: "variable declarator",
                    });
                }
            };

            // duplicates were never bound
            if let Some(variable) = self.annotated.symbol_of(declarator_id) {
                self.annotated
                    .symbol_table_mut()
                    .set_variable_type(variable, ty);
            }
        }

        Ok(())
    }

    fn exit_formal_parameter(
        &mut self,
        id: NodeId,
        type_type: NodeId,
        declarator_id: NodeId,
    ) -> Result<()> {
        let Some(variable) = self.annotated.symbol_of(declarator_id) else {
            return Ok(());
        };

        let ty = self.annotated.type_of(type_type);
        let function = self.function_symbol(id)?;
        let table = self.annotated.symbol_table_mut();
        table.set_variable_type(variable, ty);
        table.push_parameter(function, variable);

        Ok(())
    }

    fn exit_function_declaration(
        &mut self,
        tree: &SyntaxTree,
        id: NodeId,
        name: &str,
        return_type: Option<NodeId>,
    ) -> Result<()> {
        let function = self.function_symbol(id)?;
        if let Some(return_type) = return_type {
            let ty = self.annotated.type_of(return_type);
            self.annotated
                .symbol_table_mut()
                .set_return_type(function, ty);
        }

        if !self.annotated.check_once(id) {
            return Ok(());
        }

        // parameters are complete only now
        let enclosing = self.annotated.enclosing_scope_of(id)?;
        let table = self.annotated.symbol_table();
        let Some(param_types) = table.parameter_types(function) else {
            return Ok(());
        };

        let found = table.find_function(enclosing, name, &param_types, self.annotated.types());
        if found.is_some_and(|found| found != function) {
            let message = format!(
                "function or method already declared: {}",
                self.annotated.signature(function)
            );
            self.annotated.log(
                DiagnosticCode::DuplicateDeclaration,
                message,
                id,
                tree.location(id),
            );
        }

        Ok(())
    }

    fn exit_class_declaration(
        &mut self,
        tree: &SyntaxTree,
        id: NodeId,
        name: &str,
        superclass: Option<NodeId>,
    ) -> Result<()> {
        let Some(Type::Class(target)) = superclass.and_then(|node| self.annotated.type_of(node))
        else {
            return Ok(());
        };
        if !self.annotated.check_once(id) {
            return Ok(());
        }

        let (class, scope) = self.class_symbol(id)?;
        if target == scope {
            self.annotated.log(
                DiagnosticCode::InvalidSuperclass,
                format!("class {name} cannot extend itself"),
                id,
                tree.location(id),
            );
            return Ok(());
        }

        self.annotated
            .symbol_table_mut()
            .set_superclass(class, target);
        Ok(())
    }

    fn exit_function_type(
        &mut self,
        id: NodeId,
        parameter_types: &[NodeId],
        return_type: NodeId,
    ) -> Result<()> {
        if self.annotated.type_of(id).is_some() {
            return Ok(());
        }

        // an unresolved part was already reported where it failed
        let Some(returns) = self.annotated.type_of(return_type) else {
            return Ok(());
        };
        let Some(params) = parameter_types
            .iter()
            .map(|param| self.annotated.type_of(*param))
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(());
        };

        let ty = self.annotated.types_mut().alloc_function(returns, params);
        self.annotated.set_type(id, ty);
        Ok(())
    }

    fn exit_class_reference(&mut self, tree: &SyntaxTree, id: NodeId, name: &str) -> Result<()> {
        if self.annotated.type_of(id).is_some() || !self.annotated.check_once(id) {
            return Ok(());
        }

        let scope = self.annotated.scope_of(id)?;
        let table = self.annotated.symbol_table();
        match table
            .lookup_class(scope, name)
            .and_then(|class| table.symbol(class).own_scope())
        {
            Some(class_scope) => self.annotated.set_type(id, Type::Class(class_scope)),
            None => self.annotated.log(
                DiagnosticCode::UnknownType,
                format!("unknown type: {name}"),
                id,
                tree.location(id),
            ),
        }

        Ok(())
    }

    fn bubble(&mut self, id: NodeId, child: NodeId) {
        if let Some(ty) = self.annotated.type_of(child) {
            self.annotated.set_type(id, ty);
        }
    }
}

impl SyntaxListener for TypeResolver<'_> {
    type Error = SemanticError;

    fn enter_node(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<()> {
        match tree.kind(id) {
            NodeKind::VariableDeclaratorId { name } => {
                self.enter_variable_declarator_id(tree, id, name)
            }
            _ => Ok(()),
        }
    }

    fn exit_node(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<()> {
        match tree.kind(id) {
            NodeKind::PrimitiveType { keyword } => {
                self.annotated.set_type(id, Type::primitive_for(*keyword));
                Ok(())
            }
            NodeKind::TypeTypeOrVoid { type_type: None } => {
                self.annotated.set_type(id, Type::void());
                Ok(())
            }
            NodeKind::TypeTypeOrVoid {
                type_type: Some(child),
            }
            | NodeKind::TypeType { alternative: child } => {
                self.bubble(id, *child);
                Ok(())
            }
            NodeKind::FunctionType {
                parameter_types,
                return_type,
            } => self.exit_function_type(id, parameter_types, *return_type),
            NodeKind::ClassOrInterfaceType { name } => self.exit_class_reference(tree, id, name),
            NodeKind::VariableDeclarators {
                type_type,
                declarators,
            } => self.exit_variable_declarators(tree, id, *type_type, declarators),
            NodeKind::FormalParameter {
                type_type,
                declarator_id,
            } => self.exit_formal_parameter(id, *type_type, *declarator_id),
            NodeKind::FunctionDeclaration {
                name, return_type, ..
            } => self.exit_function_declaration(tree, id, name, *return_type),
            NodeKind::ClassDeclaration {
                name, superclass, ..
            } => self.exit_class_declaration(tree, id, name, *superclass),
            NodeKind::CompilationUnit { .. }
            | NodeKind::VariableDeclarator { .. }
            | NodeKind::VariableDeclaratorId { .. }
            | NodeKind::Block { .. }
            | NodeKind::ExpressionStatement { .. }
            | NodeKind::Literal { .. }
            | NodeKind::Identifier { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use toy_syntax::{PrimitiveKeyword, TreeBuilder};

    use super::*;
    use crate::ScopeBuilder;
    use crate::types::PrimitiveType;

    const INT: Type = Type::Primitive(PrimitiveType::Integer);

    #[test]
    fn test_missing_scope_binding_aborts() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(PrimitiveKeyword::Int);
        let field = b.variables(int, &["x"]);
        let tree = b.finish(vec![field]);

        // no pre-registration pass
        let mut annotated = AnnotatedTree::new(&tree, "unit");
        let result = TypeResolver::new(&mut annotated, ResolveMode::MembersOnly).resolve(&tree);

        assert!(matches!(
            result,
            Err(SemanticError::MissingScopeBinding { .. })
        ));
    }

    #[test]
    fn test_members_only_skips_locals() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(PrimitiveKeyword::Int);
        let param = b.parameter(int, "p");
        let local_type = b.primitive(PrimitiveKeyword::Int);
        let local = b.variables(local_type, &["l"]);
        let body = b.block(vec![local]);
        let function = b.function("f", None, vec![param], body);
        let tree = b.finish(vec![function]);

        let mut annotated = ScopeBuilder::build(&tree, "unit");
        TypeResolver::new(&mut annotated, ResolveMode::MembersOnly)
            .resolve(&tree)
            .unwrap();

        let table = annotated.symbol_table();
        let body_scope = annotated.scope_of(body).unwrap();
        assert_eq!(table.symbols_in(body_scope).count(), 0);
        // the type annotation is still resolved
        assert_eq!(annotated.type_of(local_type), Some(INT));

        TypeResolver::new(&mut annotated, ResolveMode::WithLocals)
            .resolve_node(&tree, body)
            .unwrap();

        let table = annotated.symbol_table();
        let local = table.find_variable(body_scope, "l").unwrap();
        assert_eq!(table.symbol(local).variable_type(), Some(INT));
        assert!(annotated.diagnostics().is_empty());
    }

    #[test]
    fn test_top_level_variables_need_local_mode() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(PrimitiveKeyword::Int);
        let global = b.variables(int, &["g"]);
        let tree = b.finish(vec![global]);

        let mut annotated = ScopeBuilder::build(&tree, "unit");
        let root = annotated.symbol_table().root();
        TypeResolver::new(&mut annotated, ResolveMode::MembersOnly)
            .resolve(&tree)
            .unwrap();
        assert_eq!(annotated.symbol_table().find_variable(root, "g"), None);

        TypeResolver::new(&mut annotated, ResolveMode::WithLocals)
            .resolve(&tree)
            .unwrap();
        let g = annotated.symbol_table().find_variable(root, "g").unwrap();
        assert_eq!(annotated.symbol_table().symbol(g).variable_type(), Some(INT));
    }

    #[test]
    fn test_resolving_twice_is_idempotent() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(PrimitiveKeyword::Int);
        let returns = b.returns(int);
        let param_type = b.primitive(PrimitiveKeyword::Int);
        let callback = b.function_type(vec![param_type], returns);
        let field = b.variables(callback, &["on_change"]);
        let class = b.class("A", None, vec![field]);
        let tree = b.finish(vec![class]);

        let mut annotated = ScopeBuilder::build(&tree, "unit");
        for _ in 0..2 {
            TypeResolver::new(&mut annotated, ResolveMode::WithLocals)
                .resolve(&tree)
                .unwrap();
        }

        assert!(annotated.diagnostics().is_empty());
        let class_scope = annotated.scope_of(class).unwrap();
        assert_eq!(annotated.symbol_table().symbols_in(class_scope).count(), 1);
        // one class type plus one function type
        assert_eq!(annotated.types().len(), 2);
    }

    #[test]
    fn test_rewalk_reports_duplicates_once() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(PrimitiveKeyword::Int);
        let fields = b.variables(int, &["x", "x"]);
        let missing = b.class_type("Nope");
        let broken = b.variables(missing, &["y"]);
        let class = b.class("A", Some("A"), vec![fields, broken]);
        let tree = b.finish(vec![class]);

        let mut annotated = ScopeBuilder::build(&tree, "unit");
        TypeResolver::new(&mut annotated, ResolveMode::MembersOnly)
            .resolve(&tree)
            .unwrap();
        TypeResolver::new(&mut annotated, ResolveMode::WithLocals)
            .resolve(&tree)
            .unwrap();

        let codes: Vec<_> = annotated.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            [
                DiagnosticCode::DuplicateDeclaration,
                DiagnosticCode::UnknownType,
                DiagnosticCode::InvalidSuperclass,
            ]
        );
    }
}
