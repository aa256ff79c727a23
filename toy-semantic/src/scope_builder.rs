use std::convert::Infallible;

use toy_syntax::{NodeId, NodeKind, SyntaxListener, SyntaxTree};

use crate::annotated_tree::AnnotatedTree;
use crate::ids::ScopeId;
use crate::types::Type;

/// Pre-registration pass.
///
/// Creates the class, function and block scopes, declares class and function
/// symbols so later siblings can refer to them, and binds every node to a
/// scope. Variables are left to [`crate::TypeResolver`].
#[derive(Debug)]
pub struct ScopeBuilder<'a> {
    annotated: &'a mut AnnotatedTree,
    scope_stack: Vec<ScopeId>,
}

impl<'a> ScopeBuilder<'a> {
    pub fn new(annotated: &'a mut AnnotatedTree) -> Self {
        let root = annotated.symbol_table().root();
        Self {
            annotated,
            scope_stack: vec![root],
        }
    }

    /// Fresh annotated tree for `tree` with every scope and binding in place.
    pub fn build(tree: &SyntaxTree, namespace: &str) -> AnnotatedTree {
        let mut annotated = AnnotatedTree::new(tree, namespace);
        let Ok(()) = tree.walk(&mut ScopeBuilder::new(&mut annotated));
        annotated
    }

    fn current_scope(&self) -> ScopeId {
        match self.scope_stack.last() {
            Some(scope) => *scope,
            None => self.annotated.symbol_table().root(),
        }
    }
}

impl SyntaxListener for ScopeBuilder<'_> {
    type Error = Infallible;

    fn enter_node(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<(), Infallible> {
        let current = self.current_scope();

        let introduced = match tree.kind(id) {
            NodeKind::ClassDeclaration { name, .. } => {
                let (symbol, scope) = self
                    .annotated
                    .symbol_table_mut()
                    .declare_class(current, name, id, tree.location(id));
                self.annotated.types_mut().register(Type::Class(scope));
                self.annotated.set_symbol(id, symbol);
                tracing::trace!(class = %name, "declared class");
                Some(scope)
            }
            NodeKind::FunctionDeclaration { name, .. } => {
                let (symbol, scope) = self
                    .annotated
                    .symbol_table_mut()
                    .declare_function(current, name, id, tree.location(id));
                self.annotated.set_symbol(id, symbol);
                tracing::trace!(function = %name, "declared function");
                Some(scope)
            }
            NodeKind::Block { .. } => Some(self.annotated.symbol_table_mut().push_block(current)),
            _ => None,
        };

        match introduced {
            Some(scope) => {
                self.annotated.set_scope(id, scope);
                self.scope_stack.push(scope);
            }
            None => self.annotated.set_scope(id, current),
        }

        Ok(())
    }

    fn exit_node(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<(), Infallible> {
        if matches!(
            tree.kind(id),
            NodeKind::ClassDeclaration { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::Block { .. }
        ) {
            self.scope_stack.pop();
        }

        Ok(())
    }
}
