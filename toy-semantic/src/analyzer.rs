use toy_config::Config;
use toy_syntax::{NodeId, NodeKind, SyntaxTree};

use crate::annotated_tree::AnnotatedTree;
use crate::error::Result;
use crate::scope_builder::ScopeBuilder;
use crate::type_resolver::{ResolveMode, TypeResolver};

/// Run the full semantic pipeline over one compilation unit.
///
/// Scope pre-registration, then the members-only type pass over the whole
/// unit, then (if configured) the local-variable pass over every function
/// body and top-level statement in source order.
pub fn analyze(tree: &SyntaxTree, config: &Config) -> Result<AnnotatedTree> {
    tree.validate()?;

    let mut annotated = ScopeBuilder::build(tree, &config.namespace);
    tracing::debug!(
        nodes = tree.len(),
        scopes = annotated.symbol_table().scopes().count(),
        "pre-registration done"
    );

    TypeResolver::new(&mut annotated, ResolveMode::MembersOnly).resolve(tree)?;
    tracing::debug!(types = annotated.types().len(), "members resolved");

    if config.enter_local_variables {
        let mut resolver = TypeResolver::new(&mut annotated, ResolveMode::WithLocals);
        for body in local_regions(tree) {
            resolver.resolve_node(tree, body)?;
        }
        tracing::debug!("locals resolved");
    }

    Ok(annotated)
}

/// Subtrees that may declare locals: function bodies and statements placed
/// directly in the compilation unit, outermost only and in source order. A
/// body nested in another region is resolved by the walk over that region.
fn local_regions(tree: &SyntaxTree) -> Vec<NodeId> {
    let mut regions = Vec::new();
    collect_regions(tree, tree.root(), &mut regions);
    regions
}

fn collect_regions(tree: &SyntaxTree, parent: NodeId, regions: &mut Vec<NodeId>) {
    let parent_kind = tree.kind(parent);
    for child in parent_kind.children() {
        let is_region = match parent_kind {
            NodeKind::CompilationUnit { .. } => tree.kind(child).is_statement(),
            NodeKind::FunctionDeclaration { body, .. } => *body == child,
            _ => false,
        };

        if is_region {
            regions.push(child);
        } else {
            collect_regions(tree, child, regions);
        }
    }
}
