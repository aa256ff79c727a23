pub mod analyzer;
pub mod annotated_tree;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod scope_builder;
pub mod symbol_table;
pub mod type_resolver;
pub mod types;


pub use analyzer::analyze;
pub use annotated_tree::AnnotatedTree;
pub use diagnostics::{DiagnosticCode, SemanticDiagnostic};
pub use error::{Result, SemanticError};
pub use ids::{FunctionTypeId, ScopeId, SymbolId};
pub use scope_builder::ScopeBuilder;
pub use symbol_table::{Scope, ScopeKind, Symbol, SymbolKind, SymbolTable};
pub use type_resolver::{ResolveMode, TypeResolver};
pub use types::{FunctionType, PrimitiveType, Type, TypeTable};
