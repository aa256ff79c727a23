use std::fmt;

use serde::{Deserialize, Serialize};
use toy_core::Location;

use crate::error::{Error, Result};

/// Index of a node inside a [`SyntaxTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKeyword {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Byte,
    Short,
    Char,
    String,
}

impl PrimitiveKeyword {
    pub const ALL: [PrimitiveKeyword; 9] = [
        PrimitiveKeyword::Boolean,
        PrimitiveKeyword::Int,
        PrimitiveKeyword::Long,
        PrimitiveKeyword::Float,
        PrimitiveKeyword::Double,
        PrimitiveKeyword::Byte,
        PrimitiveKeyword::Short,
        PrimitiveKeyword::Char,
        PrimitiveKeyword::String,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKeyword::Boolean => "boolean",
            PrimitiveKeyword::Int => "int",
            PrimitiveKeyword::Long => "long",
            PrimitiveKeyword::Float => "float",
            PrimitiveKeyword::Double => "double",
            PrimitiveKeyword::Byte => "byte",
            PrimitiveKeyword::Short => "short",
            PrimitiveKeyword::Char => "char",
            PrimitiveKeyword::String => "string",
        }
    }
}

/// One variant per grammar production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    CompilationUnit {
        items: Vec<NodeId>,
    },
    ClassDeclaration {
        name: String,
        superclass: Option<NodeId>,
        body: Vec<NodeId>,
    },
    FunctionDeclaration {
        name: String,
        return_type: Option<NodeId>,
        parameters: Vec<NodeId>,
        body: NodeId,
    },
    FormalParameter {
        type_type: NodeId,
        declarator_id: NodeId,
    },
    VariableDeclarators {
        type_type: NodeId,
        declarators: Vec<NodeId>,
    },
    VariableDeclarator {
        id: NodeId,
        initializer: Option<NodeId>,
    },
    VariableDeclaratorId {
        name: String,
    },
    /// Wrapper around exactly one of primitive, class reference or function type.
    TypeType {
        alternative: NodeId,
    },
    /// `None` is the `void` keyword.
    TypeTypeOrVoid {
        type_type: Option<NodeId>,
    },
    PrimitiveType {
        keyword: PrimitiveKeyword,
    },
    FunctionType {
        parameter_types: Vec<NodeId>,
        return_type: NodeId,
    },
    ClassOrInterfaceType {
        name: String,
    },
    Block {
        statements: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    Literal {
        text: String,
    },
    Identifier {
        name: String,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit { .. } => "compilation unit",
            NodeKind::ClassDeclaration { .. } => "class declaration",
            NodeKind::FunctionDeclaration { .. } => "function declaration",
            NodeKind::FormalParameter { .. } => "formal parameter",
            NodeKind::VariableDeclarators { .. } => "variable declarators",
            NodeKind::VariableDeclarator { .. } => "variable declarator",
            NodeKind::VariableDeclaratorId { .. } => "variable declarator id",
            NodeKind::TypeType { .. } => "type",
            NodeKind::TypeTypeOrVoid { .. } => "type or void",
            NodeKind::PrimitiveType { .. } => "primitive type",
            NodeKind::FunctionType { .. } => "function type",
            NodeKind::ClassOrInterfaceType { .. } => "class type",
            NodeKind::Block { .. } => "block",
            NodeKind::ExpressionStatement { .. } => "expression statement",
            NodeKind::Literal { .. } => "literal",
            NodeKind::Identifier { .. } => "identifier",
        }
    }

    /// Children in source order, which is also the walk order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::CompilationUnit { items } => items.clone(),
            NodeKind::ClassDeclaration {
                superclass, body, ..
            } => superclass.iter().chain(body.iter()).copied().collect(),
            NodeKind::FunctionDeclaration {
                return_type,
                parameters,
                body,
                ..
            } => return_type
                .iter()
                .chain(parameters.iter())
                .chain(std::iter::once(body))
                .copied()
                .collect(),
            NodeKind::FormalParameter {
                type_type,
                declarator_id,
            } => vec![*type_type, *declarator_id],
            NodeKind::VariableDeclarators {
                type_type,
                declarators,
            } => std::iter::once(type_type)
                .chain(declarators.iter())
                .copied()
                .collect(),
            NodeKind::VariableDeclarator { id, initializer } => {
                std::iter::once(id).chain(initializer.iter()).copied().collect()
            }
            NodeKind::TypeType { alternative } => vec![*alternative],
            NodeKind::TypeTypeOrVoid { type_type } => type_type.iter().copied().collect(),
            NodeKind::FunctionType {
                parameter_types,
                return_type,
            } => parameter_types
                .iter()
                .chain(std::iter::once(return_type))
                .copied()
                .collect(),
            NodeKind::Block { statements } => statements.clone(),
            NodeKind::ExpressionStatement { expression } => vec![*expression],
            NodeKind::VariableDeclaratorId { .. }
            | NodeKind::PrimitiveType { .. }
            | NodeKind::ClassOrInterfaceType { .. }
            | NodeKind::Literal { .. }
            | NodeKind::Identifier { .. } => Vec::new(),
        }
    }

    pub fn is_type_alternative(&self) -> bool {
        matches!(
            self,
            NodeKind::PrimitiveType { .. }
                | NodeKind::ClassOrInterfaceType { .. }
                | NodeKind::FunctionType { .. }
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, NodeKind::Literal { .. } | NodeKind::Identifier { .. })
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::VariableDeclarators { .. }
                | NodeKind::Block { .. }
                | NodeKind::ExpressionStatement { .. }
        )
    }

    pub fn is_member(&self) -> bool {
        matches!(
            self,
            NodeKind::VariableDeclarators { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::ClassDeclaration { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub location: Location,
}

/// Arena of syntax nodes produced by a parser. Nodes are addressed by
/// [`NodeId`] and never move once allocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Panics when `id` does not belong to this tree. Use [`SyntaxTree::validate`]
    /// on trees from untrusted sources first.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn location(&self, id: NodeId) -> Location {
        self.node(id).location
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|index| NodeId::from_raw(index as u32))
    }

    /// Checks that the arena forms a tree whose children have the kinds their
    /// productions allow.
    pub fn validate(&self) -> Result<()> {
        if self.get(self.root).is_none() {
            return Err(Error::InvalidRoot { root: self.root });
        }

        let mut has_parent = vec![false; self.nodes.len()];

        for parent in self.ids() {
            for child in self.kind(parent).children() {
                let Some(node) = self.get(child) else {
                    return Err(Error::DanglingChild { parent, child });
                };

                if child == self.root || std::mem::replace(&mut has_parent[child.index()], true) {
                    return Err(Error::SharedChild { child });
                }

                if let Some(expected) = self.expected_child(parent, child) {
                    return Err(Error::UnexpectedChild {
                        parent,
                        child,
                        found: node.kind.name(),
                        expected,
                    });
                }
            }
        }

        Ok(())
    }

    fn expected_child(&self, parent: NodeId, child: NodeId) -> Option<&'static str> {
        let found = self.kind(child);
        let is = |expected: fn(&NodeKind) -> bool, name: &'static str| {
            (!expected(found)).then_some(name)
        };

        match self.kind(parent) {
            NodeKind::CompilationUnit { .. } => is(
                |k| k.is_member() || k.is_statement(),
                "declaration or statement",
            ),
            NodeKind::ClassDeclaration { superclass, .. } if *superclass == Some(child) => is(
                |k| matches!(k, NodeKind::ClassOrInterfaceType { .. }),
                "class type",
            ),
            NodeKind::ClassDeclaration { .. } => is(NodeKind::is_member, "member declaration"),
            NodeKind::FunctionDeclaration { return_type, body, .. } => {
                if *return_type == Some(child) {
                    is(|k| matches!(k, NodeKind::TypeTypeOrVoid { .. }), "type or void")
                } else if *body == child {
                    is(|k| matches!(k, NodeKind::Block { .. }), "block")
                } else {
                    is(
                        |k| matches!(k, NodeKind::FormalParameter { .. }),
                        "formal parameter",
                    )
                }
            }
            NodeKind::FormalParameter { type_type, .. }
            | NodeKind::VariableDeclarators { type_type, .. }
                if *type_type == child =>
            {
                is(|k| matches!(k, NodeKind::TypeType { .. }), "type")
            }
            NodeKind::FormalParameter { .. } => is(
                |k| matches!(k, NodeKind::VariableDeclaratorId { .. }),
                "variable declarator id",
            ),
            NodeKind::VariableDeclarators { .. } => is(
                |k| matches!(k, NodeKind::VariableDeclarator { .. }),
                "variable declarator",
            ),
            NodeKind::VariableDeclarator { id, .. } if *id == child => is(
                |k| matches!(k, NodeKind::VariableDeclaratorId { .. }),
                "variable declarator id",
            ),
            NodeKind::VariableDeclarator { .. } | NodeKind::ExpressionStatement { .. } => {
                is(NodeKind::is_expression, "expression")
            }
            NodeKind::TypeType { .. } => is(
                NodeKind::is_type_alternative,
                "primitive, class or function type",
            ),
            NodeKind::TypeTypeOrVoid { .. } => {
                is(|k| matches!(k, NodeKind::TypeType { .. }), "type")
            }
            NodeKind::FunctionType { return_type, .. } if *return_type == child => {
                is(|k| matches!(k, NodeKind::TypeTypeOrVoid { .. }), "type or void")
            }
            NodeKind::FunctionType { .. } => {
                is(|k| matches!(k, NodeKind::TypeType { .. }), "type")
            }
            NodeKind::Block { .. } => is(
                |k| k.is_statement() || matches!(k, NodeKind::ClassDeclaration { .. }),
                "statement",
            ),
            NodeKind::VariableDeclaratorId { .. }
            | NodeKind::PrimitiveType { .. }
            | NodeKind::ClassOrInterfaceType { .. }
            | NodeKind::Literal { .. }
            | NodeKind::Identifier { .. } => None,
        }
    }
}
