use toy_core::Location;

use crate::{Node, NodeId, NodeKind, PrimitiveKeyword, SyntaxTree};

/// Incremental constructor for [`SyntaxTree`]s, for parsers and tests.
///
/// Children are allocated before their parents. Leaves get consecutive
/// synthetic locations and composite nodes cover the span of their
/// children, unless overridden with [`TreeBuilder::at`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    cursor: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: NodeKind, width: usize) -> NodeId {
        let children = kind.children();
        let location = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                let start = self.nodes[first.index()].location;
                start.merge(self.nodes[last.index()].location)
            }
            _ => {
                let location = Location::new(self.cursor, self.cursor + width);
                self.cursor += width + 1;
                location
            }
        };

        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node { kind, location });
        id
    }

    pub fn at(&mut self, id: NodeId, location: Location) -> NodeId {
        self.nodes[id.index()].location = location;
        id
    }

    pub fn primitive_type(&mut self, keyword: PrimitiveKeyword) -> NodeId {
        self.alloc(NodeKind::PrimitiveType { keyword }, keyword.as_str().len())
    }

    /// `TypeType` wrapping a primitive keyword.
    pub fn primitive(&mut self, keyword: PrimitiveKeyword) -> NodeId {
        let alternative = self.primitive_type(keyword);
        self.type_type(alternative)
    }

    pub fn class_reference(&mut self, name: &str) -> NodeId {
        let kind = NodeKind::ClassOrInterfaceType { name: name.into() };
        self.alloc(kind, name.len())
    }

    /// `TypeType` wrapping a class reference.
    pub fn class_type(&mut self, name: &str) -> NodeId {
        let alternative = self.class_reference(name);
        self.type_type(alternative)
    }

    /// `TypeType` wrapping `function(parameter_types): return_type`.
    pub fn function_type(&mut self, parameter_types: Vec<NodeId>, return_type: NodeId) -> NodeId {
        let kind = NodeKind::FunctionType {
            parameter_types,
            return_type,
        };
        let alternative = self.alloc(kind, "function".len());
        self.type_type(alternative)
    }

    pub fn type_type(&mut self, alternative: NodeId) -> NodeId {
        self.alloc(NodeKind::TypeType { alternative }, 0)
    }

    pub fn void(&mut self) -> NodeId {
        self.alloc(NodeKind::TypeTypeOrVoid { type_type: None }, "void".len())
    }

    pub fn returns(&mut self, type_type: NodeId) -> NodeId {
        let kind = NodeKind::TypeTypeOrVoid {
            type_type: Some(type_type),
        };
        self.alloc(kind, 0)
    }

    pub fn declarator_id(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::VariableDeclaratorId { name: name.into() }, name.len())
    }

    pub fn declarator(&mut self, name: &str, initializer: Option<NodeId>) -> NodeId {
        let id = self.declarator_id(name);
        self.alloc(NodeKind::VariableDeclarator { id, initializer }, 0)
    }

    pub fn declarators(&mut self, type_type: NodeId, declarators: Vec<NodeId>) -> NodeId {
        let kind = NodeKind::VariableDeclarators {
            type_type,
            declarators,
        };
        self.alloc(kind, 0)
    }

    /// `type a, b, c;` without initializers.
    pub fn variables(&mut self, type_type: NodeId, names: &[&str]) -> NodeId {
        let declarators = names
            .iter()
            .map(|name| self.declarator(name, None))
            .collect();
        self.declarators(type_type, declarators)
    }

    pub fn parameter(&mut self, type_type: NodeId, name: &str) -> NodeId {
        let declarator_id = self.declarator_id(name);
        let kind = NodeKind::FormalParameter {
            type_type,
            declarator_id,
        };
        self.alloc(kind, 0)
    }

    pub fn function(
        &mut self,
        name: &str,
        return_type: Option<NodeId>,
        parameters: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let kind = NodeKind::FunctionDeclaration {
            name: name.into(),
            return_type,
            parameters,
            body,
        };
        self.alloc(kind, name.len())
    }

    pub fn class(&mut self, name: &str, superclass: Option<&str>, body: Vec<NodeId>) -> NodeId {
        let superclass = superclass.map(|name| self.class_reference(name));
        let kind = NodeKind::ClassDeclaration {
            name: name.into(),
            superclass,
            body,
        };
        self.alloc(kind, name.len())
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Block { statements }, 2)
    }

    pub fn expression(&mut self, expression: NodeId) -> NodeId {
        self.alloc(NodeKind::ExpressionStatement { expression }, 0)
    }

    pub fn literal(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Literal { text: text.into() }, text.len())
    }

    pub fn identifier(&mut self, name: &str) -> NodeId {
        self.alloc(NodeKind::Identifier { name: name.into() }, name.len())
    }

    pub fn finish(mut self, items: Vec<NodeId>) -> SyntaxTree {
        let root = self.alloc(NodeKind::CompilationUnit { items }, 0);
        SyntaxTree::from_parts(self.nodes, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_covers_children() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(PrimitiveKeyword::Int);
        let decl = b.variables(int, &["a", "b"]);
        let tree = b.finish(vec![decl]);

        // int(0..3) a(4..5) b(6..7)
        assert_eq!(tree.location(decl), Location::new(0, 7));
        assert_eq!(tree.location(tree.root()), Location::new(0, 7));
    }

    #[test]
    fn test_location_override() {
        let mut b = TreeBuilder::new();
        let id = b.declarator_id("x");
        b.at(id, Location::new(40, 41));
        let decl = b.literal("1");
        let tree = b.finish(vec![decl]);

        assert_eq!(tree.location(id), Location::new(40, 41));
    }
}
