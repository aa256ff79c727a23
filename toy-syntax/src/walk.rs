use crate::{NodeId, SyntaxTree};

/// Enter/exit hooks driven by [`SyntaxTree::walk`].
///
/// Every child of a node is entered and exited before the node's own
/// `exit_node` runs, so exit handlers may read whatever their children
/// produced. Returning an error stops the walk immediately.
pub trait SyntaxListener {
    type Error;

    fn enter_node(&mut self, _tree: &SyntaxTree, _id: NodeId) -> Result<(), Self::Error> {
        Ok(())
    }

    fn exit_node(&mut self, _tree: &SyntaxTree, _id: NodeId) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl SyntaxTree {
    pub fn walk<L>(&self, listener: &mut L) -> Result<(), L::Error>
    where
        L: SyntaxListener,
    {
        self.walk_from(self.root(), listener)
    }

    /// Walk the subtree rooted at `id` only.
    pub fn walk_from<L>(&self, id: NodeId, listener: &mut L) -> Result<(), L::Error>
    where
        L: SyntaxListener,
    {
        listener.enter_node(self, id)?;

        for child in self.kind(id).children() {
            self.walk_from(child, listener)?;
        }

        listener.exit_node(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimitiveKeyword, TreeBuilder};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl SyntaxListener for Recorder {
        type Error = ();

        fn enter_node(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<(), ()> {
            self.events.push(format!("enter {}", tree.kind(id).name()));
            Ok(())
        }

        fn exit_node(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<(), ()> {
            self.events.push(format!("exit {}", tree.kind(id).name()));
            Ok(())
        }
    }

    #[test]
    fn test_children_exit_before_parent() {
        let mut b = TreeBuilder::new();
        let int = b.primitive(PrimitiveKeyword::Int);
        let param = b.parameter(int, "p");
        let void = b.void();
        let body = b.block(Vec::new());
        let function = b.function("f", Some(void), vec![param], body);
        let tree = b.finish(vec![function]);

        let mut recorder = Recorder::default();
        tree.walk_from(function, &mut recorder).unwrap();

        insta::assert_snapshot!(recorder.events.join("\n"), @r"
        enter function declaration
        enter type or void
        exit type or void
        enter formal parameter
        enter type
        enter primitive type
        exit primitive type
        exit type
        enter variable declarator id
        exit variable declarator id
        exit formal parameter
        enter block
        exit block
        exit function declaration
        ");
    }

    struct StopAtBlock;

    impl SyntaxListener for StopAtBlock {
        type Error = NodeId;

        fn enter_node(&mut self, tree: &SyntaxTree, id: NodeId) -> Result<(), NodeId> {
            match tree.kind(id) {
                crate::NodeKind::Block { .. } => Err(id),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_error_stops_walk() {
        let mut b = TreeBuilder::new();
        let body = b.block(Vec::new());
        let void = b.void();
        let function = b.function("f", Some(void), Vec::new(), body);
        let tree = b.finish(vec![function]);

        assert_eq!(tree.walk(&mut StopAtBlock), Err(body));
    }
}
