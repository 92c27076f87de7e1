use super::BinaryTree;

impl BinaryTree {
    /// Formats the tree for debugging, one node per line:
    ///
    /// ```text
    /// root: Start (1)
    ///     left: tag|contains|"vip" (2)
    ///         left: warehouse-a|standard| (3)
    ///         right: warehouse-b|standard| (4)
    /// ```
    pub fn render(&self) -> String {
        let mut output = String::new();
        // (node, depth, side)
        let mut stack = vec![(self.root, 0usize, "root")];
        while let Some((idx, depth, side)) = stack.pop() {
            let node = &self.nodes[idx];
            output.push_str(&" ".repeat(4 * depth));
            output.push_str(&format!("{}: {} ({})\n", side, node.label, node.id));

            // Right first so the left subtree is printed first.
            if let Some(right) = node.right {
                stack.push((right, depth + 1, "right"));
            }
            if let Some(left) = node.left {
                stack.push((left, depth + 1, "left"));
            }
        }
        output
    }
}
