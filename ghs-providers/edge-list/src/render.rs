//! Result rendering.

use std::io::{self, Write};

use ghs_core::SpanningTree;

/// Writes `tree` as one `Edge (a, b) with weight w` line per edge in
/// ascending endpoint order, followed by the total weight.
///
/// # Errors
/// Propagates failures from `writer`.
///
/// # Examples
/// ```
/// use ghs_core::{NodeId, SpanningTree, TreeEdge};
/// use ghs_providers_edge_list::render_tree;
///
/// let tree = SpanningTree::from_edges(
///     vec![TreeEdge::new(NodeId::new(2), NodeId::new(1), 4)],
///     2,
/// );
/// let mut out = Vec::new();
/// render_tree(&tree, &mut out)?;
/// assert_eq!(
///     String::from_utf8_lossy(&out),
///     "Edge (1, 2) with weight 4\nTotal weight of the MST: 4\n",
/// );
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_tree<W: Write>(tree: &SpanningTree, writer: &mut W) -> io::Result<()> {
    for edge in tree.edges() {
        writeln!(
            writer,
            "Edge ({}, {}) with weight {}",
            edge.a(),
            edge.b(),
            edge.weight()
        )?;
    }
    writeln!(writer, "Total weight of the MST: {}", tree.total_weight())
}
