//! Tabular overview of the components of a [`SystemGraph`].

use std::io::Write;

use itertools::Itertools;
use prettytable::*;

use super::SystemGraph;

/// One row per vertex: name, attached views, ports and outgoing links.
pub fn component_table(graph: &SystemGraph) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Vertex", "Views", "Ports", "Links"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    for (ix, vertex) in graph.vertices() {
        let links = graph
            .outgoing(ix)
            .into_iter()
            .map(|(dst, _)| graph.name(dst).to_string())
            .dedup()
            .join(", ");
        table.add_row(row![
            vertex.name,
            vertex.views.kinds().iter().join(", "),
            vertex.ports.iter().join(", "),
            links,
        ]);
    }

    table
}

/// Print the component table followed by a vertex/edge count line.
pub fn write_summary<W: Write + ?Sized>(
    graph: &SystemGraph,
    writer: &mut W,
) -> std::io::Result<()> {
    component_table(graph).print(writer)?;
    writeln!(
        writer,
        "{} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeTrait, views::MemoryModule};

    #[test]
    fn summary_lists_every_vertex() {
        let mut g = SystemGraph::new();
        let sw = g.new_vertex("SW").unwrap();
        let mem = g.new_vertex("MEM").unwrap();
        g.attach(mem, MemoryModule::default());
        g.connect(sw, mem, None, None, &[EdgeTrait::PhysicalConnection])
            .unwrap();

        let table = component_table(&g);
        assert_eq!(table.len(), 2);

        let mut out = Vec::new();
        write_summary(&g, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("MemoryModule"));
        assert!(text.contains("2 vertices, 1 edges"));
    }
}
