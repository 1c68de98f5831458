//! Attributed multigraph shared by platform, application and solution models.
//!
//! A [`SystemGraph`] is a petgraph [`StableGraph`] of [`Vertex`] nodes and [`Connection`]
//! edges together with a name → index table. Vertices are identified by a unique name and
//! carry named ports, group tags and a table of typed [`views`]. Edges are directed, may be
//! bound to a port on each end and are tagged with one or more [`EdgeTrait`]s. Parallel edges
//! are allowed; a bidirectional link is two opposite edges.
//!
//! # Example
//!
//! ```
//! use dse_models::model::{EdgeTrait, SystemGraph, views::MemoryModule};
//!
//! let mut g = SystemGraph::new();
//! let sw = g.new_vertex("SW").unwrap();
//! let mem = g.new_vertex("MEM").unwrap();
//! g.attach(mem, MemoryModule { operating_frequency_in_hertz: 600_000_000, space_in_bits: 8 });
//!
//! g.connect(sw, mem, None, None, &[EdgeTrait::PhysicalConnection]).unwrap();
//! assert!(g.has_connection(sw, mem));
//! assert!(!g.has_connection(mem, sw));
//! assert!(g.try_view::<MemoryModule>(mem).is_some());
//! ```

mod error;
pub mod summary;
pub mod views;

pub use error::ModelError;
pub use views::{View, ViewKind, Views};

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use itertools::Itertools;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use string_cache::DefaultAtom;

pub type Symbol = DefaultAtom;

/// Relationship carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeTrait {
    StructuralContainment,
    PhysicalConnection,
    SdfNetworkEdge,
    VisualConnection,
}

/// Edge payload: optional ports on both ends and the relationship kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<Symbol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<Symbol>,
    pub traits: BTreeSet<EdgeTrait>,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ports = match (&self.src_port, &self.dst_port) {
            (None, None) => String::new(),
            (src, dst) => format!(
                "{} -> {}\n",
                src.as_deref().unwrap_or("*"),
                dst.as_deref().unwrap_or("*")
            ),
        };
        write!(f, "{}{}", ports, self.traits.iter().map(|t| format!("{:?}", t)).join(", "))
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub name: Symbol,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Symbol>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<Symbol>,
    #[serde(default)]
    pub views: Views,
}

impl Vertex {
    fn new(name: Symbol) -> Self {
        Self {
            name,
            ports: Vec::new(),
            tags: BTreeSet::new(),
            views: Views::default(),
        }
    }

    pub fn has_port(&self, port: &str) -> bool {
        self.ports.iter().any(|p| &**p == port)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds = self.views.kinds();
        if kinds.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}\n[{}]", self.name, kinds.iter().join(", "))
        }
    }
}

/// The attributed multigraph.
#[derive(Debug, Clone, Default)]
pub struct SystemGraph {
    graph: StableGraph<Vertex, Connection>,
    lut: HashMap<Symbol, NodeIndex>,
}

impl SystemGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vertex with no views, ports or tags.
    pub fn new_vertex(&mut self, name: &str) -> Result<NodeIndex, ModelError> {
        let name = Symbol::from(name);
        if self.lut.contains_key(&name) {
            return Err(ModelError::DuplicateName(name));
        }
        let ix = self.graph.add_node(Vertex::new(name.clone()));
        self.lut.insert(name, ix);
        Ok(ix)
    }

    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.lut.get(&Symbol::from(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<&Vertex> {
        self.index_of(name).map(|ix| &self.graph[ix])
    }

    pub fn vertex(&self, ix: NodeIndex) -> &Vertex {
        &self.graph[ix]
    }

    pub fn name(&self, ix: NodeIndex) -> &Symbol {
        &self.graph[ix].name
    }

    /// All vertices in creation order.
    pub fn vertices(&self) -> impl Iterator<Item = (NodeIndex, &Vertex)> + '_ {
        self.graph.node_indices().map(move |ix| (ix, &self.graph[ix]))
    }

    /// All edges in creation order.
    pub fn connections(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &Connection)> + '_ {
        self.graph.edge_indices().filter_map(move |ie| {
            let (src, dst) = self.graph.edge_endpoints(ie)?;
            Some((src, dst, &self.graph[ie]))
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Underlying petgraph graph, for visit-based algorithms and DOT output.
    pub fn as_petgraph(&self) -> &StableGraph<Vertex, Connection> {
        &self.graph
    }

    /// The whole view table of a vertex.
    pub fn views_mut(&mut self, ix: NodeIndex) -> &mut Views {
        &mut self.graph[ix].views
    }

    /// Attach `view` unless one of the same kind is present; either way return the attached one.
    pub fn attach<V: View>(&mut self, ix: NodeIndex, view: V) -> &mut V {
        V::slot_mut(&mut self.graph[ix].views).get_or_insert(view)
    }

    /// Attach a default `V` if absent and return it.
    pub fn enforce<V: View + Default>(&mut self, ix: NodeIndex) -> &mut V {
        V::slot_mut(&mut self.graph[ix].views).get_or_insert_with(V::default)
    }

    /// Overwrite the `V` slot, returning the previous record.
    pub fn replace_view<V: View>(&mut self, ix: NodeIndex, view: V) -> Option<V> {
        V::slot_mut(&mut self.graph[ix].views).replace(view)
    }

    pub fn try_view<V: View>(&self, ix: NodeIndex) -> Option<&V> {
        V::slot(&self.graph[ix].views).as_ref()
    }

    pub fn try_view_mut<V: View>(&mut self, ix: NodeIndex) -> Option<&mut V> {
        V::slot_mut(&mut self.graph[ix].views).as_mut()
    }

    pub fn has_view<V: View>(&self, ix: NodeIndex) -> bool {
        self.try_view::<V>(ix).is_some()
    }

    /// Vertices exposing a `V` view, in creation order.
    pub fn viewers<'a, V: View + 'a>(
        &'a self,
    ) -> impl Iterator<Item = (NodeIndex, &'a V)> + 'a {
        self.graph
            .node_indices()
            .filter_map(move |ix| V::slot(&self.graph[ix].views).as_ref().map(|v| (ix, v)))
    }

    pub fn add_port(&mut self, ix: NodeIndex, port: &str) -> Result<(), ModelError> {
        let vertex = &mut self.graph[ix];
        if vertex.has_port(port) {
            return Err(ModelError::DuplicatePort {
                vertex: vertex.name.clone(),
                port: port.into(),
            });
        }
        vertex.ports.push(port.into());
        Ok(())
    }

    pub fn tag(&mut self, ix: NodeIndex, tag: &str) {
        self.graph[ix].tags.insert(tag.into());
    }

    /// Vertices carrying `tag`, in creation order.
    pub fn tagged(&self, tag: &str) -> Vec<NodeIndex> {
        let tag = Symbol::from(tag);
        self.graph
            .node_indices()
            .filter(|&ix| self.graph[ix].tags.contains(&tag))
            .collect()
    }

    /// Add a directed edge. Ports, when given, must already exist on their vertex.
    pub fn connect(
        &mut self,
        src: NodeIndex,
        dst: NodeIndex,
        src_port: Option<&str>,
        dst_port: Option<&str>,
        traits: &[EdgeTrait],
    ) -> Result<EdgeIndex, ModelError> {
        if traits.is_empty() {
            return Err(ModelError::Validation(format!(
                "edge {} -> {} needs at least one trait",
                self.name(src),
                self.name(dst)
            )));
        }
        for (ix, port) in [(src, src_port), (dst, dst_port)] {
            if let Some(port) = port {
                if !self.graph[ix].has_port(port) {
                    return Err(ModelError::PortNotFound {
                        vertex: self.name(ix).clone(),
                        port: port.into(),
                    });
                }
            }
        }

        Ok(self.graph.add_edge(
            src,
            dst,
            Connection {
                src_port: src_port.map(Symbol::from),
                dst_port: dst_port.map(Symbol::from),
                traits: traits.iter().copied().collect(),
            },
        ))
    }

    /// Whether there is at least one edge `a -> b`.
    pub fn has_connection(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    /// Outgoing edges of `ix`, in creation order.
    pub fn outgoing(&self, ix: NodeIndex) -> Vec<(NodeIndex, &Connection)> {
        self.graph
            .edges(ix)
            .sorted_by_key(|e| e.id())
            .map(|e| (e.target(), e.weight()))
            .collect()
    }

    /// Incoming edges of `ix`, in creation order.
    pub fn incoming(&self, ix: NodeIndex) -> Vec<(NodeIndex, &Connection)> {
        self.connections()
            .filter(|(_, dst, _)| *dst == ix)
            .map(|(src, _, c)| (src, c))
            .collect()
    }

    /// Distinct vertices linked to `ix` in either direction, in creation order.
    pub fn adjacent(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        self.outgoing(ix)
            .into_iter()
            .map(|(n, _)| n)
            .chain(self.incoming(ix).into_iter().map(|(n, _)| n))
            .sorted()
            .dedup()
            .collect()
    }
}

impl std::ops::Index<NodeIndex> for SystemGraph {
    type Output = Vertex;

    fn index(&self, ix: NodeIndex) -> &Vertex {
        &self.graph[ix]
    }
}
