//! Reading and writing [`SystemGraph`]s.
//!
//! The file extension selects the flavour:
//!
//! - `.json`: the design model, a serde_json document with every vertex (name, ports, tags,
//!   views) and every edge (endpoint names, ports, traits). This is what the external solver
//!   reads and writes.
//! - `.dot`: a Graphviz rendering for inspection. It cannot be read back.
//!
//! Loading goes through the [`SystemGraph`] operations, so a document with duplicate names,
//! duplicate ports or edges bound to missing ports is rejected. Switch route tables must only
//! name ports of their switch. Other view contents are taken as written.

use std::{
    error::Error,
    fmt, fs,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use petgraph::dot::Dot;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Symbol,
    model::{Connection, EdgeTrait, ModelError, SystemGraph, Vertex},
};

pub const MODEL_EXT: &str = "json";
pub const VISUAL_EXT: &str = "dot";

#[derive(Debug)]
pub enum CodecError {
    Io(io::Error),
    Json(serde_json::Error),
    UnsupportedFormat(String),
    Model(ModelError),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Io(e) => write!(f, "I/O error: {}", e),
            CodecError::Json(e) => write!(f, "Malformed design model: {}", e),
            CodecError::UnsupportedFormat(path) => write!(
                f,
                "Unsupported file format: {} (expected .{} or .{})",
                path, MODEL_EXT, VISUAL_EXT
            ),
            CodecError::Model(e) => write!(f, "Inconsistent design model: {}", e),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            CodecError::Json(e) => Some(e),
            CodecError::Model(e) => Some(e),
            CodecError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        CodecError::Io(e)
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        CodecError::Json(e)
    }
}

impl From<ModelError> for CodecError {
    fn from(e: ModelError) -> Self {
        CodecError::Model(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// serde_json design model
    Model,
    /// Graphviz rendering
    Visual,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(MODEL_EXT) => Ok(ModelFormat::Model),
            Some(VISUAL_EXT) => Ok(ModelFormat::Visual),
            _ => Err(CodecError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct EdgeDocument {
    src: Symbol,
    dst: Symbol,
    #[serde(flatten)]
    connection: Connection,
}

#[derive(Serialize, Deserialize)]
struct GraphDocument {
    vertices: Vec<Vertex>,
    edges: Vec<EdgeDocument>,
}

impl From<&SystemGraph> for GraphDocument {
    fn from(graph: &SystemGraph) -> Self {
        GraphDocument {
            vertices: graph.vertices().map(|(_, v)| v.clone()).collect(),
            edges: graph
                .connections()
                .map(|(src, dst, connection)| EdgeDocument {
                    src: graph.name(src).clone(),
                    dst: graph.name(dst).clone(),
                    connection: connection.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<GraphDocument> for SystemGraph {
    type Error = ModelError;

    fn try_from(doc: GraphDocument) -> Result<Self, ModelError> {
        let mut graph = SystemGraph::new();

        for vertex in doc.vertices {
            let ix = graph.new_vertex(&vertex.name)?;
            for port in &vertex.ports {
                graph.add_port(ix, port)?;
            }
            for tag in &vertex.tags {
                graph.tag(ix, tag);
            }
            let routes = vertex
                .views
                .communication_module
                .as_ref()
                .and_then(|comm| comm.port_connections.as_ref());
            if let Some(routes) = routes {
                let ports = routes
                    .iter()
                    .flat_map(|(from, to)| std::iter::once(from).chain(to));
                for port in ports {
                    if !graph[ix].has_port(port) {
                        return Err(ModelError::PortNotFound {
                            vertex: vertex.name.clone(),
                            port: port.clone(),
                        });
                    }
                }
            }
            *graph.views_mut(ix) = vertex.views;
        }

        for edge in doc.edges {
            let lookup = |name: &Symbol| {
                graph
                    .index_of(name)
                    .ok_or_else(|| ModelError::ComponentNotFound(name.clone()))
            };
            let src = lookup(&edge.src)?;
            let dst = lookup(&edge.dst)?;
            let traits: Vec<EdgeTrait> = edge.connection.traits.iter().copied().collect();
            graph.connect(
                src,
                dst,
                edge.connection.src_port.as_deref(),
                edge.connection.dst_port.as_deref(),
                &traits,
            )?;
        }

        Ok(graph)
    }
}

/// Write `graph` in the flavour selected by the extension of `path`.
pub fn save(graph: &SystemGraph, path: &Path) -> Result<(), CodecError> {
    let format = ModelFormat::from_path(path)?;
    let mut out = BufWriter::new(fs::File::create(path)?);

    match format {
        ModelFormat::Model => {
            serde_json::to_writer_pretty(&mut out, &GraphDocument::from(graph))?;
            writeln!(out)?;
        }
        ModelFormat::Visual => {
            write!(out, "{}", Dot::new(graph.as_petgraph()))?;
        }
    }
    out.flush()?;

    debug!(
        "Saved {} vertices and {} edges to '{}'",
        graph.vertex_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}

/// Read a design model.
pub fn load(path: &Path) -> Result<SystemGraph, CodecError> {
    match ModelFormat::from_path(path)? {
        ModelFormat::Model => {
            let reader = BufReader::new(fs::File::open(path)?);
            let doc: GraphDocument = serde_json::from_reader(reader)?;
            let graph = SystemGraph::try_from(doc)?;
            debug!(
                "Loaded {} vertices and {} edges from '{}'",
                graph.vertex_count(),
                graph.edge_count(),
                path.display()
            );
            Ok(graph)
        }
        ModelFormat::Visual => Err(CodecError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Command-line arguments for the visualisation export.
#[derive(Parser, Debug)]
pub struct ToKgtArgs {
    /// Design model to render
    pub input: PathBuf,

    /// Output directory
    pub out_dir: PathBuf,
}

pub fn to_kgt_main(args: ToKgtArgs) -> anyhow::Result<()> {
    let ToKgtArgs { input, out_dir } = args;

    let graph = load(&input).with_context(|| format!("Failed to load '{}'", input.display()))?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let out = out_dir.join(format!("{}.{}", stem, VISUAL_EXT));
    save(&graph, &out)?;
    info!("Converted '{}' to '{}'", input.display(), out.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::views::{CommunicationModule, SdfActor, SdfChannel};
    use crate::platform::catalog::mpsoc;
    use crate::test_helpers::hardware_application;
    use itertools::Itertools;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ModelFormat::from_path(Path::new("a/b.json")).unwrap(),
            ModelFormat::Model
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("b.dot")).unwrap(),
            ModelFormat::Visual
        );
        assert!(matches!(
            ModelFormat::from_path(Path::new("b.fiodl")),
            Err(CodecError::UnsupportedFormat(_))
        ));
        assert!(ModelFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn design_model_survives_a_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        let graph = hardware_application();

        save(&graph, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(
            loaded.vertices().map(|(_, v)| v.clone()).collect_vec(),
            graph.vertices().map(|(_, v)| v.clone()).collect_vec()
        );
        assert_eq!(loaded.edge_count(), graph.edge_count());
        let a = loaded.index_of("A").unwrap();
        let ch = loaded.index_of("CH_A_B").unwrap();
        assert!(loaded.has_connection(a, ch));
        assert!(loaded.try_view::<SdfActor>(a).is_some());
        assert!(loaded.try_view::<SdfChannel>(ch).is_some());
    }

    #[test]
    fn switch_routes_survive_a_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mpsoc.json");
        save(&mpsoc().unwrap(), &path).unwrap();

        let loaded = load(&path).unwrap();
        let sw = loaded.index_of("OCM_SWITCH").unwrap();
        let comm = loaded.try_view::<CommunicationModule>(sw).unwrap();
        assert_eq!(comm.port_connections.as_ref().unwrap().len(), 9);
    }

    #[test]
    fn visualisation_is_write_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.dot");
        save(&hardware_application(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("digraph"));
        assert!(text.contains("CH_A_B"));
        assert!(matches!(load(&path), Err(CodecError::UnsupportedFormat(_))));
    }

    #[test]
    fn inconsistent_documents_are_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let dup = dir.path().join("dup.json");
        fs::write(
            &dup,
            r#"{"vertices": [{"name": "a"}, {"name": "a"}], "edges": []}"#,
        )
        .unwrap();
        assert!(matches!(
            load(&dup),
            Err(CodecError::Model(ModelError::DuplicateName(_)))
        ));

        let dangling = dir.path().join("dangling.json");
        fs::write(
            &dangling,
            r#"{"vertices": [{"name": "a"}, {"name": "b"}],
                "edges": [{"src": "a", "dst": "b", "src_port": "p",
                           "traits": ["PhysicalConnection"]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            load(&dangling),
            Err(CodecError::Model(ModelError::PortNotFound { .. }))
        ));

        let routes = dir.path().join("routes.json");
        fs::write(
            &routes,
            r#"{"vertices": [{"name": "SW", "ports": ["to_from_X"], "views": {
                "communication_module": {
                    "operating_frequency_in_hertz": 1, "flit_size_in_bits": 8,
                    "initial_latency": 0, "max_cycles_per_flit": 1, "max_concurrent_flits": 1,
                    "port_connections": {"to_from_X": ["to_from_Y"]}}}}],
                "edges": []}"#,
        )
        .unwrap();
        assert!(matches!(
            load(&routes),
            Err(CodecError::Model(ModelError::PortNotFound { port, .. })) if &*port == "to_from_Y"
        ));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        assert!(matches!(load(&garbage), Err(CodecError::Json(_))));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            load(Path::new("/nonexistent/dir/model.json")),
            Err(CodecError::Io(_))
        ));
    }
}
