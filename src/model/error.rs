use std::{error::Error, fmt};

use crate::Symbol;

/// Errors raised by graph and builder operations.
///
/// Every operation checks its preconditions before touching the graph, so when one of these
/// is returned the graph is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A vertex with this name already exists.
    DuplicateName(Symbol),
    /// The vertex already owns a port with this name.
    DuplicatePort { vertex: Symbol, port: Symbol },
    /// No actor with this name was registered.
    ActorNotFound(Symbol),
    /// No platform component with this name was registered.
    ComponentNotFound(Symbol),
    /// The vertex has no port with this name (or no port towards this neighbour).
    PortNotFound { vertex: Symbol, port: Symbol },
    /// A derived port name is already taken on the vertex.
    PortCollision { vertex: Symbol, port: Symbol },
    /// A component name or group matched nothing.
    NoMatch(Symbol),
    /// Illegal platform topology.
    Topology(String),
    /// A numeric or structural parameter is out of its allowed range.
    Validation(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::DuplicateName(name) => write!(f, "Duplicate vertex name: {}", name),
            ModelError::DuplicatePort { vertex, port } => {
                write!(f, "Vertex {} already has a port named {}", vertex, port)
            }
            ModelError::ActorNotFound(name) => write!(f, "Actor not found: {}", name),
            ModelError::ComponentNotFound(name) => write!(f, "No component named {} found", name),
            ModelError::PortNotFound { vertex, port } => {
                write!(f, "Port for {} not found on {}", port, vertex)
            }
            ModelError::PortCollision { vertex, port } => {
                write!(f, "Port {} already exists on {}", port, vertex)
            }
            ModelError::NoMatch(name) => {
                write!(f, "No component(s) found for name or group {}", name)
            }
            ModelError::Topology(msg) => write!(f, "Topology error: {}", msg),
            ModelError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl Error for ModelError {}
