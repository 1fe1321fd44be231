/// Graph Store errors.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("edge already exists between {node1} and {node2}")]
    DuplicateEdge { node1: String, node2: String },

    #[error("node already exists: {name}")]
    DuplicateNode { name: String },

    #[error("node not found: {name}")]
    NodeNotFound { name: String },

    #[error("no edge between {node1} and {node2}")]
    EdgeNotFound { node1: String, node2: String },

    #[error("self loop rejected on {name}")]
    SelfLoop { name: String },
}
