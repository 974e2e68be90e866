#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graph has {edge_count} edge(s) but no nodes")]
    EdgesWithoutNodes { edge_count: usize },
    #[error("duplicate node id: {node_id}")]
    DuplicateNode { node_id: String },
    #[error("edge #{edge_index} ({source_id} -> {target_id}) references a missing node: {missing}")]
    MissingEndpoint {
        edge_index: usize,
        source_id: String,
        target_id: String,
        missing: String,
    },
    #[error("node {node_id} has invalid size {width}x{height}")]
    InvalidNodeSize {
        node_id: String,
        width: f64,
        height: f64,
    },
    #[error("node {node_id} ({width}x{height}) does not fit the {canvas_width}x{canvas_height} canvas")]
    NodeExceedsCanvas {
        node_id: String,
        width: f64,
        height: f64,
        canvas_width: f64,
        canvas_height: f64,
    },
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },
    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },
    #[error("unsupported diagram type: {diagram_type}")]
    UnsupportedDiagram { diagram_type: String },
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
