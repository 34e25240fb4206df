use hovertrans_types::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("document has not been loaded")]
    NotLoaded,
}
