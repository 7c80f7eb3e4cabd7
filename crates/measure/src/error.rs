use scene::{EntityId, GroupId};

#[derive(Debug, Clone, PartialEq)]
pub enum MeasureError {
    UnknownGroup(GroupId),
    NotALabel(EntityId),
    /// The requested operation does not apply to the annotation kind.
    Unsupported(&'static str),
    Config(String),
    Io(String),
}

impl std::fmt::Display for MeasureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasureError::UnknownGroup(group) => write!(f, "unknown annotation {group}"),
            MeasureError::NotALabel(entity) => {
                write!(f, "entity {entity} is not a measurement label")
            }
            MeasureError::Unsupported(what) => write!(f, "unsupported: {what}"),
            MeasureError::Config(msg) => write!(f, "invalid config: {msg}"),
            MeasureError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for MeasureError {}

impl From<serde_json::Error> for MeasureError {
    fn from(err: serde_json::Error) -> Self {
        MeasureError::Config(err.to_string())
    }
}

impl From<std::io::Error> for MeasureError {
    fn from(err: std::io::Error) -> Self {
        MeasureError::Io(err.to_string())
    }
}
