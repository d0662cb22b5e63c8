use thiserror::Error;

#[derive(Error, Debug)]
pub enum HypodepthError {
    #[error("Unknown travel time table type: {0}")]
    UnknownTravelTimeTableType(String),

    #[error("Unknown travel time model: {0}")]
    UnknownTravelTimeModel(String),

    #[error("No travel time for phase {phase} at {distance:.2} deg")]
    PhaseNotAvailable { phase: String, distance: f64 },

    #[error("Invalid depth phase parameter: {0}")]
    InvalidDepthPhaseParameter(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed polygon header: {0}")]
    PolygonHeaderError(String),

    #[error("Malformed polygon vertex: {0}")]
    PolygonVertexError(String),

    #[error("Truncated polygon '{name}': expected {expected} vertices, found {found}")]
    TruncatedPolygon {
        name: String,
        expected: usize,
        found: usize,
    },
}
