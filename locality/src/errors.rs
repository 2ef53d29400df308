#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Got an invalid parameter value in a function, for example unsorted or
    /// out of bounds indexes when building a `NeighborList`
    InvalidParameter(String),
    /// A required query argument is missing after inferring the query mode
    MissingArgument(String),
    /// The query can not be performed with this simulation box, for example
    /// because the cutoff is too large compared to the box
    Configuration(String),
    /// A `NeighborList` does not match the points it is used with
    Inconsistent(String),
    /// This operation is not supported by this kind of neighbor query
    Unsupported(String),
    /// Error while serializing/deserializing data
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            Error::MissingArgument(e) => write!(f, "missing argument: {}", e),
            Error::Configuration(e) => write!(f, "invalid configuration: {}", e),
            Error::Inconsistent(e) => write!(f, "inconsistent data: {}", e),
            Error::Unsupported(e) => write!(f, "unsupported operation: {}", e),
            Error::Json(e) => write!(f, "json error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidParameter(_) |
            Error::MissingArgument(_) |
            Error::Configuration(_) |
            Error::Inconsistent(_) |
            Error::Unsupported(_) => None,
            Error::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}
