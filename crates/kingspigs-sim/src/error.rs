use std::fmt;

use kingspigs_core::DoorKind;

/// The level document could not be read or does not have the expected shape.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Io { path: String, message: String },
    Parse(String),
    MissingLayer(String),
    MalformedLayer { layer: String, reason: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "failed to read {path}: {message}"),
            Self::Parse(e) => write!(f, "invalid level document: {e}"),
            Self::MissingLayer(name) => write!(f, "missing layer: {name}"),
            Self::MalformedLayer { layer, reason } => {
                write!(f, "malformed layer {layer}: {reason}")
            },
        }
    }
}

impl std::error::Error for LoadError {}

/// The document parsed but geometry the simulation requires is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The door layer exists (or is optional) but holds no tiles.
    MissingDoor(DoorKind),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDoor(DoorKind::Prev) => write!(f, "level has no prev door (no spawn point)"),
            Self::MissingDoor(DoorKind::Next) => write!(f, "level has no next door (no exit)"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Anything that blocks entering a level.
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    Load(LoadError),
    Geometry(GeometryError),
    /// Waited on a level that no load was started for.
    NotRequested(u32),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "level load failed: {e}"),
            Self::Geometry(e) => write!(f, "level geometry invalid: {e}"),
            Self::NotRequested(index) => write!(f, "no load in progress for level {index}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Geometry(e) => Some(e),
            Self::NotRequested(_) => None,
        }
    }
}

impl From<LoadError> for LevelError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

impl From<GeometryError> for LevelError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_layer_and_missing_door_are_distinct() {
        let layer: LevelError = LoadError::MissingLayer("Map".into()).into();
        let door: LevelError = GeometryError::MissingDoor(DoorKind::Prev).into();
        assert!(matches!(layer, LevelError::Load(LoadError::MissingLayer(_))));
        assert!(matches!(door, LevelError::Geometry(GeometryError::MissingDoor(DoorKind::Prev))));
        assert_eq!(layer.to_string(), "level load failed: missing layer: Map");
    }

    #[test]
    fn source_chain() {
        use std::error::Error;
        let err: LevelError = LoadError::Parse("eof".into()).into();
        assert!(err.source().is_some());
    }
}
