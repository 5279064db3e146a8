use thiserror::Error;

use crate::module::InstanceId;

/// A geometric or size constraint that a proposed placement violates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("module {id} does not fit inside the shell on floor {floor}")]
    OutsideShell { id: InstanceId, floor: u32 },

    #[error("module {id} overlaps module {other} on floor {floor}")]
    Overlap {
        id: InstanceId,
        other: InstanceId,
        floor: u32,
    },

    #[error("module {id} size {width:.2} x {depth:.2} m is outside [{min:.2}, {max:.2}] m")]
    SizeOutOfBounds {
        id: InstanceId,
        width: f64,
        depth: f64,
        min: f64,
        max: f64,
    },

    #[error("floor {floor} is outside 1..={floor_count}")]
    FloorOutOfRange { floor: u32, floor_count: u32 },

    #[error("module {id} has type '{type_key}', which is not in the catalog")]
    UnknownType { id: InstanceId, type_key: String },

    #[error("module {id} has a non-conforming parameter: {error}")]
    InvalidParameter { id: InstanceId, error: ParamError },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("module type '{0}' is not registered in the catalog")]
    NotFound(String),
}

/// A parameter write that does not conform to its type's descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("module type '{type_key}' has no parameter '{id}'")]
    UnknownParameter { type_key: String, id: String },

    #[error("parameter '{id}' expects a {expected} value")]
    WrongKind { id: String, expected: &'static str },

    #[error("parameter '{id}' value {value} is outside [{min}, {max}]")]
    OutOfBounds {
        id: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter '{id}' does not accept choice '{value}'")]
    InvalidChoice { id: String, value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShellError {
    #[error("{floor_count} floors spaced {floor_gap:.2} m do not fit in a {height:.2} m shell")]
    FloorsExceedHeight {
        floor_count: u32,
        floor_gap: f64,
        height: f64,
    },
}

/// Outcome of a rejected editor operation. Rejections never leave a partial mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("module instance {0} not found")]
    InstanceNotFound(InstanceId),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Parameter(#[from] ParamError),

    #[error("module instance {0} is locked")]
    Locked(InstanceId),

    #[error("another gesture is already in progress")]
    GestureActive,

    #[error("no gesture is in progress")]
    NoGesture,

    #[error("invalid shell: {0}")]
    InvalidShell(#[from] ShellError),

    #[error("unknown environment profile '{0}'")]
    UnknownEnvironment(String),
}
