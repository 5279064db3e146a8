//! # Habitat Core
//!
//! Layout kernel for pressurized habitat design: the module catalog, the
//! parametric shell and its containment test, the spatial constraint engine
//! that places and edits modules, and the undo/redo history over committed
//! edits.

pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod layout;
pub mod module;
pub mod shell;
pub mod spatial;

pub use catalog::{Catalog, ModuleTypeDef, ParamDescriptor, ParamKind, ParamValue};
pub use config::{Consumables, EnvironmentProfile, GlobalParams, HabitatConfig};
pub use error::{CatalogError, LayoutError, ParamError, ShellError, ValidationError};
pub use geometry::{Footprint, Point};
pub use gesture::{GestureMode, GestureState, GestureStep};
pub use history::HistoryStack;
pub use layout::{LayoutEditor, LayoutState, Placement, ShellReport};
pub use module::{InstanceId, ModuleInstance, ResizeHandle};
pub use shell::{ShellShape, ShellSpec};
