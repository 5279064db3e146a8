use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{ModuleTypeDef, ParamValue};
use crate::error::ParamError;
use crate::geometry::{normalize_angle, Footprint, Point};

/// Unique module instance identifier.
pub type InstanceId = Uuid;

/// Corner handle grabbed by a resize. Named in the module's local frame, where
/// local y grows "south".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    /// Sign of the handle along local x and y.
    fn signs(self) -> (f64, f64) {
        match self {
            ResizeHandle::Nw => (-1.0, -1.0),
            ResizeHandle::Ne => (1.0, -1.0),
            ResizeHandle::Sw => (-1.0, 1.0),
            ResizeHandle::Se => (1.0, 1.0),
        }
    }
}

/// A placed module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInstance {
    pub id: InstanceId,
    pub type_key: String,
    pub floor: u32,
    /// Footprint centre.
    pub position: Point,
    pub width: f64,
    pub depth: f64,
    /// Degrees, normalized to (-180, 180].
    pub rotation: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl ModuleInstance {
    /// A square instance of `def` at the plan centre, with default parameters.
    pub fn new(def: &ModuleTypeDef, floor: u32, edge: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            type_key: def.key.clone(),
            floor,
            position: Point::new(0.0, 0.0),
            width: edge,
            depth: edge,
            rotation: 0.0,
            locked: false,
            params: def
                .params
                .iter()
                .map(|p| (p.id.clone(), p.default_value()))
                .collect(),
        }
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.position, self.width, self.depth, self.rotation)
    }

    pub fn area(&self) -> f64 {
        self.width * self.depth
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            position: self.position.translate(dx, dy),
            ..self.clone()
        }
    }

    pub fn rotated_to(&self, degrees: f64) -> Self {
        Self {
            rotation: normalize_angle(degrees),
            ..self.clone()
        }
    }

    /// Drag `handle` by a world-space delta; the opposite corner stays put.
    pub fn resized(&self, handle: ResizeHandle, dx: f64, dy: f64) -> Self {
        let (sx, sy) = handle.signs();
        let local = Point::new(dx, dy).rotated(-self.rotation);
        let width = self.width + sx * local.x;
        let depth = self.depth + sy * local.y;
        let shift = Point::new(sx * local.x / 2.0, sy * local.y / 2.0).rotated(self.rotation);
        Self {
            position: self.position.translate(shift.x, shift.y),
            width,
            depth,
            ..self.clone()
        }
    }

    /// Write a parameter value, checked against the type's descriptor.
    pub fn with_param(&self, def: &ModuleTypeDef, key: &str, value: ParamValue) -> Result<Self, ParamError> {
        let desc = def.param(key).ok_or_else(|| ParamError::UnknownParameter {
            type_key: def.key.clone(),
            id: key.to_string(),
        })?;
        desc.check(&value)?;
        let mut next = self.clone();
        next.params.insert(key.to_string(), value);
        Ok(next)
    }

    /// Every stored value names a descriptor of `def` and satisfies it.
    pub fn check_params(&self, def: &ModuleTypeDef) -> Result<(), ParamError> {
        for (key, value) in &self.params {
            let desc = def.param(key).ok_or_else(|| ParamError::UnknownParameter {
                type_key: def.key.clone(),
                id: key.clone(),
            })?;
            desc.check(value)?;
        }
        Ok(())
    }
}
