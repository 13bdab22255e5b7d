//! FlexSpline Core - Foundational types for the FlexSpline workspace
//!
//! This crate provides the types every other FlexSpline crate depends on:
//! - `Vec2`, `Vec3`, `Rotator`, `Transform`, `Color` - Spatial types
//! - `ContentHash`, `PointHash` - SHA-256 based content hashing
//! - `LayerId`, `HandleId` - Stable identifiers
//! - `SplineSource` - Read-only spline queries, plus `ControlPointSpline`
//! - Error types and Result alias

mod error;
mod hash;
mod id;
pub mod spline;
mod types;

pub use error::{FlexError, Result};
pub use hash::{ContentHash, PointHash};
pub use id::{HandleId, LayerId};
pub use spline::{ControlPointSpline, CoordinateSpace, SplineControlPoint, SplineSource};
pub use types::{Color, Rotator, Transform, Vec2, Vec3};
