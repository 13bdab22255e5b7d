//! Spatial and common types
//!
//! The workspace is Y-up: `Vec3::UP` is the vertical axis and `Vec3::FORWARD`
//! (+X) is the axis a `Rotator` of all zeros points along.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D vector, used for cross-section scale and offset of deforming meshes
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// Component-wise product
impl Mul for Vec2 {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }
}

/// A 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Self = Self {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };
    pub const UP: Self = Self {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };
    pub const FORWARD: Self = Self {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Linear interpolation, `t = 0` yields `self`
    pub fn lerp(&self, other: Self, t: f32) -> Self {
        *self + (other - *self) * t
    }

    /// The trailing two components, as used for a deforming mesh cross-section
    pub fn yz(&self) -> Vec2 {
        Vec2::new(self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// Component-wise product
impl Mul for Vec3 {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Self {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }
}

/// Euler rotation in degrees.
///
/// Applied as roll about X, then pitch about Z, then yaw about Y, so that
/// `roll` spins around the forward axis and `yaw` turns around `Vec3::UP`.
/// Rotators add component-wise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    #[serde(default)]
    pub roll: f32,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Rotator {
    pub const ZERO: Self = Self {
        roll: 0.0,
        yaw: 0.0,
        pitch: 0.0,
    };

    pub const fn new(roll: f32, yaw: f32, pitch: f32) -> Self {
        Self { roll, yaw, pitch }
    }

    /// Rotation that points `Vec3::FORWARD` along `direction`, with no roll
    pub fn from_direction(direction: Vec3) -> Self {
        let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
        Self {
            roll: 0.0,
            yaw: (-direction.z).atan2(direction.x).to_degrees(),
            pitch: direction.y.atan2(horizontal).to_degrees(),
        }
    }

    /// Euler vector representation `(roll, yaw, pitch)`
    pub fn to_vector(&self) -> Vec3 {
        Vec3::new(self.roll, self.yaw, self.pitch)
    }

    pub fn from_vector(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn rotate_vector(&self, v: Vec3) -> Vec3 {
        let (sr, cr) = self.roll.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();

        let v = Vec3::new(v.x, v.y * cr - v.z * sr, v.y * sr + v.z * cr);
        let v = Vec3::new(v.x * cp - v.y * sp, v.x * sp + v.y * cp, v.z);
        Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy)
    }

    /// The rotated forward axis
    pub fn forward(&self) -> Vec3 {
        self.rotate_vector(Vec3::FORWARD)
    }

    /// The rotated up axis
    pub fn up(&self) -> Vec3 {
        self.rotate_vector(Vec3::UP)
    }
}

impl Add for Rotator {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            roll: self.roll + other.roll,
            yaw: self.yaw + other.yaw,
            pitch: self.pitch + other.pitch,
        }
    }
}

/// A 3D transform with position, rotation, and scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Rotator,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Rotator::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Rotator) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Map a point from local space into the space this transform lives in
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.position + self.rotation.rotate_vector(p * self.scale)
    }

    /// Like `transform_point`, without translation
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation.rotate_vector(v * self.scale)
    }
}

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    pub const CYAN: Self = Self::new(0.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
