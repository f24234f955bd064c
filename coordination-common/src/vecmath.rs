use serde::{Serialize, Deserialize};

// Basic 3D Vector type for particle positions (reduced units)
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline(always)]
    pub fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }
    #[inline(always)]
    pub fn zero() -> Self { Self::new(0.0, 0.0, 0.0) }
    #[inline(always)]
    pub fn splat(v: f64) -> Self { Self::new(v, v, v) }
    #[inline(always)]
    pub fn length_squared(self) -> f64 { self.x * self.x + self.y * self.y + self.z * self.z }
    #[inline(always)]
    pub fn length(self) -> f64 { self.length_squared().sqrt() }
    #[inline(always)]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x; let dy = self.y - other.y; let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
    #[inline(always)]
    pub fn distance(self, other: Self) -> f64 { self.distance_squared(other).sqrt() }
    #[inline(always)]
    pub fn add(self, other: Self) -> Self { Self::new(self.x + other.x, self.y + other.y, self.z + other.z) }
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self { Self::new(self.x - other.x, self.y - other.y, self.z - other.z) }
    #[inline(always)]
    pub fn scale(self, scalar: f64) -> Self { Self::new(self.x * scalar, self.y * scalar, self.z * scalar) }

    /// Applies `f` to each component independently.
    #[inline(always)]
    pub fn map<F: Fn(f64) -> f64>(self, f: F) -> Self { Self::new(f(self.x), f(self.y), f(self.z)) }

    /// Combines two vectors component by component.
    #[inline(always)]
    pub fn zip_map<F: Fn(f64, f64) -> f64>(self, other: Self, f: F) -> Self {
        Self::new(f(self.x, other.x), f(self.y, other.y), f(self.z, other.z))
    }

    #[inline(always)]
    pub fn to_array(self) -> [f64; 3] { [self.x, self.y, self.z] }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self { Self::new(v[0], v[1], v[2]) }
}
