//! Blinking emission used to highlight a selected object

use crate::foundation::math::Vec3;
use crate::render::Material;

const EPSILON: f32 = 1e-4;

/// Steps a material's emission up and down between 0 and 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionPulse {
    step: f32,
    increasing: bool,
}

impl Default for EmissionPulse {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl EmissionPulse {
    /// Pulse moving `step` per call, starting upwards
    #[must_use]
    pub const fn new(step: f32) -> Self {
        Self { step, increasing: true }
    }

    /// Whether the next step brightens
    #[must_use]
    pub const fn is_increasing(&self) -> bool {
        self.increasing
    }

    /// Advance one step and write the new emission into `material`
    ///
    /// Direction flips once the red channel reaches either bound.
    pub fn step(&mut self, material: &mut Material) {
        let delta = if self.increasing { self.step } else { -self.step };
        let next = (material.emission + Vec3::repeat(delta)).map(|c| c.clamp(0.0, 1.0));
        material.emission = next;

        if next.x >= 1.0 - EPSILON {
            self.increasing = false;
        } else if next.x <= EPSILON {
            self.increasing = true;
        }
    }

    /// Restart upwards
    pub fn reset(&mut self) {
        self.increasing = true;
    }
}
