//! Packed vertex attribute formats
//!
//! Normals are stored as a 10-10-10-2 signed normalized word (x in the low
//! bits), UVs as two IEEE half floats (u in the low half).

use half::f16;

use crate::foundation::math::{Vec2, Vec3};

const SNORM10_MAX: f32 = 511.0;
const MASK10: u32 = 0x3FF;

fn snorm10_to_f32(bits: u32) -> f32 {
    // Sign-extend the 10-bit field
    let value = ((bits << 22) as i32) >> 22;
    (value as f32 / SNORM10_MAX).clamp(-1.0, 1.0)
}

fn f32_to_snorm10(value: f32) -> u32 {
    let scaled = (value.clamp(-1.0, 1.0) * SNORM10_MAX).round() as i32;
    (scaled as u32) & MASK10
}

/// Unpack the xyz components of a 10-10-10-2 signed normalized word
#[must_use]
pub fn unpack_snorm_3x10_1x2(word: u32) -> Vec3 {
    Vec3::new(
        snorm10_to_f32(word & MASK10),
        snorm10_to_f32((word >> 10) & MASK10),
        snorm10_to_f32((word >> 20) & MASK10),
    )
}

/// Pack a vector into a 10-10-10-2 signed normalized word (w = 0)
#[must_use]
pub fn pack_snorm_3x10_1x2(v: &Vec3) -> u32 {
    f32_to_snorm10(v.x) | (f32_to_snorm10(v.y) << 10) | (f32_to_snorm10(v.z) << 20)
}

/// Unpack two half floats
#[must_use]
pub fn unpack_half_2x16(word: u32) -> Vec2 {
    Vec2::new(
        f16::from_bits((word & 0xFFFF) as u16).to_f32(),
        f16::from_bits((word >> 16) as u16).to_f32(),
    )
}

/// Pack two floats as half floats
#[must_use]
pub fn pack_half_2x16(v: &Vec2) -> u32 {
    u32::from(f16::from_f32(v.x).to_bits()) | (u32::from(f16::from_f32(v.y).to_bits()) << 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_normals_are_exact() {
        for axis in [Vec3::x(), Vec3::y(), Vec3::z(), -Vec3::x(), -Vec3::y(), -Vec3::z()] {
            let unpacked = unpack_snorm_3x10_1x2(pack_snorm_3x10_1x2(&axis));
            assert_relative_eq!(unpacked, axis, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_known_word() {
        // x = 511 (1.0), y = 0, z = -511 (0x201)
        let word = 0x1FF | (0x201 << 20);
        let v = unpack_snorm_3x10_1x2(word);
        assert_relative_eq!(v, Vec3::new(1.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_most_negative_field_clamps() {
        // 0x200 is -512, which clamps to -1
        let v = unpack_snorm_3x10_1x2(0x200);
        assert_relative_eq!(v.x, -1.0);
    }

    #[test]
    fn test_w_bits_are_ignored() {
        let word = pack_snorm_3x10_1x2(&Vec3::new(0.5, -0.25, 0.0)) | (0b11 << 30);
        let v = unpack_snorm_3x10_1x2(word);
        assert_relative_eq!(v.x, 0.5, epsilon = 1.0 / 511.0);
        assert_relative_eq!(v.y, -0.25, epsilon = 1.0 / 511.0);
    }

    #[test]
    fn test_half_uv() {
        let uv = Vec2::new(0.25, 0.75);
        assert_relative_eq!(unpack_half_2x16(pack_half_2x16(&uv)), uv);
        // 1.0 in half precision is 0x3C00
        assert_relative_eq!(unpack_half_2x16(0x3C00).x, 1.0);
    }
}
