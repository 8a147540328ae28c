//! Per-vertex fixed-function lighting

use crate::foundation::math::{utils, Vec3, Vec4};
use crate::render::lighting::{LightParams, NO_CUTOFF};
use crate::render::material::MaterialParams;

/// A light slot after its position was captured in eye space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeLight {
    /// Colors and attenuation as submitted
    pub params: LightParams,
    /// Homogeneous eye-space position
    pub position: Vec4,
    /// Eye-space spot axis
    pub spot_direction: Vec3,
}

fn rgb(v: &Vec4) -> Vec3 {
    v.xyz()
}

/// Lit vertex color for an eye-space position and unit normal
///
/// The viewer is at infinity along +Z, as with GL's default
/// non-local-viewer model.
#[must_use]
pub fn shade_vertex(
    material: &MaterialParams,
    global_ambient: &Vec3,
    lights: &[Option<EyeLight>],
    eye_position: &Vec3,
    normal: &Vec3,
) -> Vec4 {
    let mut color = rgb(&material.emission) + global_ambient.component_mul(&rgb(&material.ambient));

    for light in lights.iter().flatten() {
        let (to_light, attenuation) = if light.position.w.abs() <= f32::EPSILON {
            (light.position.xyz().try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z), 1.0)
        } else {
            let offset = light.position.xyz() / light.position.w - eye_position;
            let distance = offset.norm();
            let p = &light.params;
            let falloff = distance.mul_add(
                distance.mul_add(p.quadratic_attenuation, p.linear_attenuation),
                p.constant_attenuation,
            );
            let direction = offset.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z);
            (direction, if falloff > f32::EPSILON { 1.0 / falloff } else { 1.0 })
        };

        let spot = spot_factor(light, &to_light);
        if spot <= 0.0 {
            continue;
        }

        let p = &light.params;
        let ambient = rgb(&p.ambient).component_mul(&rgb(&material.ambient));
        let n_dot_l = normal.dot(&to_light).max(0.0);
        let diffuse = rgb(&p.diffuse).component_mul(&rgb(&material.diffuse)) * n_dot_l;
        let specular = if n_dot_l > 0.0 {
            let half = (to_light + Vec3::z()).try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z);
            let n_dot_h = normal.dot(&half).max(0.0);
            rgb(&p.specular).component_mul(&rgb(&material.specular)) * n_dot_h.powf(material.shininess)
        } else {
            Vec3::zeros()
        };

        color += (ambient + diffuse + specular) * (attenuation * spot);
    }

    Vec4::new(
        color.x.clamp(0.0, 1.0),
        color.y.clamp(0.0, 1.0),
        color.z.clamp(0.0, 1.0),
        material.diffuse.w.clamp(0.0, 1.0),
    )
}

fn spot_factor(light: &EyeLight, to_light: &Vec3) -> f32 {
    let cutoff = light.params.spot_cutoff;
    if cutoff >= NO_CUTOFF || light.position.w.abs() <= f32::EPSILON {
        return 1.0;
    }
    let axis = light
        .spot_direction
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(|| -Vec3::z());
    let cos_angle = (-to_light).dot(&axis);
    if cos_angle < utils::deg_to_rad(cutoff).cos() {
        0.0
    } else {
        cos_angle.max(0.0).powf(light.params.spot_exponent)
    }
}
