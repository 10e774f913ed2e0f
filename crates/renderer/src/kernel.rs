//! CPU evaluation of the fog kernel.
//!
//! Mirrors the fog fragment shader in `compile.rs` step for step so still exports and
//! tests see the same picture the GPU draws. Keep both in sync.

use glam::{Vec2, Vec3};

use crate::uniforms::FogUniforms;

const FBM_OCTAVES: usize = 5;
const LAYER_WEIGHTS: [f32; 3] = [0.60, 0.28, 0.12];
const LAYER_CONTRAST: [f32; 3] = [1.5, 1.3, 1.2];

/// One shaded pixel: straight (non-premultiplied) color plus coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogSample {
    pub color: Vec3,
    pub alpha: f32,
}

fn fract(v: Vec2) -> Vec2 {
    v - v.floor()
}

fn fract1(x: f32) -> f32 {
    x - x.floor()
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn hash(p: Vec2) -> f32 {
    let mut p = fract(p * Vec2::new(123.34, 456.21));
    p += p.dot(p + 45.32);
    fract1(p.x * p.y)
}

/// Per-pixel offset of at most half a 8-bit step in either direction.
pub fn dither(frag_coord: Vec2) -> f32 {
    (hash(frag_coord) - 0.5) / 255.0
}

/// Bilinear value noise over the integer lattice with smoothstep weights.
pub fn value_noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = fract(p);
    let f = f * f * (Vec2::splat(3.0) - 2.0 * f);

    let a = hash(i);
    let b = hash(i + Vec2::new(1.0, 0.0));
    let c = hash(i + Vec2::new(0.0, 1.0));
    let d = hash(i + Vec2::new(1.0, 1.0));

    mix(mix(a, b, f.x), mix(c, d, f.x), f.y)
}

pub fn fbm(p: Vec2) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..FBM_OCTAVES {
        value += amplitude * value_noise(p * frequency);
        frequency *= 2.0;
        amplitude *= 0.5;
    }
    value
}

fn domain_warp(p: Vec2, strength: f32, time: f32, speed: f32) -> Vec2 {
    let warp1 = fbm(p + time * 0.05 * speed);
    let warp2 = fbm(p + Vec2::new(warp1 * 4.0, time * 0.03 * speed));

    let offset = Vec2::new(
        fbm(p + strength * Vec2::new(warp1, warp2)),
        fbm(p + strength * Vec2::new(warp2, warp1) + 5.2),
    );

    p + offset * strength
}

/// Shift applied to the warped coordinate so fog parts around the pointer.
///
/// Points from `uv` toward the pointer, scaled by `exp(-dist / radius) * strength`.
pub fn pointer_displacement(pointer: Vec2, uv: Vec2, strength: f32, radius: f32) -> Vec2 {
    let offset = pointer - uv;
    let influence = (-offset.length() / radius).exp() * strength;
    offset * influence * 0.3
}

/// Shades one pixel.
///
/// `uv` is the normalised position with origin bottom-left; `frag_coord` is
/// the pixel coordinate used only to seed the dither.
pub fn shade(u: &FogUniforms, uv: Vec2, frag_coord: Vec2) -> FogSample {
    let resolution = Vec2::from(u.resolution).max(Vec2::ONE);
    let mut p = (uv - 0.5) * 2.0;
    p.x *= resolution.x / resolution.y;

    let mut warped = domain_warp(p, u.warp, u.time, u.speed);

    warped += pointer_displacement(Vec2::from(u.pointer), uv, u.pointer_strength, u.pointer_radius);

    let drift = u.time * u.speed;
    let near = fbm(warped * 1.2 + drift * 0.02);
    let mid = fbm(warped * 2.5 + drift * 0.04 + Vec2::new(10.0, 5.0));
    let far = fbm(warped * 4.0 + drift * 0.06 + Vec2::new(20.0, 15.0));
    let mut fog = [near, mid, far]
        .iter()
        .zip(LAYER_CONTRAST)
        .zip(LAYER_WEIGHTS)
        .map(|((layer, contrast), weight)| layer.powf(contrast) * weight)
        .sum::<f32>();

    let right_bias = smoothstep(0.0, 1.0, uv.x).powf(1.5);
    fog *= mix(0.3, 1.0, right_bias);
    fog *= 1.0 - (uv.y - 0.5).abs() * 1.2;

    fog = (fog * 1.18 + 0.08).clamp(0.0, 1.0).powf(0.85);

    let vignette = smoothstep(0.0, 1.0, 1.0 - p.length() * 0.28);

    fog = fog.powf(1.0 / u.density);

    let highlight = smoothstep(0.3, 0.7, fog);
    let tint = Vec3::from(u.tint);
    let background = Vec3::from(u.background);
    let base = background.lerp(background + Vec3::new(0.08, 0.08, 0.09), fog);
    let color = (base + tint * highlight * 0.18).max(Vec3::ZERO).powf(0.9);

    FogSample {
        color: color + Vec3::splat(dither(frag_coord)),
        alpha: fog * vignette * 0.92 * u.fade,
    }
}
