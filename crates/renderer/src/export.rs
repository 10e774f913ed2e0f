use anyhow::{Context, Result};
use fogconfig::{ConfigError, RenderConfig};
use glam::{Vec2, Vec3};
use image::{ImageFormat, Rgb, RgbImage};
use winit::dpi::LogicalSize;

use crate::kernel;
use crate::types::{ExportTarget, PointerState, RenderError};
use crate::uniforms::FogUniforms;

/// Evaluates one frame on the CPU, composited opaquely over the background.
pub fn render_still(
    config: &RenderConfig,
    size: (u32, u32),
    time: f32,
    pointer: PointerState,
) -> Result<RgbImage, RenderError> {
    config.validate()?;
    let (width, height) = size;
    if width == 0 || height == 0 {
        return Err(ConfigError::Invalid(format!("export size {width}x{height} has no pixels")).into());
    }

    let mut uniforms = FogUniforms::new(config, LogicalSize::new(width, height), false);
    uniforms.set_frame(time, pointer, 1.0);
    let background = Vec3::from(config.background.to_array());
    let extent = Vec2::new(width as f32, height as f32);

    Ok(RgbImage::from_fn(width, height, |x, y| {
        // Image rows run top-down; shader space is bottom-up.
        let frag_coord = Vec2::new(x as f32 + 0.5, (height - 1 - y) as f32 + 0.5);
        let sample = kernel::shade(&uniforms, frag_coord / extent, frag_coord);
        let color = background.lerp(sample.color, sample.alpha);
        Rgb(color.to_array().map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8))
    }))
}

/// Renders `target` and writes it as a PNG.
pub fn export_png(config: &RenderConfig, target: &ExportTarget) -> Result<()> {
    let image = render_still(config, target.size, target.time, target.pointer)?;
    image
        .save_with_format(&target.path, ImageFormat::Png)
        .with_context(|| format!("failed to write {}", target.path.display()))?;
    tracing::info!(
        path = %target.path.display(),
        width = target.size.0,
        height = target.size.1,
        time = target.time,
        "exported fog still"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_is_deterministic() {
        let config = RenderConfig::default();
        let first = render_still(&config, (48, 27), 3.0, PointerState::default()).expect("render");
        let second = render_still(&config, (48, 27), 3.0, PointerState::default()).expect("render");
        assert_eq!(first.dimensions(), (48, 27));
        assert_eq!(first, second);
    }

    #[test]
    fn pixels_composite_kernel_over_background() {
        let config = RenderConfig::default();
        let (width, height) = (32, 16);
        let image = render_still(&config, (width, height), 1.5, PointerState::default()).expect("render");

        let mut uniforms = FogUniforms::new(&config, LogicalSize::new(width, height), false);
        uniforms.set_frame(1.5, PointerState::default(), 1.0);
        // Top-left image pixel is the top row in shader space.
        let frag = Vec2::new(0.5, height as f32 - 0.5);
        let sample = kernel::shade(&uniforms, frag / Vec2::new(width as f32, height as f32), frag);
        let expected = Vec3::from(config.background.to_array()).lerp(sample.color, sample.alpha);
        let pixel = image.get_pixel(0, 0);
        for (channel, value) in pixel.0.iter().zip(expected.to_array()) {
            let expected = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            assert_eq!(*channel, expected);
        }
    }

    #[test]
    fn empty_size_is_rejected() {
        let err = render_still(&RenderConfig::default(), (0, 10), 0.0, PointerState::default())
            .expect_err("zero width");
        assert!(matches!(err, RenderError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn export_writes_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = ExportTarget {
            path: dir.path().join("fog.png"),
            size: (20, 10),
            time: 0.0,
            pointer: PointerState::default(),
        };
        export_png(&RenderConfig::default(), &target).expect("export");
        let written = image::open(&target.path).expect("decode png");
        assert_eq!((written.width(), written.height()), (20, 10));
    }
}
