use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(device, "fullscreen triangle vertex", VERTEX_SHADER_GLSL, ShaderStage::Vertex)
}

/// Compiles the fog kernel fragment shader.
pub(crate) fn compile_fog_fragment(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(device, "fog fragment", FOG_FRAGMENT_GLSL, ShaderStage::Fragment)
}

/// Compiles the shader that stretches the scaled fog target onto the surface.
pub(crate) fn compile_blit_fragment(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(device, "fog blit fragment", BLIT_FRAGMENT_GLSL, ShaderStage::Fragment)
}

fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

/// Minimal full-screen triangle; `v_uv` runs 0..1 with origin bottom-left.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

void main() {
    int index = int(gl_VertexIndex);
    vec2 pos = vec2(float((index << 1) & 2), float(index & 2)) * 2.0 - 1.0;
    v_uv = pos * 0.5 + 0.5;
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// Fog kernel. Layout of `FogParams` must match [`crate::uniforms::FogUniforms`];
/// the math must match [`crate::kernel::shade`].
const FOG_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FogParams {
    vec2 resolution;
    vec2 pointer;
    float time;
    float density;
    float speed;
    float warp;
    vec3 tint;
    float pointerStrength;
    vec3 background;
    float pointerRadius;
    float fade;
    float padding0;
    float padding1;
    float padding2;
} params;

float hash(vec2 p) {
    vec2 q = fract(p * vec2(123.34, 456.21));
    q += dot(q, q + 45.32);
    return fract(q.x * q.y);
}

float dither(vec2 coord) {
    return (hash(coord) - 0.5) / 255.0;
}

float valueNoise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    f = f * f * (3.0 - 2.0 * f);

    float a = hash(i);
    float b = hash(i + vec2(1.0, 0.0));
    float c = hash(i + vec2(0.0, 1.0));
    float d = hash(i + vec2(1.0, 1.0));

    return mix(mix(a, b, f.x), mix(c, d, f.x), f.y);
}

float fbm(vec2 p) {
    float value = 0.0;
    float amplitude = 0.5;
    float frequency = 1.0;
    for (int octave = 0; octave < 5; octave++) {
        value += amplitude * valueNoise(p * frequency);
        frequency *= 2.0;
        amplitude *= 0.5;
    }
    return value;
}

vec2 domainWarp(vec2 p, float strength) {
    float warp1 = fbm(p + params.time * 0.05 * params.speed);
    float warp2 = fbm(p + vec2(warp1 * 4.0, params.time * 0.03 * params.speed));

    vec2 offset = vec2(
        fbm(p + strength * vec2(warp1, warp2)),
        fbm(p + strength * vec2(warp2, warp1) + 5.2)
    );

    return p + offset * strength;
}

void main() {
    vec2 uv = v_uv;
    vec2 resolution = max(params.resolution, vec2(1.0));
    vec2 p = (uv - 0.5) * 2.0;
    p.x *= resolution.x / resolution.y;

    vec2 warped = domainWarp(p, params.warp);

    vec2 pointerOffset = params.pointer - uv;
    float pointerDist = length(pointerOffset);
    float pointerInfluence = exp(-pointerDist / params.pointerRadius) * params.pointerStrength;
    warped += pointerOffset * pointerInfluence * 0.3;

    float drift = params.time * params.speed;
    float nearFog = pow(fbm(warped * 1.2 + drift * 0.02), 1.5);
    float midFog = pow(fbm(warped * 2.5 + drift * 0.04 + vec2(10.0, 5.0)), 1.3);
    float farFog = pow(fbm(warped * 4.0 + drift * 0.06 + vec2(20.0, 15.0)), 1.2);
    float fog = nearFog * 0.60 + midFog * 0.28 + farFog * 0.12;

    float rightBias = pow(smoothstep(0.0, 1.0, uv.x), 1.5);
    fog *= mix(0.3, 1.0, rightBias);
    fog *= 1.0 - abs(uv.y - 0.5) * 1.2;

    fog = pow(clamp(fog * 1.18 + 0.08, 0.0, 1.0), 0.85);

    float vignette = smoothstep(0.0, 1.0, 1.0 - length(p) * 0.28);

    fog = pow(fog, 1.0 / params.density);

    float highlight = smoothstep(0.3, 0.7, fog);
    vec3 base = mix(params.background, params.background + vec3(0.08, 0.08, 0.09), fog);
    vec3 color = pow(max(base + params.tint * highlight * 0.18, vec3(0.0)), vec3(0.9));

    float alpha = fog * vignette * 0.92 * params.fade;
    outColor = vec4(color + vec3(dither(gl_FragCoord.xy)), alpha);
}
";

/// Samples the scaled fog target; texture rows run top-down, `v_uv` bottom-up.
const BLIT_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D fog_texture;
layout(set = 0, binding = 1) uniform sampler fog_sampler;

void main() {
    outColor = texture(sampler2D(fog_texture, fog_sampler), vec2(v_uv.x, 1.0 - v_uv.y));
}
";

#[cfg(test)]
mod tests {
    use wgpu::naga::front::glsl::{Frontend, Options};
    use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

    use super::*;

    fn parse_and_validate(source: &str, stage: ShaderStage) {
        let module = Frontend::default()
            .parse(&Options::from(stage), source)
            .unwrap_or_else(|err| panic!("GLSL failed to parse: {err:?}"));
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .unwrap_or_else(|err| panic!("GLSL failed to validate: {err:?}"));
    }

    #[test]
    fn vertex_shader_is_valid_glsl() {
        parse_and_validate(VERTEX_SHADER_GLSL, ShaderStage::Vertex);
    }

    #[test]
    fn fog_shader_is_valid_glsl() {
        parse_and_validate(FOG_FRAGMENT_GLSL, ShaderStage::Fragment);
    }

    #[test]
    fn blit_shader_is_valid_glsl() {
        parse_and_validate(BLIT_FRAGMENT_GLSL, ShaderStage::Fragment);
    }

    #[test]
    fn fog_block_declares_every_uniform() {
        for member in [
            "vec2 resolution;",
            "vec2 pointer;",
            "float time;",
            "float density;",
            "float speed;",
            "float warp;",
            "vec3 tint;",
            "float pointerStrength;",
            "vec3 background;",
            "float pointerRadius;",
            "float fade;",
        ] {
            assert!(FOG_FRAGMENT_GLSL.contains(member), "missing {member}");
        }
    }
}
