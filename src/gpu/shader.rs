//! WGSL source and instance layouts for the GPU surface.
//!
//! Both primitives are drawn as instanced quads in pixel space. The vertex
//! stage maps pixels to clip space (origin top-left, y down); the fragment
//! stage computes edge coverage so shapes get one pixel of anti-aliasing.

use bytemuck::{Pod, Zeroable};

/// One filled circle.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct CircleInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub color: [f32; 4],
}

impl CircleInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32x4];
}

/// One stroked line segment.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct LineInstance {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub color: [f32; 4],
    pub width: f32,
}

impl LineInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4, 3 => Float32];
}

/// Surface size in pixels.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ScreenUniforms {
    pub size: [f32; 2],
    pub _pad: [f32; 2],
}

pub(crate) const SHADER_SOURCE: &str = r#"
struct Screen {
    size: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> screen: Screen;

fn to_clip(p: vec2<f32>) -> vec4<f32> {
    let ndc = p / screen.size * 2.0 - vec2<f32>(1.0, 1.0);
    return vec4<f32>(ndc.x, -ndc.y, 0.0, 1.0);
}

struct CircleOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) local: vec2<f32>,
    @location(1) radius: f32,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_circle(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) center: vec2<f32>,
    @location(1) radius: f32,
    @location(2) color: vec4<f32>,
) -> CircleOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let extent = radius + 1.0;
    let local = quad_vertices[vertex_index] * extent;

    var out: CircleOutput;
    out.clip_position = to_clip(center + local);
    out.local = local;
    out.radius = radius;
    out.color = color;
    return out;
}

@fragment
fn fs_circle(in: CircleOutput) -> @location(0) vec4<f32> {
    let coverage = clamp(in.radius + 0.5 - length(in.local), 0.0, 1.0);
    if coverage <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) across: f32,
    @location(1) half_width: f32,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_line(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) from_pos: vec2<f32>,
    @location(1) to_pos: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) width: f32,
) -> LineOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(0.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(0.0,  1.0),
        vec2<f32>(0.0,  1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0,  1.0),
    );

    let segment = to_pos - from_pos;
    let len = length(segment);
    var dir = vec2<f32>(1.0, 0.0);
    if len > 0.0001 {
        dir = segment / len;
    }
    let normal = vec2<f32>(-dir.y, dir.x);

    let corner = quad_vertices[vertex_index];
    let half_width = width * 0.5;
    let across = corner.y * (half_width + 1.0);
    let pos = from_pos + dir * (corner.x * len) + normal * across;

    var out: LineOutput;
    out.clip_position = to_clip(pos);
    out.across = across;
    out.half_width = half_width;
    out.color = color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    let coverage = clamp(in.half_width + 0.5 - abs(in.across), 0.0, 1.0);
    if coverage <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}
"#;
