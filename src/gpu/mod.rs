//! GPU-backed drawing surface for the native window host.
//!
//! [`GpuSurface`] collects circles and lines as instance data while a frame is
//! drawn and submits them in one render pass on [`Surface::present`]: all
//! circles first, then all lines, which is the order the animator draws them.

mod shader;

use std::sync::Arc;

use glam::Vec2;
use tracing::{error, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::surface::{Bounds, Rgba, Surface};
use shader::{CircleInstance, LineInstance, ScreenUniforms, SHADER_SOURCE};

const INITIAL_CAPACITY: usize = 256;

/// A growable instance buffer.
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    label: &'static str,
}

impl InstanceBuffer {
    fn new(device: &wgpu::Device, label: &'static str, stride: usize) -> Self {
        Self {
            buffer: create_instance_buffer(device, label, INITIAL_CAPACITY * stride),
            capacity: INITIAL_CAPACITY,
            label,
        }
    }

    /// Upload `data`, reallocating when it no longer fits.
    fn upload<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.is_empty() {
            return;
        }
        if data.len() > self.capacity {
            self.capacity = data.len().next_power_of_two();
            self.buffer = create_instance_buffer(device, self.label, self.capacity * std::mem::size_of::<T>());
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
    }
}

fn create_instance_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// A [`Surface`] that renders into a window swapchain through wgpu.
pub struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    screen_buffer: wgpu::Buffer,
    screen_bind_group: wgpu::BindGroup,
    circle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    circle_buffer: InstanceBuffer,
    line_buffer: InstanceBuffer,
    circles: Vec<CircleInstance>,
    lines: Vec<LineInstance>,
    clear_color: wgpu::Color,
    out_of_memory: bool,
}

impl GpuSurface {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Colors are given in sRGB already, so prefer a non-sRGB target to
        // keep them from being encoded twice.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Uniform Buffer"),
            contents: bytemuck::bytes_of(&screen_uniforms(&config)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let screen_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Screen Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Screen Bind Group"),
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Field Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Field Pipeline Layout"),
            bind_group_layouts: &[&screen_bind_group_layout],
            push_constant_ranges: &[],
        });

        let circle_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            "Circle Pipeline",
            ("vs_circle", "fs_circle"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<CircleInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &CircleInstance::ATTRIBUTES,
            },
        );

        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            "Line Pipeline",
            ("vs_line", "fs_line"),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &LineInstance::ATTRIBUTES,
            },
        );

        let circle_buffer = InstanceBuffer::new(&device, "Circle Instance Buffer", std::mem::size_of::<CircleInstance>());
        let line_buffer = InstanceBuffer::new(&device, "Line Instance Buffer", std::mem::size_of::<LineInstance>());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            screen_buffer,
            screen_bind_group,
            circle_pipeline,
            line_pipeline,
            circle_buffer,
            line_buffer,
            circles: Vec::new(),
            lines: Vec::new(),
            clear_color: wgpu::Color::TRANSPARENT,
            out_of_memory: false,
        })
    }

    /// Set once the GPU ran out of memory; the host should shut down.
    pub fn out_of_memory(&self) -> bool {
        self.out_of_memory
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.circle_buffer.upload(&self.device, &self.queue, &self.circles);
        self.line_buffer.upload(&self.device, &self.queue, &self.lines);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.screen_bind_group, &[]);

            if !self.circles.is_empty() {
                render_pass.set_pipeline(&self.circle_pipeline);
                render_pass.set_vertex_buffer(0, self.circle_buffer.buffer.slice(..));
                render_pass.draw(0..6, 0..self.circles.len() as u32);
            }

            if !self.lines.is_empty() {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.line_buffer.buffer.slice(..));
                render_pass.draw(0..6, 0..self.lines.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Surface for GpuSurface {
    fn size(&self) -> Bounds {
        Bounds::new(self.config.width as f32, self.config.height as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
            self.queue.write_buffer(
                &self.screen_buffer,
                0,
                bytemuck::bytes_of(&screen_uniforms(&self.config)),
            );
        }
    }

    fn clear(&mut self, color: Rgba) {
        self.circles.clear();
        self.lines.clear();
        self.clear_color = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        };
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.circles.push(CircleInstance {
            center: center.to_array(),
            radius,
            color: color.to_array(),
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.lines.push(LineInstance {
            from: from.to_array(),
            to: to.to_array(),
            color: color.to_array(),
            width,
        });
    }

    fn present(&mut self) {
        match self.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                self.out_of_memory = true;
            }
            Err(e) => warn!("render error: {:?}", e),
        }
    }
}

fn screen_uniforms(config: &wgpu::SurfaceConfiguration) -> ScreenUniforms {
    ScreenUniforms {
        size: [config.width as f32, config.height as f32],
        _pad: [0.0; 2],
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    (vs_entry, fs_entry): (&str, &str),
    instance_layout: wgpu::VertexBufferLayout<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers: &[instance_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
