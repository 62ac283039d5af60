//! Presents the explorer's frame buffer in a window.

use std::num::NonZeroU32;

use anyhow::Context;
use log::debug;
use tiny_mandelbrot::pixel::Rgba;
use winit::window::Window;

use crate::{
    screen::{Screen, Size},
    uniform::Uniform,
};

trait CommandEncoderExt {
    fn with_render_pass<'pass, A>(
        &'pass mut self,
        descriptor: &wgpu::RenderPassDescriptor<'pass, '_>,
        function: impl FnOnce(&mut wgpu::RenderPass<'pass>) -> A,
    ) -> A;
}

impl CommandEncoderExt for wgpu::CommandEncoder {
    fn with_render_pass<'pass, A>(
        &'pass mut self,
        descriptor: &wgpu::RenderPassDescriptor<'pass, '_>,
        function: impl FnOnce(&mut wgpu::RenderPass<'pass>) -> A,
    ) -> A {
        let mut render_pass = self.begin_render_pass(descriptor);
        function(&mut render_pass)
    }
}

fn command_buffer(
    device: &wgpu::Device,
    descriptor: &wgpu::CommandEncoderDescriptor,
    function: impl FnOnce(&mut wgpu::CommandEncoder),
) -> wgpu::CommandBuffer {
    let mut command_encoder = device.create_command_encoder(descriptor);
    function(&mut command_encoder);
    command_encoder.finish()
}

/// Texture format for frame pixels shown on a `surface` format surface.
///
/// Frame colours are sRGB-encoded bytes. An sRGB surface re-encodes whatever
/// the shader writes, so the texture must decode on sampling to match.
fn frame_format(surface: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface.describe().srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

/// A window surface showing a fixed-size RGBA frame, scaled to fit and
/// letterboxed.
pub struct Display {
    surface: wgpu::Surface,
    surface_configuration: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    render_pipeline: wgpu::RenderPipeline,
    render_bind_group: wgpu::BindGroup,
    frame_texture: wgpu::Texture,
    frame_size: Size,
    screen: Uniform<Screen>,
}

impl Display {
    pub fn new(window: &Window, frame_size: Size) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::Backends::all());

        let size = Size::from(window.inner_size());
        let surface = unsafe { instance.create_surface(window) };

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: Default::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .context("no suitable graphics adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
            },
            None,
        ))
        .context("failed to open graphics device")?;

        let format = surface
            .get_supported_formats(&adapter)
            .first()
            .copied()
            .context("surface is incompatible with the adapter")?;
        let surface_configuration = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
        };
        if !size.is_empty() {
            surface.configure(&device, &surface_configuration);
        }

        let render_shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("render-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let render_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("render-bind-group-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("render-pipeline-layout"),
                bind_group_layouts: &[&render_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render-pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_shader_module,
                entry_point: "vertex_main",
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &render_shader_module,
                entry_point: "fragment_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_configuration.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        let frame_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("frame-texture"),
            size: wgpu::Extent3d {
                width: frame_size.width,
                height: frame_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: frame_format(format),
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
        });
        let frame_texture_view = frame_texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Nearest-texel filtering.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor::default());

        let screen = Uniform::new(
            &device,
            "screen-buffer",
            Screen {
                window: size,
                frame: frame_size,
            },
        );

        let render_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("render-bind-group"),
            layout: &render_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&frame_texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: screen.binding_resource(),
                },
            ],
        });

        Ok(Self {
            surface,
            surface_configuration,
            device,
            queue,
            render_pipeline,
            render_bind_group,
            frame_texture,
            frame_size,
            screen,
        })
    }

    pub fn resize(&mut self, size: Size) {
        debug!("resizing to {:?}", size);

        if size.is_empty() {
            return;
        }
        self.surface_configuration.width = size.width;
        self.surface_configuration.height = size.height;
        self.surface.configure(&self.device, &self.surface_configuration);

        self.screen.write(
            &self.queue,
            Screen {
                window: size,
                frame: self.frame_size,
            },
        );
    }

    /// Reconfigures the surface after it was lost or went out of date.
    pub fn reconfigure(&mut self) {
        let size = Size::new(self.surface_configuration.width, self.surface_configuration.height);
        self.resize(size);
    }

    /// Uploads `frame` and draws it to the window.
    pub fn present(&mut self, frame: &[Rgba]) -> Result<(), wgpu::SurfaceError> {
        let window_size = Size::new(
            self.surface_configuration.width,
            self.surface_configuration.height,
        );
        if self.frame_size.is_empty() || window_size.is_empty() {
            return Ok(());
        }

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(frame),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: NonZeroU32::new(4 * self.frame_size.width),
                rows_per_image: NonZeroU32::new(self.frame_size.height),
            },
            wgpu::Extent3d {
                width: self.frame_size.width,
                height: self.frame_size.height,
                depth_or_array_layers: 1,
            },
        );

        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let command_buffer = command_buffer(
            &self.device,
            &wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            },
            |command_encoder| {
                command_encoder.push_debug_group("render-pass");
                command_encoder.with_render_pass(
                    &wgpu::RenderPassDescriptor {
                        label: Some("render-pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &surface_texture_view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: true,
                            },
                        })],
                        depth_stencil_attachment: None,
                    },
                    |render_pass| {
                        render_pass.set_pipeline(&self.render_pipeline);
                        render_pass.set_bind_group(0, &self.render_bind_group, &[]);
                        render_pass.draw(0..4, 0..1);
                    },
                );
                command_encoder.pop_debug_group();
            },
        );

        self.queue.submit([command_buffer]);
        surface_texture.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_format_follows_the_surface_encoding() {
        assert_eq!(
            frame_format(wgpu::TextureFormat::Bgra8UnormSrgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            frame_format(wgpu::TextureFormat::Rgba8UnormSrgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            frame_format(wgpu::TextureFormat::Bgra8Unorm),
            wgpu::TextureFormat::Rgba8Unorm
        );
    }
}
