use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{additive_blend, grown_capacity, QuadVertex, QUAD_INDICES, QUAD_VERTICES};

/// Two position sets the vertex stage blends between.
///
/// Both slices are packed `xyz` triples. `version` must change whenever either
/// slice's contents change; the renderer re-uploads only then.
#[derive(Debug, Copy, Clone)]
pub struct PointCloud<'a> {
    pub current: &'a [f32],
    pub target: &'a [f32],
    pub version: u64,
}

impl PointCloud<'_> {
    pub fn len(&self) -> usize {
        self.current.len().min(self.target.len()) / 3
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-frame inputs to the point shader.
#[derive(Debug, Copy, Clone)]
pub struct PointUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    /// Seconds; drives noise drift and alpha flicker.
    pub time: f32,
    /// Base sprite size; 300 px per unit at depth 1.
    pub size: f32,
    pub noise_strength: f32,
    /// Blend factor from `current` (0) to `target` (1).
    pub morph: f32,
    pub expansion: f32,
    pub scale: f32,
    pub color: Color,
}

/// Instanced renderer for morphing point clouds.
///
/// Every particle is a screen-aligned quad with a soft circular falloff,
/// blended additively with no depth test.
#[derive(Default)]
pub struct PointRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    current_vbo: Option<wgpu::Buffer>,
    target_vbo: Option<wgpu::Buffer>,
    capacity: usize,

    uploaded: Option<(u64, usize)>,
}

impl PointRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        cloud: &PointCloud<'_>,
        uniforms: &PointUniforms,
    ) {
        let count = cloud.len();
        if count == 0 {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx);
        self.ensure_capacity(ctx, count);
        self.upload_positions(ctx, cloud, count);
        self.write_uniforms(ctx, uniforms);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };
        let Some(current_vbo) = self.current_vbo.as_ref() else { return };
        let Some(target_vbo) = self.target_vbo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("zen points pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, current_vbo.slice(..));
        rpass.set_vertex_buffer(2, target_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..count as u32);
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("zen points shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("zen points bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<PointsUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("zen points pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("zen points pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    QuadVertex::layout(),
                    position_layout(&CURRENT_ATTRS),
                    position_layout(&TARGET_ATTRS),
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
            multiview_mask: None,
            cache: None,
        });

        log::debug!("points pipeline built for {:?}", ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
        self.ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("zen points ubo"),
            size: std::mem::size_of::<PointsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("zen points bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.ubo = Some(ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("zen points quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("zen points quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn ensure_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.capacity && self.current_vbo.is_some() && self.target_vbo.is_some() {
            return;
        }

        let capacity = grown_capacity(required);
        let size = (capacity * POSITION_STRIDE) as u64;
        let make = |label: &'static str| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        self.current_vbo = Some(make("zen points current vbo"));
        self.target_vbo = Some(make("zen points target vbo"));
        self.capacity = capacity;
        // fresh buffers hold nothing
        self.uploaded = None;
        log::debug!("point buffers grown to {capacity}");
    }

    fn upload_positions(&mut self, ctx: &RenderCtx<'_>, cloud: &PointCloud<'_>, count: usize) {
        if self.uploaded == Some((cloud.version, count)) {
            return;
        }
        let (Some(current_vbo), Some(target_vbo)) = (&self.current_vbo, &self.target_vbo) else {
            return;
        };

        let floats = count * 3;
        ctx.queue
            .write_buffer(current_vbo, 0, bytemuck::cast_slice(&cloud.current[..floats]));
        ctx.queue
            .write_buffer(target_vbo, 0, bytemuck::cast_slice(&cloud.target[..floats]));
        self.uploaded = Some((cloud.version, count));
    }

    fn write_uniforms(&self, ctx: &RenderCtx<'_>, u: &PointUniforms) {
        let Some(ubo) = self.ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&PointsUniform::new(u, ctx)));
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

const POSITION_STRIDE: usize = std::mem::size_of::<[f32; 3]>();

const CURRENT_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const TARGET_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

fn position_layout(attrs: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: POSITION_STRIDE as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: attrs,
    }
}

/// Uniform block (176 bytes), mirrored by `Uniforms` in points.wgsl:
///
///  offset   0  view        mat4x4
///  offset  64  proj        mat4x4
///  offset 128  params      vec4  (time, size, noise_strength, morph)
///  offset 144  motion      vec4  (expansion, scale, viewport w, viewport h)
///  offset 160  color       vec4  (linear rgb, unused)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PointsUniform {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    params: [f32; 4],
    motion: [f32; 4],
    color: [f32; 4],
}

impl PointsUniform {
    fn new(u: &PointUniforms, ctx: &RenderCtx<'_>) -> Self {
        Self {
            view: u.view.to_cols_array_2d(),
            proj: u.projection.to_cols_array_2d(),
            params: [u.time, u.size, u.noise_strength, u.morph.clamp(0.0, 1.0)],
            motion: [
                u.expansion,
                u.scale,
                ctx.viewport.width.max(1.0),
                ctx.viewport.height.max(1.0),
            ],
            color: [u.color.r, u.color.g, u.color.b, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<PointsUniform>(), 176);
        assert_eq!(std::mem::size_of::<PointsUniform>() % 16, 0);
    }

    #[test]
    fn cloud_len_uses_shorter_buffer() {
        let current = [0.0f32; 9];
        let target = [0.0f32; 6];
        let cloud = PointCloud { current: &current, target: &target, version: 0 };
        assert_eq!(cloud.len(), 2);
        assert!(!cloud.is_empty());
    }
}
