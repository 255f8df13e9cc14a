//! The boundary between the scene and whatever draws it.
//!
//! Each frame the scene hands a [`Frame`] to a [`Renderer`]: an ordered list
//! of models with their world transforms, the active light, the camera
//! matrices and the sky texture. Binding textures and materials per submesh
//! and issuing the draw calls is entirely up to the renderer.
//!
//! [`GpuRenderer`] draws with wgpu into the window's surface. [`FrameLog`] is
//! used when no adapter is available: it draws nothing and traces what it
//! was asked to draw.

use std::{collections::HashMap, iter, sync::Arc};

use cgmath::{Matrix, Matrix4, Point3, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::OPENGL_TO_WGPU_MATRIX,
    context::{GpuContext, GpuModel, GpuTextureLoader, WindowSurface},
    data_structures::{
        model::{Material, Model},
        texture::Texture,
    },
    pipelines::{
        basic::{SceneLayouts, mk_scene_pipeline},
        sky::mk_sky_pipeline,
    },
    resources::texture::{TextureHandle, TextureLoader, TextureRegistry},
    scene::Body,
};

/// One model to draw and where to draw it.
#[derive(Clone, Debug)]
pub struct DrawItem<'a> {
    pub body: Body,
    pub model: &'a Model,
    pub transform: Matrix4<f32>,
}

/// Spot light plus the Phong coefficients the scene shades with while it is active.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneLight {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub items: Vec<DrawItem<'a>>,
    pub light: SceneLight,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub eye: Point3<f32>,
    /// Backdrop drawn behind everything, if one loaded.
    pub sky: Option<TextureHandle>,
}

pub trait Renderer {
    /// Loader used for every texture the scene's assets reference.
    fn texture_loader(&mut self) -> &mut dyn TextureLoader;

    /// Called once the window exists.
    fn attach(&mut self, _window: Arc<Window>) -> anyhow::Result<()> {
        Ok(())
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct FrameLog {
    textures: TextureRegistry,
    frames: u64,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for FrameLog {
    fn texture_loader(&mut self) -> &mut dyn TextureLoader {
        &mut self.textures
    }

    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        self.frames += 1;
        for item in &frame.items {
            let origin = item.transform.w;
            log::trace!(
                "frame {}: {:?} `{}` ({} submeshes) at ({:.2}, {:.2}, {:.2})",
                self.frames,
                item.body,
                item.model.name,
                item.model.submeshes().len(),
                origin.x,
                origin.y,
                origin.z
            );
        }
        Ok(())
    }
}

fn vec4(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Camera and light, shared by every draw of a frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light_position: [f32; 4],
    light_direction: [f32; 4],
    light_color: [f32; 4],
    light_ambient: [f32; 4],
    light_diffuse: [f32; 4],
    light_specular: [f32; 4],
}

impl GlobalsUniform {
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let light = &frame.light;
        Self {
            view_proj: (OPENGL_TO_WGPU_MATRIX * frame.projection * frame.view).into(),
            eye: [frame.eye.x, frame.eye.y, frame.eye.z, 1.0],
            light_position: vec4(light.position, 1.0),
            light_direction: vec4(light.direction, 0.0),
            light_color: vec4(light.color, 1.0),
            light_ambient: vec4(light.ambient, 0.0),
            light_diffuse: vec4(light.diffuse, 0.0),
            light_specular: vec4(light.specular, 0.0),
        }
    }
}

/// Phong coefficients of one submesh; the shininess rides in `specular[3]`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        Self {
            ambient: vec4(material.ambient, 1.0),
            diffuse: vec4(material.diffuse, 1.0),
            specular: vec4(material.specular, material.shininess),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn new(transform: Matrix4<f32>) -> Self {
        // Inverse transpose keeps normals perpendicular under scaling.
        let normal = transform
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(transform);
        Self {
            model: transform.into(),
            normal: normal.into(),
        }
    }
}

/// What one body needs on the GPU: its vertex buffers, a material bind
/// group per submesh and a transform buffer rewritten every frame.
#[derive(Debug)]
struct BodyResources {
    name: String,
    vertex_count: usize,
    model: GpuModel,
    materials: Vec<wgpu::BindGroup>,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
}

impl BodyResources {
    fn matches(&self, model: &Model) -> bool {
        self.name == model.name && self.vertex_count == model.vertex_count()
    }
}

#[derive(Debug)]
struct SurfaceTarget {
    surface: WindowSurface,
    scene_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
}

/// Draws frames through wgpu.
///
/// Models are uploaded the first time a body shows up in a frame and again
/// whenever the body's model is replaced. Until a window is attached every
/// frame is skipped.
#[derive(Debug)]
pub struct GpuRenderer {
    textures: GpuTextureLoader,
    layouts: SceneLayouts,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    fallback_texture: Texture,
    bodies: HashMap<Body, BodyResources>,
    sky: Option<(TextureHandle, wgpu::BindGroup)>,
    target: Option<SurfaceTarget>,
}

impl GpuRenderer {
    pub const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
        r: 0.02,
        g: 0.02,
        b: 0.05,
        a: 1.0,
    };

    pub fn new(ctx: GpuContext) -> Self {
        let layouts = SceneLayouts::new(&ctx.device);
        let globals_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::cast_slice(&[GlobalsUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.globals,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
            label: Some("globals_bind_group"),
        });
        let fallback_texture =
            Texture::solid(&ctx.device, &ctx.queue, [255, 255, 255, 255], "untextured");

        Self {
            textures: GpuTextureLoader::new(ctx),
            layouts,
            globals_buffer,
            globals_bind_group,
            fallback_texture,
            bodies: HashMap::new(),
            sky: None,
            target: None,
        }
    }

    pub fn context(&self) -> &GpuContext {
        self.textures.context()
    }

    /// Number of bodies currently resident on the GPU.
    pub fn uploaded_bodies(&self) -> usize {
        self.bodies.len()
    }

    fn texture_or_fallback(&self, handle: Option<TextureHandle>) -> &Texture {
        handle
            .and_then(|handle| self.textures.get(handle))
            .unwrap_or(&self.fallback_texture)
    }

    fn texture_bind_group(
        &self,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
        material: Option<&wgpu::Buffer>,
        label: &str,
    ) -> wgpu::BindGroup {
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ];
        if let Some(buffer) = material {
            entries.push(wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer.as_entire_binding(),
            });
        }
        self.context()
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                layout,
                entries: &entries,
                label: Some(label),
            })
    }

    fn upload_body(&self, model: &Model) -> BodyResources {
        let device = &self.context().device;
        let gpu = GpuModel::upload(device, model);
        let materials = gpu
            .submeshes
            .iter()
            .enumerate()
            .map(|(idx, submesh)| {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} submesh {} Material Buffer", model.name, idx)),
                    contents: bytemuck::cast_slice(&[MaterialUniform::from(&submesh.material)]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                self.texture_bind_group(
                    &self.layouts.material,
                    self.texture_or_fallback(submesh.texture),
                    Some(&buffer),
                    "material_bind_group",
                )
            })
            .collect();
        let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Object Buffer", model.name)),
            contents: bytemuck::cast_slice(&[ObjectUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_buffer.as_entire_binding(),
            }],
            label: Some("object_bind_group"),
        });
        log::debug!(
            "Uploaded `{}` ({} submeshes)",
            model.name,
            gpu.submeshes.len()
        );

        BodyResources {
            name: model.name.clone(),
            vertex_count: model.vertex_count(),
            model: gpu,
            materials,
            object_buffer,
            object_bind_group,
        }
    }

    /// Uploads new or replaced models and writes every uniform the frame uses.
    pub fn prepare(&mut self, frame: &Frame<'_>) {
        for item in &frame.items {
            let stale = self
                .bodies
                .get(&item.body)
                .is_none_or(|resources| !resources.matches(item.model));
            if stale {
                let resources = self.upload_body(item.model);
                self.bodies.insert(item.body, resources);
            }
        }

        let current_sky = self.sky.as_ref().map(|(handle, _)| *handle);
        if frame.sky != current_sky {
            self.sky = frame.sky.map(|handle| {
                let bind_group = self.texture_bind_group(
                    &self.layouts.sky,
                    self.texture_or_fallback(Some(handle)),
                    None,
                    "sky_bind_group",
                );
                (handle, bind_group)
            });
        }

        let queue = &self.textures.context().queue;
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[GlobalsUniform::from_frame(frame)]),
        );
        for item in &frame.items {
            if let Some(resources) = self.bodies.get(&item.body) {
                queue.write_buffer(
                    &resources.object_buffer,
                    0,
                    bytemuck::cast_slice(&[ObjectUniform::new(item.transform)]),
                );
            }
        }
    }

    fn draw(&self, frame: &Frame<'_>, target: &SurfaceTarget, view: &wgpu::TextureView) {
        let ctx = self.context();
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Self::CLEAR_COLOUR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.surface.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if let Some((_, sky)) = &self.sky {
                render_pass.set_pipeline(&target.sky_pipeline);
                render_pass.set_bind_group(0, sky, &[]);
                render_pass.draw(0..6, 0..1);
            }

            render_pass.set_pipeline(&target.scene_pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for item in &frame.items {
                let Some(resources) = self.bodies.get(&item.body) else {
                    continue;
                };
                render_pass.set_bind_group(2, &resources.object_bind_group, &[]);
                for (submesh, material) in resources.model.submeshes.iter().zip(&resources.materials) {
                    render_pass.set_bind_group(1, material, &[]);
                    render_pass.set_vertex_buffer(0, submesh.vertex_buffer.slice(..));
                    render_pass.draw(0..submesh.num_vertices, 0..1);
                }
            }
        }
        ctx.queue.submit(iter::once(encoder.finish()));
    }
}

impl Renderer for GpuRenderer {
    fn texture_loader(&mut self) -> &mut dyn TextureLoader {
        &mut self.textures
    }

    fn attach(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let surface = WindowSurface::new(self.context(), window)?;
        let device = &self.context().device;
        let scene_pipeline = mk_scene_pipeline(device, surface.format(), &self.layouts);
        let sky_pipeline = mk_sky_pipeline(device, surface.format(), &self.layouts);
        self.target = Some(SurfaceTarget {
            surface,
            scene_pipeline,
            sky_pipeline,
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let device = self.textures.context().device.clone();
        if let Some(target) = self.target.as_mut() {
            target.surface.resize(&device, width, height);
        }
    }

    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        if self.target.is_none() {
            return Ok(());
        }
        self.prepare(frame);

        let device = self.textures.context().device.clone();
        let Some(target) = self.target.as_mut() else {
            return Ok(());
        };
        let (output, suboptimal) = match target.surface.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => (output, false),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => (output, true),
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                log::warn!("Surface is out of date; reconfiguring");
                target.surface.reconfigure(&device);
                return Ok(());
            }
            _ => anyhow::bail!("the window surface refused to hand out a frame"),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        if let Some(target) = &self.target {
            self.draw(frame, target, &view);
        }
        output.present();

        if suboptimal {
            if let Some(target) = self.target.as_mut() {
                target.surface.reconfigure(&device);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 176);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
    }

    #[test]
    fn shininess_rides_with_specular() {
        let material = Material {
            shininess: 12.0,
            ..Default::default()
        };
        let uniform = MaterialUniform::from(&material);
        assert_eq!(uniform.specular, [0.5, 0.5, 0.5, 12.0]);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let uniform = ObjectUniform::new(Matrix4::from_nonuniform_scale(2.0, 1.0, 4.0));
        assert_eq!(uniform.normal[0][0], 0.5);
        assert_eq!(uniform.normal[1][1], 1.0);
        assert_eq!(uniform.normal[2][2], 0.25);
    }
}
