//! GPU-side resources for loaded models.
//!
//! [`GpuContext`] owns a device and queue that do not need a window, which is
//! enough to create textures and vertex buffers. [`GpuTextureLoader`] plugs it
//! into the asset loaders and [`GpuModel`] mirrors a [`Model`] submesh by
//! submesh so a renderer can bind material and texture per draw. Once a
//! window exists, [`WindowSurface`] gives the same device something to
//! present to.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::{
        model::{Material, Model},
        texture::Texture,
    },
    resources::texture::{TextureHandle, TextureLoader},
};

#[derive(Debug, Clone)]
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Picks an adapter without asking for a surface, so assets can be
    /// uploaded before any window exists.
    pub async fn new_headless() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using GPU adapter {:?}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("abduction-scene device"),
                ..Default::default()
            })
            .await?;
        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn blocking_headless() -> anyhow::Result<Self> {
        futures::executor::block_on(Self::new_headless())
    }
}

/// Decodes and uploads textures, handing out indices into its own list.
#[derive(Debug)]
pub struct GpuTextureLoader {
    ctx: GpuContext,
    textures: Vec<Texture>,
    by_path: HashMap<PathBuf, TextureHandle>,
}

impl GpuTextureLoader {
    pub fn new(ctx: GpuContext) -> Self {
        Self {
            ctx,
            textures: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureLoader for GpuTextureLoader {
    fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureHandle> {
        if let Some(handle) = self.by_path.get(path) {
            return Ok(*handle);
        }
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let texture = Texture::from_bytes(
            &self.ctx.device,
            &self.ctx.queue,
            &bytes,
            &path.display().to_string(),
        )?;
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(texture);
        self.by_path.insert(path.to_path_buf(), handle);
        Ok(handle)
    }
}

#[derive(Debug)]
pub struct GpuSubmesh {
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
    pub material: Material,
    pub texture: Option<TextureHandle>,
}

#[derive(Debug)]
pub struct GpuModel {
    pub name: String,
    pub submeshes: Vec<GpuSubmesh>,
}

impl GpuModel {
    /// One vertex buffer per submesh, in the model's draw order.
    pub fn upload(device: &wgpu::Device, model: &Model) -> Self {
        let submeshes = model
            .submeshes()
            .iter()
            .enumerate()
            .map(|(idx, submesh)| {
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} submesh {} Vertex Buffer", model.name, idx)),
                    contents: bytemuck::cast_slice(submesh.vertices()),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                GpuSubmesh {
                    vertex_buffer,
                    num_vertices: submesh.vertex_count() as u32,
                    material: *submesh.material(),
                    texture: submesh.texture(),
                }
            })
            .collect();
        Self {
            name: model.name.clone(),
            submeshes,
        }
    }
}

/// A window's swap chain together with the depth buffer sized to it.
#[derive(Debug)]
pub struct WindowSurface {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub depth_texture: Texture,
}

impl WindowSurface {
    pub fn new(ctx: &GpuContext, window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let surface = ctx.instance.create_surface(window)?;
        if !ctx.adapter.is_surface_supported(&surface) {
            anyhow::bail!(
                "adapter {} cannot present to this window",
                ctx.adapter.get_info().name
            );
        }

        let surface_caps = surface.get_capabilities(&ctx.adapter);
        // The shaders output linear colour and rely on an sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("the window surface reports no texture formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctx.device, &config);
        let depth_texture =
            Texture::create_depth_texture(&ctx.device, [config.width, config.height], "depth_texture");
        log::info!(
            "Presenting {}x{} in {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            surface,
            config,
            depth_texture,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Zero-sized windows (minimised) keep the previous configuration.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure(device);
    }

    pub fn reconfigure(&mut self, device: &wgpu::Device) {
        self.surface.configure(device, &self.config);
        self.depth_texture = Texture::create_depth_texture(
            device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
    }
}
