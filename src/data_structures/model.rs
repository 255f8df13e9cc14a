//! Meshes, materials and the model aggregate.
//!
//! A [`Model`] owns an ordered list of [`Submesh`]es. Each submesh is a run of
//! triangles that share one material and one (optional) texture. Submeshes are
//! only ever produced through a [`SubmeshBuilder`], which guarantees that none
//! of them is empty and that every one of them holds whole triangles.

use std::path::PathBuf;

use cgmath::Vector3;

use crate::resources::texture::TextureHandle;

/// A single vertex as it is laid out in a vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl ModelVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Phong shading coefficients of a named material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vector3::new(0.1, 0.1, 0.1),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(0.5, 0.5, 0.5),
            shininess: 32.0,
        }
    }
}

/// What a group of triangles is drawn with.
///
/// The material is a copy taken when the group was opened, so later edits to
/// a material table never leak into submeshes that were already built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialBinding {
    pub name: Option<String>,
    pub material: Material,
    pub texture: Option<TextureHandle>,
    pub texture_path: Option<PathBuf>,
}

impl MaterialBinding {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            ..Default::default()
        }
    }

    pub fn with_texture(mut self, texture: Option<TextureHandle>, path: Option<PathBuf>) -> Self {
        self.texture = texture;
        self.texture_path = path;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Submesh {
    vertices: Vec<ModelVertex>,
    binding: MaterialBinding,
}

impl Submesh {
    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn material(&self) -> &Material {
        &self.binding.material
    }

    pub fn material_name(&self) -> Option<&str> {
        self.binding.name.as_deref()
    }

    /// `None` is the "no texture" sentinel.
    pub fn texture(&self) -> Option<TextureHandle> {
        self.binding.texture
    }

    pub fn texture_path(&self) -> Option<&std::path::Path> {
        self.binding.texture_path.as_deref()
    }
}

/// Partitions a stream of triangles into submeshes.
///
/// Every call to [`bind`](Self::bind) closes the group being accumulated and
/// opens a new one, even when the same material is bound again. Groups that
/// never received a triangle are dropped instead of being emitted.
#[derive(Debug, Default)]
pub struct SubmeshBuilder {
    closed: Vec<Submesh>,
    pending: Vec<ModelVertex>,
    binding: MaterialBinding,
}

impl SubmeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binding(binding: MaterialBinding) -> Self {
        Self {
            binding,
            ..Default::default()
        }
    }

    pub fn bind(&mut self, binding: MaterialBinding) {
        self.flush();
        self.binding = binding;
    }

    pub fn push_triangle(&mut self, triangle: [ModelVertex; 3]) {
        self.pending.extend_from_slice(&triangle);
    }

    pub fn pending_vertices(&self) -> usize {
        self.pending.len()
    }

    pub fn finish(mut self) -> Vec<Submesh> {
        self.flush();
        self.closed
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.closed.push(Submesh {
            vertices: std::mem::take(&mut self.pending),
            binding: self.binding.clone(),
        });
    }
}

/// A loaded asset: one or more submeshes drawn in order.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub name: String,
    submeshes: Vec<Submesh>,
    vertex_count: usize,
}

impl Model {
    /// Returns `None` when there is nothing to draw.
    pub fn new(name: impl Into<String>, submeshes: Vec<Submesh>) -> Option<Self> {
        if submeshes.is_empty() {
            return None;
        }
        let vertex_count = submeshes.iter().map(Submesh::vertex_count).sum();
        Some(Self {
            name: name.into(),
            submeshes,
            vertex_count,
        })
    }

    /// Builds a model with a single material from a flat triangle list.
    ///
    /// Trailing vertices that do not complete a triangle are ignored.
    pub fn single(
        name: impl Into<String>,
        vertices: &[ModelVertex],
        binding: MaterialBinding,
    ) -> Option<Self> {
        let mut builder = SubmeshBuilder::with_binding(binding);
        for tri in vertices.chunks_exact(3) {
            builder.push_triangle([tri[0], tri[1], tri[2]]);
        }
        Self::new(name, builder.finish())
    }

    /// A square on the XZ plane facing +Y, centered on the origin.
    pub fn ground_plane(half_extent: f32, binding: MaterialBinding) -> Self {
        let e = half_extent;
        let up = [0.0, 1.0, 0.0];
        let corner = |x: f32, z: f32, u: f32, v: f32| ModelVertex {
            position: [x, 0.0, z],
            tex_coords: [u, v],
            normal: up,
        };
        let a = corner(-e, -e, 0.0, 0.0);
        let b = corner(e, -e, 1.0, 0.0);
        let c = corner(e, e, 1.0, 1.0);
        let d = corner(-e, e, 0.0, 1.0);
        let mut builder = SubmeshBuilder::with_binding(binding);
        builder.push_triangle([a, b, c]);
        builder.push_triangle([a, c, d]);
        Self {
            name: "ground".to_string(),
            vertex_count: 6,
            submeshes: builder.finish(),
        }
    }

    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}
