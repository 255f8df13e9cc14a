use crate::{data_structures::texture::Texture, pipelines::basic::{SceneLayouts, mk_render_pipeline}};

/// Screen-filling backdrop drawn before the scene.
///
/// The quad comes from the vertex index, so there is no vertex buffer. Depth
/// is neither tested nor written; everything drawn afterwards covers it.
pub fn mk_sky_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    layouts: &SceneLayouts,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sky Pipeline Layout"),
        bind_group_layouts: &[Some(&layouts.sky)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Sky Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sky_shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        color_format,
        Some(wgpu::BlendState::REPLACE),
        Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: Some(false),
            depth_compare: Some(wgpu::CompareFunction::Always),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        &[],
        shader,
    )
}
