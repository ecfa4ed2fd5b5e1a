use std::path::Path;

use log::{info, warn};

pub const PLACEHOLDER_SIZE: u32 = 256;

/// Decode an image file and upload it as an sRGB texture. A file that is
/// missing or fails to decode degrades to the procedural placeholder so a
/// bad asset never takes the demo down.
pub fn load_or_placeholder(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    label: &str,
) -> wgpu::TextureView {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (w, h) = rgba.dimensions();
            info!("loaded {} ({}x{}) from {}", label, w, h, path.display());
            upload_rgba8(device, queue, w, h, &rgba, label)
        }
        Err(e) => {
            warn!(
                "could not load {} from {}: {}; using placeholder",
                label,
                path.display(),
                e
            );
            placeholder(device, queue, label)
        }
    }
}

/// Vertical gradient stand-in texture, visibly distinct per label hash so a
/// missing background and a missing matcap don't look identical.
pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> wgpu::TextureView {
    let tint = (label.bytes().map(u32::from).sum::<u32>() % 3) as u8;
    let w = PLACEHOLDER_SIZE;
    let h = PLACEHOLDER_SIZE;

    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        let shade = (255 * y / h) as u8;
        for _ in 0..w {
            let mut px = [shade / 2 + 96, shade / 2 + 96, shade / 2 + 96, 255];
            px[tint as usize] = shade;
            data.extend_from_slice(&px);
        }
    }

    upload_rgba8(device, queue, w, h, &data, label)
}

/// Create an sRGB texture and upload RGBA8 pixels, padding rows to
/// COPY_BYTES_PER_ROW_ALIGNMENT when needed.
pub fn upload_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    w: u32,
    h: u32,
    data: &[u8],
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let row_bytes = 4 * w;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = row_bytes.div_ceil(align) * align;

    let staged;
    let (upload, bytes_per_row): (&[u8], u32) = if padded == row_bytes {
        (data, row_bytes)
    } else {
        let mut buf = vec![0u8; (padded * h) as usize];
        for y in 0..h {
            let src = &data[(y * row_bytes) as usize..((y + 1) * row_bytes) as usize];
            buf[(y * padded) as usize..(y * padded + row_bytes) as usize].copy_from_slice(src);
        }
        staged = buf;
        (&staged, padded)
    };

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        upload,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_row),
            rows_per_image: Some(h),
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Linear clamping sampler shared by backgrounds, matcaps, and the blend pass.
pub fn linear_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("linear sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
