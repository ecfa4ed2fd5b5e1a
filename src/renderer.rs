use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::info;
use winit::window::Window;

use crate::blend::BlendPass;
use crate::camera::Camera;
use crate::compositor::Compositor;
use crate::scene;
use crate::scroll::FrameState;

/// Manual blend control for shader inspection. Only the blend weight is
/// overridden; scene pair selection still follows scroll.
pub struct DebugPanel {
    pub override_progress: bool,
    pub progress: f32,
}

/// Owns the GPU, the offscreen compositor, the cross-fade presenter, and the
/// egui overlay. One instance per window; nothing here is global, so several
/// widgets could coexist.
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    camera: Camera,
    compositor: Compositor,
    blend: BlendPass,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    debug: DebugPanel,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &surface_config);

        let camera = Camera::new(size.width, size.height);

        let defs = scene::default_scenes();
        let compositor = Compositor::new(&device, &queue, &defs, size.width, size.height);
        let blend = BlendPass::new(&device, surface_config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        info!(
            "renderer initialized: {} scenes, {}x{}",
            compositor.scene_count(),
            size.width,
            size.height
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            camera,
            compositor,
            blend,
            egui_renderer,
            egui_state,
            egui_ctx,
            debug: DebugPanel {
                override_progress: false,
                progress: 0.0,
            },
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("failed to find appropriate adapter: {:?}", e))
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| anyhow!("failed to create device: {:?}", e))
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Back-buffer, camera aspect, and every offscreen target change size in
    /// the same call so no frame can mix dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.camera.set_viewport(width, height);
        self.compositor.resize(&self.device, width, height);
    }

    /// Reconfigure the surface at the current size after Lost/Outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Render one frame: both active tableaux offscreen, then the blended
    /// quad, then the egui overlay.
    pub fn render(
        &mut self,
        window: &Window,
        frame: FrameState,
        rotation: f32,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.compositor
            .update_scene(&self.queue, frame.current, &self.camera, rotation);
        self.compositor
            .update_scene(&self.queue, frame.next, &self.camera, rotation);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        // Both offscreen passes are recorded before the blend pass reads
        // their targets.
        self.compositor.render_scene(&mut encoder, frame.current);
        self.compositor.render_scene(&mut encoder, frame.next);

        let progress = if self.debug.override_progress {
            self.debug.progress
        } else {
            frame.progress
        };

        self.blend.draw(
            &self.device,
            &self.queue,
            &mut encoder,
            &view,
            self.compositor.target_view(frame.current),
            self.compositor.target_view(frame.next),
            progress,
        );

        // egui pass - debug overlay
        let raw_input = self.egui_state.take_egui_input(window);
        let debug = &mut self.debug;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Blend")
                .resizable(false)
                .default_pos(egui::pos2(10.0, 10.0))
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0} FPS", fps))
                            .size(18.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    ui.label(
                        egui::RichText::new(format!(
                            "scene {} -> {}  progress {:.2}",
                            frame.current, frame.next, frame.progress
                        ))
                        .size(12.0)
                        .color(egui::Color32::GRAY),
                    );
                    ui.separator();
                    ui.checkbox(&mut debug.override_progress, "manual progress");
                    ui.add_enabled(
                        debug.override_progress,
                        egui::Slider::new(&mut debug.progress, 0.0..=1.0).text("progress"),
                    );
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: The render pass lifetime is actually tied to the encoder,
            // but egui-wgpu requires 'static. This is safe because we drop the
            // render pass before using the encoder again.
            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.egui_renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Give egui first refusal on window events.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }
}
