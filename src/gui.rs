//! Window and rendering for the live camera preview.
//!
//! winit requires its event loop to run on the main thread, so the
//! application logic is moved to a separate thread instead: [`run`] takes
//! over the main thread and invokes the application closure on a new one.
//! The application pushes frames into the window with [`show_frame`] and
//! polls [`quit_requested`] to find out when to stop.

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    process,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use anyhow::anyhow;
use once_cell::sync::OnceCell;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget},
    window::WindowBuilder,
};

use crate::{image::Image, resolution::Resolution};

const WINDOW_TITLE: &str = "Hand Sign Detection";

static PROXY: OnceCell<Mutex<EventLoopProxy<Msg>>> = OnceCell::new();
static QUIT: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
enum Msg {
    Frame { res: Resolution, data: Vec<u8> },
}

/// Takes over the main thread for the window event loop and runs `cb` on a
/// new thread.
///
/// The process exits when `cb` returns, with a non-zero exit code if it
/// returned an error or panicked.
pub fn run<F>(cb: F) -> !
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    let event_loop = EventLoopBuilder::with_user_event().build();
    PROXY
        .set(Mutex::new(event_loop.create_proxy()))
        .ok()
        .expect("GUI already initialized");

    std::thread::spawn(move || match catch_unwind(AssertUnwindSafe(cb)) {
        Ok(Ok(())) => process::exit(0),
        Ok(Err(e)) => {
            log::error!("{e:?}");
            process::exit(1);
        }
        // The panic hook has printed the message already; exit with 101 to
        // mimic libstd behavior.
        Err(_payload) => process::exit(101),
    });

    let gpu = Rc::new(pollster::block_on(Gpu::open()).expect("failed to open GPU"));
    let mut renderer: Option<Renderer> = None;
    event_loop.run(move |event, target, flow| {
        *flow = ControlFlow::Wait;
        match event {
            Event::UserEvent(Msg::Frame { res, data }) => {
                let renderer = renderer.get_or_insert_with(|| {
                    log::debug!("creating {res} preview window");
                    Renderer::new(gpu.clone(), target, res).expect("failed to create window")
                });
                renderer.update_texture(res, &data);
                renderer.window.request_redraw();
            }
            Event::RedrawRequested(_) => {
                if let Some(renderer) = &mut renderer {
                    renderer.redraw();
                }
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            virtual_keycode: Some(VirtualKeyCode::Q),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => QUIT.store(true, Ordering::Relaxed),
                _ => {}
            },
            _ => {}
        }
    });
}

/// Displays a frame in the preview window.
///
/// The window is opened when the first frame arrives, sized to fit it.
pub fn show_frame(image: &Image) {
    let msg = Msg::Frame {
        res: image.resolution(),
        data: image.data().to_vec(),
    };
    PROXY
        .get()
        .expect("GUI not initialized, call `gui::run` first")
        .lock()
        .unwrap()
        .send_event(msg)
        .expect("event loop closed");
}

/// Returns whether the user has asked to quit, by pressing `q` or closing
/// the window.
pub fn quit_requested() -> bool {
    QUIT.load(Ordering::Relaxed)
}

struct Gpu {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    async fn open() -> anyhow::Result<Self> {
        // The OpenGL backend panics spuriously, so don't enable it.
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&Default::default())
            .await
            .ok_or_else(|| anyhow!("no graphics adapter found"))?;
        log::debug!("using graphics adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }
}

struct Renderer {
    gpu: Rc<Gpu>,
    surface: wgpu::Surface,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    texture: wgpu::Texture,
    texture_size: wgpu::Extent3d,
    resolution: Resolution,
    // Surface must be destroyed before the window.
    window: winit::window::Window,
}

impl Renderer {
    fn new(
        gpu: Rc<Gpu>,
        target: &EventLoopWindowTarget<Msg>,
        resolution: Resolution,
    ) -> anyhow::Result<Self> {
        let window = WindowBuilder::new()
            .with_resizable(false)
            .with_inner_size(PhysicalSize::new(resolution.width(), resolution.height()))
            .with_title(WINDOW_TITLE)
            .build(target)?;
        let surface = unsafe { gpu.instance.create_surface(&window)? };
        let surface_format = *surface
            .get_capabilities(&gpu.adapter)
            .formats
            .first()
            .ok_or_else(|| anyhow!("adapter cannot render to window surface"))?;

        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("fullscreen texture shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("gui/shader.wgsl").into()),
            });

        let bind_group_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: None,
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
                    ],
                });

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("textured_quad"),
                layout: Some(&gpu.device.create_pipeline_layout(
                    &wgpu::PipelineLayoutDescriptor {
                        label: None,
                        bind_group_layouts: &[&bind_group_layout],
                        push_constant_ranges: &[],
                    },
                )),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vert",
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "frag",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        write_mask: wgpu::ColorWrites::ALL,
                        blend: None,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: Default::default(),
                multiview: None,
            });

        let (texture, texture_size) = create_texture(&gpu.device, resolution);
        let bind_group = create_bind_group(&gpu.device, &bind_group_layout, &texture);

        let mut this = Self {
            gpu,
            surface,
            pipeline,
            bind_group_layout,
            bind_group,
            texture,
            texture_size,
            resolution,
            window,
        };
        this.configure_surface();
        Ok(this)
    }

    fn update_texture(&mut self, res: Resolution, data: &[u8]) {
        assert_eq!(res.num_pixels() * 4, data.len() as u64);

        let size = wgpu::Extent3d {
            width: res.width(),
            height: res.height(),
            depth_or_array_layers: 1,
        };
        if size != self.texture_size {
            let (texture, texture_size) = create_texture(&self.gpu.device, res);
            self.texture = texture;
            self.texture_size = texture_size;
            self.bind_group =
                create_bind_group(&self.gpu.device, &self.bind_group_layout, &self.texture);
        }

        self.gpu.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::default(),
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: None,
            },
            size,
        );
    }

    fn redraw(&mut self) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err @ (wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost)) => {
                log::debug!("surface error: {err}");
                self.configure_surface();
                self.surface
                    .get_current_texture()
                    .expect("failed to acquire frame after reconfiguring surface")
            }
            Err(e) => panic!("failed to acquire frame: {e}"),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }

        self.gpu.queue.submit([encoder.finish()]);
        frame.present();
    }

    fn configure_surface(&mut self) {
        let surface_format = *self
            .surface
            .get_capabilities(&self.gpu.adapter)
            .formats
            .first()
            .expect("adapter cannot render to window surface");
        self.surface.configure(
            &self.gpu.device,
            &wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: surface_format,
                width: self.resolution.width(),
                height: self.resolution.height(),
                present_mode: wgpu::PresentMode::Fifo,
                alpha_mode: wgpu::CompositeAlphaMode::Auto,
                view_formats: Vec::new(),
            },
        );
    }
}

fn create_texture(device: &wgpu::Device, res: Resolution) -> (wgpu::Texture, wgpu::Extent3d) {
    let size = wgpu::Extent3d {
        width: res.width(),
        height: res.height(),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("frame"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    (texture, size)
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &wgpu::Texture,
) -> wgpu::BindGroup {
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: None,
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(
                    &texture.create_view(&Default::default()),
                ),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    })
}
