//! Desktop viewer: a winit window that drives a [`Scene`] every frame.
//!
//! Controls: left-drag orbits, right-drag pans, the wheel zooms, `Space`
//! advances the phase, `R` resets, `P` pauses, digits `1`-`9` jump to a
//! phase and `Escape` closes the window.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::error::ViewerError;
use crate::gpu::SceneRenderer;
use crate::input::{MouseButton, Pointer};
use crate::phase::Phase;
use crate::scene::Scene;
use crate::time::Time;

pub struct App {
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    scene: Option<Scene>,
    time: Time,
    pointer: Pointer,
    shown_phase: Option<Phase>,
    error: Option<ViewerError>,
}

impl App {
    pub fn new(scene: Scene) -> Self {
        Self {
            window: None,
            renderer: None,
            scene: Some(scene),
            time: Time::new(),
            pointer: Pointer::default(),
            shown_phase: None,
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scene) = self.scene.take() {
            let overlay = scene.unmount();
            tracing::debug!(?overlay, "final overlay");
        }
        self.renderer = None;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        tracing::error!("{}", error);
        self.error = Some(error);
        self.shutdown(event_loop);
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        if let Key::Named(NamedKey::Escape) = event.logical_key {
            self.shutdown(event_loop);
            return;
        }
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        match &event.logical_key {
            Key::Named(NamedKey::Space) => {
                scene.advance();
            }
            Key::Character(c) => match c.as_str() {
                "r" | "R" => {
                    scene.reset();
                }
                "p" | "P" => self.time.toggle_pause(),
                digit => {
                    if let Ok(n @ 1..=9) = digit.parse::<u8>() {
                        scene.set_phase(Phase(n - 1));
                    }
                }
            },
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(scene), Some(renderer)) = (self.scene.as_mut(), self.renderer.as_mut()) else {
            return;
        };

        if self.pointer.held(MouseButton::Left) {
            let d = self.pointer.delta();
            scene.camera_mut().orbit(d.x, d.y);
        }
        if self.pointer.held(MouseButton::Right) {
            let d = self.pointer.delta();
            scene.camera_mut().pan(d.x, d.y);
        }
        if self.pointer.scroll_delta() != 0.0 {
            scene.camera_mut().zoom(self.pointer.scroll_delta());
        }

        self.time.update();
        scene.set_aspect(renderer.aspect());
        let report = scene.frame(&self.time, self.pointer.ndc());
        if let Some(change) = report.phase_change {
            tracing::debug!(from = change.from.0, to = change.to.0, "timed phase change");
        }
        if self.shown_phase != Some(scene.phase()) {
            self.shown_phase = Some(scene.phase());
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "{} - {}",
                    scene.config().name,
                    scene.overlay().phase_name
                ));
            }
        }
        self.pointer.begin_frame();

        match renderer.render(scene.render_list(), self.time.elapsed()) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => renderer.resize(winit::dpi::PhysicalSize {
                width: renderer.config.width,
                height: renderer.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory");
                self.shutdown(event_loop);
                return;
            }
            Err(e) => tracing::warn!("Render error: {:?}", e),
        }

        if self.time.fps() > 0.0 && self.time.frame() % 600 == 0 {
            tracing::debug!(fps = self.time.fps(), "frame rate");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let title = self
            .scene
            .as_ref()
            .map(|s| s.config().name.clone())
            .unwrap_or_default();
        let window_attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        let size = window.inner_size();
        self.pointer.set_window_size(size.width, size.height);

        match pollster::block_on(SceneRenderer::new(window.clone())) {
            Ok(renderer) => {
                self.window = Some(window.clone());
                self.renderer = Some(renderer);
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.pointer.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
