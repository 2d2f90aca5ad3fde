use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::Configuration;
use crate::error::Error;
use crate::events::{ImageDecoded, ViewerCommand, ViewerEvent};
use crate::processing::DitherStrategy;
use crate::processing::color::InkColor;
use crate::processing::ordered::Viewport;
use crate::render::GpuBackend;
use crate::session::{LoadOutcome, RenderSession};
use crate::tasks::loader;

/// Key bindings of the poster window.
pub fn command_for_key(key: KeyCode) -> Option<ViewerCommand> {
    match key {
        KeyCode::KeyR => Some(ViewerCommand::Randomize),
        KeyCode::KeyC => Some(ViewerCommand::NextInk),
        KeyCode::Backspace | KeyCode::Delete => Some(ViewerCommand::Clear),
        KeyCode::KeyO => Some(ViewerCommand::ToggleStrategy),
        KeyCode::Escape | KeyCode::KeyQ => Some(ViewerCommand::Quit),
        _ => None,
    }
}

struct ViewerApp {
    cfg: Configuration,
    handle: Handle,
    proxy: EventLoopProxy<ViewerEvent>,
    cancel: CancellationToken,
    window: Option<Arc<Window>>,
    session: Option<RenderSession<GpuBackend>>,
    strategy: DitherStrategy,
    palette_index: usize,
    current_path: Option<PathBuf>,
    initial_path: Option<PathBuf>,
}

impl ViewerApp {
    fn new(
        cfg: Configuration,
        image: Option<PathBuf>,
        handle: Handle,
        proxy: EventLoopProxy<ViewerEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let strategy = cfg.strategy;
        let palette_index = cfg
            .palette
            .iter()
            .position(|ink| *ink == cfg.ink_color)
            .unwrap_or(0);
        Self {
            cfg,
            handle,
            proxy,
            cancel,
            window: None,
            session: None,
            strategy,
            palette_index,
            current_path: None,
            initial_path: image,
        }
    }

    fn ink(&self) -> InkColor {
        self.session
            .as_ref()
            .map(|session| session.dither_config().ink())
            .unwrap_or(self.cfg.ink_color)
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(window) = self.window.as_ref() {
            return Some(window.clone());
        }

        let size = winit::dpi::PhysicalSize::new(self.cfg.viewport.width, self.cfg.viewport.height);
        let attrs = WindowAttributes::default()
            .with_title("Poster Dither")
            .with_inner_size(size);
        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Some(window)
            }
            Err(err) => {
                error!(error = %err, "failed to create poster window");
                None
            }
        }
    }

    /// Builds a session for the current strategy and binds it to `window`.
    fn start_session(&mut self, window: Arc<Window>) -> Result<(), Error> {
        let mut cfg = self.cfg.clone();
        cfg.strategy = self.strategy;
        let mut session = RenderSession::new(&cfg);
        let size = window.inner_size();
        session.resize(Viewport::new(size.width, size.height))?;
        session.init(|_| GpuBackend::for_window(window))?;
        session.render()?;
        self.session = Some(session);
        Ok(())
    }

    fn start_load(&mut self, path: PathBuf) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let ticket = match session.begin_load() {
            Ok(ticket) => ticket,
            Err(err) => {
                warn!(error = %err, path = %path.display(), "cannot start load");
                return;
            }
        };
        info!(path = %path.display(), epoch = ticket.epoch(), "loading image");

        let proxy = self.proxy.clone();
        let cancel = self.cancel.clone();
        self.handle.spawn(async move {
            select! {
                _ = cancel.cancelled() => {}
                result = loader::load_file(path.clone()) => {
                    let _ = proxy.send_event(ViewerEvent::Decoded(ImageDecoded {
                        ticket,
                        path,
                        result,
                    }));
                }
            }
        });
    }

    fn finish_load(&mut self, decoded: ImageDecoded) {
        let ink = self.ink();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let ImageDecoded {
            ticket,
            path,
            result,
        } = decoded;
        match session.finish_load(ticket, result, ink) {
            Ok(LoadOutcome::Mounted) => {
                info!(path = %path.display(), "image displayed");
                self.current_path = Some(path);
            }
            Ok(LoadOutcome::Superseded) => {
                debug!(path = %path.display(), "load superseded");
            }
            Err(err) if err.is_decode() => {
                warn!(error = %err, path = %path.display(), "could not decode image");
            }
            Err(err) => {
                error!(error = %err, path = %path.display(), "failed to display image");
            }
        }
    }

    fn handle_command(&mut self, event_loop: &ActiveEventLoop, command: ViewerCommand) {
        debug!(?command, "viewer command");
        let result = match command {
            ViewerCommand::Quit => {
                event_loop.exit();
                Ok(())
            }
            ViewerCommand::Open(path) => {
                self.start_load(path);
                Ok(())
            }
            ViewerCommand::Randomize => {
                let ink = self.ink();
                self.with_session(|session| session.randomize(ink))
            }
            ViewerCommand::NextInk => {
                self.palette_index = (self.palette_index + 1) % self.cfg.palette.len().max(1);
                match self.cfg.palette.get(self.palette_index).copied() {
                    Some(ink) => self.with_session(|session| session.recolor(ink)),
                    None => Ok(()),
                }
            }
            ViewerCommand::Clear => {
                self.current_path = None;
                self.with_session(RenderSession::clear)
            }
            ViewerCommand::ToggleStrategy => self.toggle_strategy(),
        };
        if let Err(err) = result {
            warn!(error = %err, "viewer command failed");
        }
    }

    fn with_session<F>(&mut self, op: F) -> Result<(), Error>
    where
        F: FnOnce(&mut RenderSession<GpuBackend>) -> Result<(), Error>,
    {
        match self.session.as_mut() {
            Some(session) => op(session),
            None => Ok(()),
        }
    }

    /// Replaces the session with one using the other strategy and reloads
    /// the image that was on screen.
    fn toggle_strategy(&mut self) -> Result<(), Error> {
        let Some(window) = self.window.clone() else {
            return Ok(());
        };
        let ink = self.ink();
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
        self.strategy = self.strategy.toggled();
        self.cfg.ink_color = ink;
        info!(strategy = %self.strategy, "dither strategy switched");
        self.start_session(window)?;
        if let Some(path) = self.current_path.take() {
            self.start_load(path);
        }
        Ok(())
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }

        let Some(window) = self.ensure_window(event_loop) else {
            event_loop.exit();
            return;
        };

        if self.session.is_none() {
            if let Err(err) = self.start_session(window) {
                error!(error = %err, "failed to initialize render session");
                event_loop.exit();
                return;
            }
            if let Some(path) = self.initial_path.take() {
                self.start_load(path);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("poster window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let viewport = Viewport::new(size.width, size.height);
                if let Err(err) = self.with_session(|session| session.resize(viewport)) {
                    warn!(error = %err, "resize failed");
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.with_session(RenderSession::render) {
                    error!(error = %err, "render failed; exiting");
                    event_loop.exit();
                }
            }
            WindowEvent::DroppedFile(path) => {
                self.handle_command(event_loop, ViewerCommand::Open(path));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Released {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(command) = command_for_key(code) {
                        self.handle_command(event_loop, command);
                    }
                }
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Decoded(decoded) => self.finish_load(decoded),
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                event_loop.exit();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.cancel.cancel();
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
    }
}

/// Opens the poster window and blocks until it closes.
///
/// Must run on the main thread; decodes are spawned on `handle`.
pub fn run_windowed(
    cfg: Configuration,
    image: Option<PathBuf>,
    handle: Handle,
    cancel: CancellationToken,
) -> Result<()> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        let proxy = proxy.clone();
        handle.spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(cfg, image, handle, proxy, cancel.clone());
    let run_result = event_loop.run_app(&mut app);
    cancel.cancel();
    cancel_task.abort();

    run_result.context("viewer event loop failed")
}
