//! Render session façade: load, recolor, randomize, resize, clear, dispose.
//!
//! All mutation happens on the caller's thread. Decoding is the only
//! suspension point, and loads are guarded by an epoch so a slow decode can
//! never overwrite a newer image.

mod state;

pub use state::{Gate, Operation, SessionState};

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::asset::ImageAsset;
use crate::config::{CameraConfig, Configuration};
use crate::error::Error;
use crate::processing::color::InkColor;
use crate::processing::layout::{PlaneSize, Rotation, fit_plane};
use crate::processing::ordered::Viewport;
use crate::processing::random::{RandomParams, Randomizer};
use crate::processing::{DitherConfig, DitherStrategy};
use crate::render::backend::RenderBackend;
use crate::render::camera::Camera;
use crate::render::surface::{Surface, SurfaceManager};
use crate::tasks::loader;

/// Epochs are unique across every session in the process, so a ticket from a
/// disposed session never matches its replacement.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// Captured at the start of a load; stale tickets are discarded on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    epoch: u64,
}

impl LoadTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image is now on screen.
    Mounted,
    /// The session moved on while decoding; the result was dropped.
    Superseded,
}

pub struct RenderSession<B: RenderBackend> {
    strategy: DitherStrategy,
    padding: f32,
    state: SessionState,
    backend: Option<B>,
    viewport: Viewport,
    camera: Camera,
    surfaces: SurfaceManager,
    asset: Option<ImageAsset>,
    dither: DitherConfig,
    randomizer: Randomizer,
    epoch: u64,
}

impl<B: RenderBackend> RenderSession<B> {
    pub fn new(cfg: &Configuration) -> Self {
        Self::with_parts(
            cfg.strategy,
            &cfg.camera,
            cfg.layout.padding_factor,
            cfg.viewport,
            cfg.randomize.randomizer(),
        )
        .with_ink(cfg.ink_color)
    }

    pub fn with_parts(
        strategy: DitherStrategy,
        camera: &CameraConfig,
        padding: f32,
        viewport: Viewport,
        randomizer: Randomizer,
    ) -> Self {
        let viewport = viewport.non_zero();
        Self {
            strategy,
            padding,
            state: SessionState::Uninitialized,
            backend: None,
            viewport,
            camera: Camera::new(camera, viewport.aspect()),
            surfaces: SurfaceManager::new(),
            asset: None,
            dither: DitherConfig::default(),
            randomizer,
            epoch: next_epoch(),
        }
    }

    fn with_ink(mut self, ink: InkColor) -> Self {
        self.dither = self.dither.with_ink(ink);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn strategy(&self) -> DitherStrategy {
        self.strategy
    }

    pub fn dither_config(&self) -> DitherConfig {
        self.dither
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        self.asset.as_ref()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surfaces.current()
    }

    pub fn surfaces(&self) -> &SurfaceManager {
        &self.surfaces
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Connects the backend. Calling it again once ready is a no-op and does
    /// not invoke `connect`.
    ///
    /// # Errors
    /// Whatever `connect` reports, normally [`Error::RendererUnavailable`].
    pub fn init<F>(&mut self, connect: F) -> Result<(), Error>
    where
        F: FnOnce(Viewport) -> Result<B, Error>,
    {
        if !self.gate(Operation::Init)? {
            return Ok(());
        }
        let mut backend = connect(self.viewport)?;
        backend.resize(self.viewport);
        info!(
            width = self.viewport.width,
            height = self.viewport.height,
            strategy = %self.strategy,
            "render session ready"
        );
        self.backend = Some(backend);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Starts a load; the returned ticket must be handed to [`Self::finish_load`].
    ///
    /// Any load started earlier becomes stale.
    pub fn begin_load(&mut self) -> Result<LoadTicket, Error> {
        self.gate(Operation::Load)?;
        self.epoch = next_epoch();
        debug!(epoch = self.epoch, "load started");
        Ok(LoadTicket { epoch: self.epoch })
    }

    /// Completes a load with a freshly sampled rotation and dither scale.
    ///
    /// # Errors
    /// The decode error, if the ticket is still current; the session keeps
    /// its previous image in that case.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        decoded: Result<ImageAsset, Error>,
        ink: InkColor,
    ) -> Result<LoadOutcome, Error> {
        let params = self.randomizer.sample();
        self.finish_load_with(ticket, decoded, ink, params)
    }

    /// [`Self::finish_load`] with injected random parameters.
    pub fn finish_load_with(
        &mut self,
        ticket: LoadTicket,
        decoded: Result<ImageAsset, Error>,
        ink: InkColor,
        params: RandomParams,
    ) -> Result<LoadOutcome, Error> {
        self.gate(Operation::Load)?;
        if ticket.epoch != self.epoch {
            debug!(
                ticket = ticket.epoch,
                current = self.epoch,
                "discarding superseded load"
            );
            return Ok(LoadOutcome::Superseded);
        }
        let asset = match decoded {
            Ok(asset) => asset,
            Err(err) => {
                warn!(error = %err, "image load failed; keeping previous state");
                return Err(err);
            }
        };
        self.install(asset, DitherConfig::new(ink, params.scale), params.rotation)?;
        Ok(LoadOutcome::Mounted)
    }

    /// Decodes `bytes` off-thread and mounts the result.
    pub async fn load_image(&mut self, bytes: Vec<u8>, ink: InkColor) -> Result<LoadOutcome, Error> {
        let ticket = self.begin_load()?;
        let decoded = loader::decode_image_async(bytes, "<bytes>".to_owned()).await;
        self.finish_load(ticket, decoded, ink)
    }

    /// Mounts an already decoded asset with fixed parameters.
    pub fn load_decoded(
        &mut self,
        asset: ImageAsset,
        ink: InkColor,
        params: RandomParams,
    ) -> Result<(), Error> {
        let ticket = self.begin_load()?;
        self.finish_load_with(ticket, Ok(asset), ink, params)
            .map(|_| ())
    }

    /// Re-dithers the retained image in a new ink; scale and tilt stay put.
    pub fn recolor(&mut self, ink: InkColor) -> Result<(), Error> {
        if !self.gate(Operation::Recolor)? {
            return Ok(());
        }
        let rotation = self.current_rotation();
        self.redither(self.dither.with_ink(ink), rotation)
    }

    /// Re-dithers with a new ink, a new tilt and a new dither scale.
    pub fn randomize(&mut self, ink: InkColor) -> Result<(), Error> {
        let params = self.randomizer.sample();
        self.randomize_with(ink, params)
    }

    pub fn randomize_with(&mut self, ink: InkColor, params: RandomParams) -> Result<(), Error> {
        if !self.gate(Operation::Randomize)? {
            return Ok(());
        }
        self.redither(DitherConfig::new(ink, params.scale), params.rotation)
    }

    /// Tracks a new drawing-surface size: camera aspect, plane fit and, for
    /// ordered dithering, the viewport-bound material. Diffusion rasters are
    /// not recomputed.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), Error> {
        if !self.gate(Operation::Resize)? {
            return Ok(());
        }
        let viewport = viewport.non_zero();
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        backend.resize(viewport);
        debug!(width = viewport.width, height = viewport.height, "session resized");
        if let Some(asset) = self.asset.as_ref() {
            let size = plane_size(asset, &self.camera, self.padding);
            self.surfaces.refit(backend, size, viewport)?;
        }
        self.render()
    }

    /// Removes the image and blanks the drawing surface. Pending loads are
    /// invalidated even when there is no image to remove.
    pub fn clear(&mut self) -> Result<(), Error> {
        let run = self.gate(Operation::Clear)?;
        self.epoch = next_epoch();
        if !run {
            return Ok(());
        }
        if let Some(backend) = self.backend.as_mut() {
            self.surfaces.unmount(backend);
            backend.clear()?;
        }
        self.asset = None;
        self.state = SessionState::Ready;
        info!("session cleared");
        Ok(())
    }

    /// Draws the current scene once.
    pub fn render(&mut self) -> Result<(), Error> {
        if !self.gate(Operation::Render)? {
            return Ok(());
        }
        let draw = self.surfaces.draw_call();
        match self.backend.as_mut() {
            Some(backend) => backend.render(&self.camera, draw.as_ref()),
            None => Ok(()),
        }
    }

    /// Releases every resource and the backend. Terminal.
    pub fn dispose(&mut self) {
        if !matches!(self.state.gate(Operation::Dispose), Gate::Run) {
            return;
        }
        self.epoch = next_epoch();
        if let Some(mut backend) = self.backend.take() {
            self.surfaces.unmount(&mut backend);
            backend.dispose();
        }
        self.asset = None;
        self.state = SessionState::Disposed;
        info!("render session disposed");
    }

    /// `Ok(true)` to run, `Ok(false)` for a no-op, `Err` when invalid.
    fn gate(&self, op: Operation) -> Result<bool, Error> {
        match self.state.gate(op) {
            Gate::Run => Ok(true),
            Gate::Skip => Ok(false),
            Gate::NotInitialized => Err(Error::NotInitialized),
            Gate::Disposed => Err(Error::Disposed),
        }
    }

    fn current_rotation(&self) -> Rotation {
        self.surfaces
            .current()
            .map(|surface| surface.rotation)
            .unwrap_or_default()
    }

    fn install(
        &mut self,
        asset: ImageAsset,
        dither: DitherConfig,
        rotation: Rotation,
    ) -> Result<(), Error> {
        let backend = self.backend.as_mut().ok_or(Error::NotInitialized)?;
        let asset = asset.fit_within(backend.max_texture_dimension())?;
        mount(
            backend,
            &mut self.surfaces,
            self.strategy,
            &asset,
            &dither,
            &self.camera,
            self.padding,
            rotation,
        )?;
        info!(
            source = asset.source(),
            width = asset.width(),
            height = asset.height(),
            scale = dither.scale(),
            ink = %dither.ink(),
            "image mounted"
        );
        self.asset = Some(asset);
        self.dither = dither;
        self.state = SessionState::Loaded;
        self.render()
    }

    fn redither(&mut self, dither: DitherConfig, rotation: Rotation) -> Result<(), Error> {
        let (Some(backend), Some(asset)) = (self.backend.as_mut(), self.asset.as_ref()) else {
            return Ok(());
        };
        mount(
            backend,
            &mut self.surfaces,
            self.strategy,
            asset,
            &dither,
            &self.camera,
            self.padding,
            rotation,
        )?;
        debug!(scale = dither.scale(), ink = %dither.ink(), "surface re-dithered");
        self.dither = dither;
        self.render()
    }
}

impl<B: RenderBackend> Drop for RenderSession<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn plane_size(asset: &ImageAsset, camera: &Camera, padding: f32) -> PlaneSize {
    fit_plane(
        asset.aspect(),
        camera.aspect(),
        camera.fov_degrees(),
        camera.distance(),
        padding,
    )
}

#[allow(clippy::too_many_arguments)]
fn mount<B: RenderBackend>(
    backend: &mut B,
    surfaces: &mut SurfaceManager,
    strategy: DitherStrategy,
    asset: &ImageAsset,
    dither: &DitherConfig,
    camera: &Camera,
    padding: f32,
    rotation: Rotation,
) -> Result<(), Error> {
    let output = strategy.apply(asset.image(), dither, backend.viewport());
    let size = plane_size(asset, camera, padding);
    surfaces.mount(backend, &output, size, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::RecordingBackend;
    use image::{Rgba, RgbaImage};

    fn gray_asset(width: u32, height: u32) -> ImageAsset {
        ImageAsset::new(
            "gray",
            RgbaImage::from_pixel(width, height, Rgba([127, 127, 127, 255])),
        )
        .unwrap()
    }

    fn params(scale: f32) -> RandomParams {
        RandomParams {
            rotation: Rotation::new(0.1, -0.05, 0.02),
            scale,
        }
    }

    fn ready(strategy: DitherStrategy) -> RenderSession<RecordingBackend> {
        let cfg = Configuration {
            strategy,
            ..Configuration::default()
        };
        let mut session = RenderSession::new(&cfg);
        session
            .init(|viewport| Ok(RecordingBackend::new(viewport)))
            .unwrap();
        session
    }

    fn backend(session: &RenderSession<RecordingBackend>) -> &RecordingBackend {
        session.backend().unwrap()
    }

    #[test]
    fn init_connects_once() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        let mut called = false;
        session
            .init(|viewport| {
                called = true;
                Ok(RecordingBackend::new(viewport))
            })
            .unwrap();
        assert!(!called);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn failed_init_stays_uninitialized() {
        let mut session: RenderSession<RecordingBackend> =
            RenderSession::new(&Configuration::default());
        let err = session
            .init(|_| Err(Error::RendererUnavailable("no adapter".into())))
            .unwrap_err();
        assert!(matches!(err, Error::RendererUnavailable(_)));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(matches!(session.begin_load(), Err(Error::NotInitialized)));
    }

    #[test]
    fn load_mounts_and_renders() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        session
            .load_decoded(gray_asset(40, 20), InkColor::BLACK, params(2.0))
            .unwrap();

        assert_eq!(session.state(), SessionState::Loaded);
        let surface = session.surface().unwrap();
        assert_eq!(surface.rotation, Rotation::new(0.1, -0.05, 0.02));
        assert_eq!(session.dither_config().scale(), 2.0);
        let frame = backend(&session).last_frame().unwrap();
        assert_eq!(frame.draw, Some(surface.draw_call()));
    }

    #[test]
    fn stale_load_is_discarded() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        let first = session.begin_load().unwrap();
        let second = session.begin_load().unwrap();

        let outcome = session
            .finish_load_with(first, Ok(gray_asset(8, 8)), InkColor::BLACK, params(1.0))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(backend(&session).live_textures(), 0);

        let outcome = session
            .finish_load_with(second, Ok(gray_asset(8, 8)), InkColor::BLACK, params(1.0))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Mounted);
        assert_eq!(backend(&session).live_textures(), 1);
    }

    #[test]
    fn decode_error_keeps_previous_image() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        session
            .load_decoded(gray_asset(8, 8), InkColor::BLACK, params(1.0))
            .unwrap();
        let before = session.surface().cloned();

        let ticket = session.begin_load().unwrap();
        let err = session
            .finish_load(ticket, Err(Error::EmptyImage("broken".into())), InkColor::BLACK)
            .unwrap_err();
        assert!(err.is_decode());
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.surface().cloned(), before);
    }

    #[test]
    fn clear_invalidates_pending_loads() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        let ticket = session.begin_load().unwrap();
        session.clear().unwrap();
        let outcome = session
            .finish_load_with(ticket, Ok(gray_asset(8, 8)), InkColor::BLACK, params(1.0))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn tickets_from_another_session_are_superseded() {
        let mut old = ready(DitherStrategy::ErrorDiffusion);
        let _ = old.begin_load().unwrap();
        let stale = old.begin_load().unwrap();
        old.dispose();

        let mut fresh = ready(DitherStrategy::Ordered);
        let _ = fresh.begin_load().unwrap();
        let _ = fresh.begin_load().unwrap();
        let outcome = fresh
            .finish_load_with(stale, Ok(gray_asset(8, 8)), InkColor::BLACK, params(1.0))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert!(fresh.asset().is_none());
        assert_eq!(backend(&fresh).live_textures(), 0);
    }

    #[test]
    fn clear_on_disposed_session_leaves_epoch_alone() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        session.dispose();
        let epoch = session.epoch();
        assert!(matches!(session.clear(), Err(Error::Disposed)));
        assert_eq!(session.epoch(), epoch);
    }

    #[test]
    fn recolor_keeps_rotation_and_scale() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        session
            .load_decoded(gray_asset(16, 16), InkColor::BLACK, params(3.0))
            .unwrap();
        let red = InkColor::from_rgb8(255, 0, 0);
        session.recolor(red).unwrap();

        assert_eq!(session.dither_config().ink(), red);
        assert_eq!(session.dither_config().scale(), 3.0);
        assert_eq!(
            session.surface().unwrap().rotation,
            Rotation::new(0.1, -0.05, 0.02)
        );
        assert_eq!(backend(&session).live_textures(), 1);
        assert_eq!(backend(&session).released().textures, 1);
    }

    #[test]
    fn image_operations_without_image_are_noops() {
        let mut session = ready(DitherStrategy::Ordered);
        session.recolor(InkColor::BLACK).unwrap();
        session.randomize(InkColor::BLACK).unwrap();
        session.clear().unwrap();
        assert_eq!(backend(&session).live_textures(), 0);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn diffusion_resize_refits_without_redithering() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        session
            .load_decoded(gray_asset(30, 10), InkColor::BLACK, params(1.0))
            .unwrap();
        let before = session.surface().cloned().unwrap();

        session.resize(Viewport::new(400, 800)).unwrap();

        let after = session.surface().unwrap();
        assert_eq!(after.texture, before.texture);
        assert_eq!(after.material, before.material);
        assert_ne!(after.geometry, before.geometry);
        assert!(after.size.width < before.size.width);
        assert!((session.camera().aspect() - 0.5).abs() < 1e-6);
        assert_eq!(backend(&session).viewport(), Viewport::new(400, 800));
    }

    #[test]
    fn oversized_images_are_shrunk_to_backend_limit() {
        let cfg = Configuration::default();
        let mut session = RenderSession::new(&cfg);
        session
            .init(|viewport| Ok(RecordingBackend::new(viewport).with_max_texture_dimension(64)))
            .unwrap();
        session
            .load_decoded(gray_asset(256, 128), InkColor::BLACK, params(1.0))
            .unwrap();
        let asset = session.asset().unwrap();
        assert_eq!((asset.width(), asset.height()), (64, 32));
    }

    #[test]
    fn dispose_is_terminal_and_idempotent() {
        let mut session = ready(DitherStrategy::ErrorDiffusion);
        session
            .load_decoded(gray_asset(8, 8), InkColor::BLACK, params(1.0))
            .unwrap();
        session.dispose();
        session.dispose();

        assert_eq!(session.state(), SessionState::Disposed);
        assert!(session.backend().is_none());
        assert_eq!(session.surfaces().disposed_count(), 1);
        assert!(matches!(session.begin_load(), Err(Error::Disposed)));
        assert!(matches!(session.recolor(InkColor::BLACK), Err(Error::Disposed)));
        assert!(matches!(session.render(), Err(Error::Disposed)));
    }

    #[tokio::test]
    async fn load_image_decodes_bytes() {
        let mut png = Vec::new();
        RgbaImage::from_pixel(6, 3, Rgba([10, 10, 10, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut session = ready(DitherStrategy::ErrorDiffusion);
        let outcome = session.load_image(png, InkColor::BLACK).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Mounted);
        assert_eq!(session.asset().unwrap().width(), 6);

        let err = session
            .load_image(b"not an image".to_vec(), InkColor::BLACK)
            .await
            .unwrap_err();
        assert!(err.is_decode());
        assert_eq!(session.asset().unwrap().width(), 6);
    }
}
