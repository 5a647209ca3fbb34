use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::{
    camera::OrbitCamera,
    color,
    common::Pending,
    error::{RenderError, VolvisError},
    landscape::{LandscapeData, LandscapeRenderer, LandscapeSurfaceBuilder, Selection},
    render::{
        create_technique, Capabilities, Device, FrameBuffer, RenderOptions, RenderTechnique,
        TechniqueKind,
    },
    transfer_function::TransferFunction,
    volumetric::{Volume, VolumeGrid},
};

use super::{Message, MessageBus, MessageSender, View};

/// Width of the transfer function band highlighting a selected node
pub const SELECTION_BAND_WIDTH: f32 = 0.05;

/// Owns the active technique, the transfer function and the landscape,
/// and applies queued messages once per frame.
///
/// Data that arrives before its consumer can take it (volume or landscape before
/// the viewport is ready, a volume highlight before any volume) waits in a single
/// slot. A newer arrival replaces the waiting one, and the slot is emptied when applied.
pub struct Controller {
    device: Device,
    bus: MessageBus,
    transfer_function: TransferFunction,
    lut_revision: u64,
    options: RenderOptions,
    requested: TechniqueKind,
    technique: Option<Box<dyn RenderTechnique>>,
    camera: OrbitCamera,
    volume: Option<Arc<Volume>>,
    landscape: LandscapeSurfaceBuilder,
    landscape_renderer: LandscapeRenderer,
    volume_frame: FrameBuffer,
    landscape_frame: FrameBuffer,
    pending_volume: Pending<Volume>,
    pending_landscape: Pending<LandscapeData>,
    pending_highlight: Pending<f64>,
    /// Raw value of the current selection, mapped again for every new volume
    selected_value: Option<f64>,
    ready: bool,
    running: bool,
    errors: Vec<VolvisError>,
}

impl Controller {
    pub fn new(capabilities: Capabilities, options: RenderOptions) -> Controller {
        let transfer_function = TransferFunction::new();
        Controller {
            device: Device::new(capabilities),
            bus: MessageBus::new(),
            lut_revision: transfer_function.revision(),
            transfer_function,
            options,
            requested: TechniqueKind::default(),
            technique: None,
            camera: OrbitCamera::default(),
            volume: None,
            landscape: LandscapeSurfaceBuilder::new(),
            landscape_renderer: LandscapeRenderer::new(),
            volume_frame: FrameBuffer::new(0, 0),
            landscape_frame: FrameBuffer::new(0, 0),
            pending_volume: Pending::new(),
            pending_landscape: Pending::new(),
            pending_highlight: Pending::new(),
            selected_value: None,
            ready: false,
            running: true,
            errors: Vec::new(),
        }
    }

    /// Technique used once a volume is present
    pub fn with_technique(mut self, kind: TechniqueKind) -> Self {
        self.requested = kind;
        self
    }

    pub fn sender(&self) -> MessageSender {
        self.bus.sender()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn transfer_function(&self) -> &TransferFunction {
        &self.transfer_function
    }

    pub fn volume(&self) -> Option<&Arc<Volume>> {
        self.volume.as_ref()
    }

    /// Kind of the live technique, `None` without a volume
    pub fn active_technique(&self) -> Option<TechniqueKind> {
        self.technique.as_ref().map(|t| t.kind())
    }

    pub fn landscape(&self) -> &LandscapeSurfaceBuilder {
        &self.landscape
    }

    pub fn landscape_renderer(&self) -> &LandscapeRenderer {
        &self.landscape_renderer
    }

    pub fn volume_frame(&self) -> &FrameBuffer {
        &self.volume_frame
    }

    pub fn landscape_frame(&self) -> &FrameBuffer {
        &self.landscape_frame
    }

    pub fn has_pending_volume(&self) -> bool {
        self.pending_volume.is_pending()
    }

    pub fn has_pending_landscape(&self) -> bool {
        self.pending_landscape.is_pending()
    }

    /// Errors collected since the last call
    pub fn take_errors(&mut self) -> Vec<VolvisError> {
        std::mem::take(&mut self.errors)
    }

    /// Handle queued messages and draw both views at `width` x `height`
    ///
    /// Nothing is drawn before [`Message::ViewportReady`] or after [`Message::ShutDown`].
    pub fn frame(&mut self, width: usize, height: usize) {
        for message in self.bus.drain() {
            self.handle(message);
            if !self.running {
                return;
            }
        }
        self.push_transfer_function();

        if !self.ready {
            return;
        }

        if self.volume_frame.resize(width, height) {
            debug!("Volume view resized to {width}x{height}");
        }
        self.landscape_frame.resize(width, height);

        match &mut self.technique {
            Some(technique) => technique.render(&mut self.volume_frame),
            None => self.volume_frame.clear(color::white()),
        }
        self.landscape_renderer
            .render(&self.landscape, &mut self.landscape_frame);
    }

    /// Apply one message immediately
    pub fn handle(&mut self, message: Message) {
        match message {
            Message::VolumeLoaded(Ok(volume)) => {
                if self.ready {
                    self.install_volume(volume);
                } else {
                    debug!("Viewport not ready, holding volume");
                    if self.pending_volume.put(volume).is_some() {
                        debug!("Replaced an older pending volume");
                    }
                }
            }
            Message::VolumeLoaded(Err(e)) => {
                error!("Volume not loaded: {e}");
                self.errors.push(e.into());
            }
            Message::Landscape(data) => {
                if self.ready {
                    self.landscape.set_data(&data);
                } else {
                    debug!("Viewport not ready, holding landscape");
                    self.pending_landscape.put(data);
                }
            }
            Message::Select(selection) => self.select(selection),
            Message::ClearSelection => {
                self.landscape.clear_selection();
                self.pending_highlight.take();
                self.selected_value = None;
                self.transfer_function.clear_highlight_window();
            }
            Message::SetTechnique(kind) => self.switch_technique(kind),
            Message::SetRayStep(step) => {
                let result = self.options.set_ray_step(step);
                self.apply_options(result);
            }
            Message::SetSliceCount(count) => {
                self.options.set_slice_count(count);
                self.apply_options(Ok(()));
            }
            Message::SetOpacityMultiplier(multiplier) => {
                let result = self.options.set_opacity_multiplier(multiplier);
                self.apply_options(result);
            }
            Message::SetBrightness(brightness) => {
                let result = self.options.set_brightness(brightness);
                self.apply_options(result);
            }
            Message::SetSurfaceVisible(visible) => self.landscape.set_surface_visible(visible),
            Message::Drag { view, dx, dy } => self.with_camera(view, |c| c.drag(dx, dy)),
            Message::Wheel { view, delta } => self.with_camera(view, |c| c.wheel(delta)),
            Message::ResetView(view) => self.with_camera(view, OrbitCamera::reset),
            Message::AddPoint => {
                let index = self.transfer_function.add_point();
                debug!("Added transfer function point {index}");
            }
            Message::RemovePoint(index) => {
                let result = self.transfer_function.remove_point(index).map(|_| ());
                self.record(result);
            }
            Message::SelectPoint(index) => {
                let result = self.transfer_function.select(index);
                self.record(result);
            }
            Message::MovePoint {
                index,
                iso,
                opacity,
            } => {
                let result = self
                    .transfer_function
                    .move_point(index, iso, opacity)
                    .map(|_| ());
                self.record(result);
            }
            Message::SetPointColor { index, color } => {
                let result = self.transfer_function.set_color(index, color);
                self.record(result);
            }
            Message::SetPointOpacity { index, opacity } => {
                let result = self.transfer_function.set_opacity(index, opacity);
                self.record(result);
            }
            Message::ViewportReady => self.on_ready(),
            Message::ShutDown => self.shut_down(),
        }
    }

    fn on_ready(&mut self) {
        if self.ready {
            return;
        }
        info!("Viewport ready");
        self.ready = true;
        if let Some(volume) = self.pending_volume.take() {
            self.install_volume(volume);
        }
        if let Some(data) = self.pending_landscape.take() {
            self.landscape.set_data(&data);
        }
    }

    fn shut_down(&mut self) {
        info!("Shutting down");
        if let Some(mut technique) = self.technique.take() {
            technique.cleanup();
        }
        self.running = false;
    }

    fn record<E>(&mut self, result: Result<(), E>)
    where
        E: Into<VolvisError> + std::fmt::Display,
    {
        if let Err(e) = result {
            warn!("Rejected edit: {e}");
            self.errors.push(e.into());
        }
    }

    fn apply_options(&mut self, result: Result<(), RenderError>) {
        self.record(result);
        if let Some(technique) = &mut self.technique {
            technique.set_options(self.options);
        }
    }

    fn with_camera(&mut self, view: View, action: impl FnOnce(&mut OrbitCamera)) {
        match view {
            View::Volume => {
                action(&mut self.camera);
                if let Some(technique) = &mut self.technique {
                    technique.set_camera(self.camera);
                }
            }
            View::Landscape => action(self.landscape_renderer.camera_mut()),
        }
    }

    fn select(&mut self, selection: Selection) {
        let value = selection.value;
        self.selected_value = Some(value);
        if !self.landscape.highlight_selection(selection) {
            debug!("Selection waits for the landscape");
        }
        match &self.volume {
            Some(volume) => self.highlight_value(volume.iso_of(value as f32)),
            None => {
                self.pending_highlight.put(value);
            }
        }
    }

    fn highlight_value(&mut self, iso: f32) {
        debug!("Highlighting isovalue {iso}");
        self.transfer_function
            .set_highlight_window(iso, SELECTION_BAND_WIDTH, None);
    }

    fn install_volume(&mut self, volume: Volume) {
        info!(
            "Using volume {}x{}x{}",
            volume.get_size().x,
            volume.get_size().y,
            volume.get_size().z
        );
        if let Some(mut old) = self.technique.take() {
            old.cleanup();
        }
        let volume = Arc::new(volume);
        // the band follows the raw range of the new volume
        match self.pending_highlight.take().or(self.selected_value) {
            Some(value) => self.highlight_value(volume.iso_of(value as f32)),
            None => self.transfer_function.clear_highlight_window(),
        }
        self.volume = Some(volume);
        self.build_technique(self.requested);
    }

    fn switch_technique(&mut self, kind: TechniqueKind) {
        self.requested = kind;
        if self.active_technique() == Some(kind) {
            return;
        }
        if self.volume.is_some() {
            self.build_technique(kind);
        }
    }

    // the previous technique is released before the new one allocates
    fn build_technique(&mut self, kind: TechniqueKind) {
        if let Some(mut old) = self.technique.take() {
            debug!("Releasing {}", old.kind());
            old.cleanup();
        }
        let volume = match &self.volume {
            Some(v) => Arc::clone(v),
            None => return,
        };
        self.push_transfer_function();

        let lut = self.transfer_function.lut();
        let created = match create_technique(
            kind,
            &self.device,
            Arc::clone(&volume),
            Arc::clone(&lut),
            self.options,
        ) {
            Ok(t) => Some(t),
            Err(e @ RenderError::Unsupported { .. })
                if kind != TechniqueKind::ObjectAlignedSlicing =>
            {
                warn!("{e}, falling back to {}", TechniqueKind::ObjectAlignedSlicing);
                self.errors.push(e.into());
                match create_technique(
                    TechniqueKind::ObjectAlignedSlicing,
                    &self.device,
                    volume,
                    lut,
                    self.options,
                ) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        error!("No technique available: {e}");
                        self.errors.push(e.into());
                        None
                    }
                }
            }
            Err(e) => {
                error!("Cannot create {kind}: {e}");
                self.errors.push(e.into());
                None
            }
        };

        self.technique = created.map(|mut t| {
            t.set_camera(self.camera);
            info!("Switched to {}", t.kind());
            t
        });
    }

    fn push_transfer_function(&mut self) {
        let revision = self.transfer_function.revision();
        if revision == self.lut_revision {
            return;
        }
        self.lut_revision = revision;
        if let Some(technique) = &mut self.technique {
            technique.update_transfer_function(self.transfer_function.lut());
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Controller::new(Capabilities::default(), RenderOptions::default())
    }
}
