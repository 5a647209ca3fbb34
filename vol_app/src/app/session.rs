use std::{error::Error, time::Duration};

use crossbeam_channel::{after, select, tick, Receiver};
use log::{debug, info, warn};
use volvis_lib::{
    controller::{spawn_load, Controller, Message, MessageSender, View},
    landscape::{LandscapeData, Selection},
    render::RenderOptions,
    VolvisError,
};

use super::{
    config::AppConfig,
    defaults,
    output::{landscape_frame_path, volume_frame_path, write_png},
};

/// Selection event for `node`, neighbours are read from the links
pub fn selection_for(data: &LandscapeData, node: usize) -> Option<Selection> {
    let value = data.nodes.get(node)?.value;
    let mut neighbours: Vec<usize> = data
        .links
        .iter()
        .filter_map(|&(a, b)| match (a == node, b == node) {
            (true, false) => Some(b),
            (false, true) => Some(a),
            _ => None,
        })
        .collect();
    neighbours.sort_unstable();
    neighbours.dedup();
    Some(Selection {
        node,
        value,
        neighbours,
    })
}

/// One run of the app: load, render every requested technique, write frames
pub struct Session {
    config: AppConfig,
    controller: Controller,
    sender: MessageSender,
    ticker: Receiver<std::time::Instant>,
    has_landscape: bool,
}

impl Session {
    pub fn new(config: AppConfig) -> Session {
        let first = config.techniques.first().copied().unwrap_or(defaults::TECHNIQUE);
        let controller =
            Controller::new(config.capabilities, RenderOptions::default()).with_technique(first);
        let sender = controller.sender();
        Session {
            config,
            controller,
            sender,
            ticker: tick(Duration::from_millis(defaults::FRAME_INTERVAL_MS)),
            has_landscape: false,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Number of written frames
    pub fn run(&mut self) -> Result<usize, Box<dyn Error>> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let loader = spawn_load(
            self.config.volume_path.clone(),
            self.config.policy,
            self.sender.clone(),
        );
        self.send_setup()?;
        self.sender.send(Message::ViewportReady);

        self.wait_for_volume()?;
        if loader.join().is_err() {
            return Err("volume loader panicked".into());
        }

        let techniques = self.config.techniques.clone();
        let mut written = 0;
        for (i, &kind) in techniques.iter().enumerate() {
            self.sender.send(Message::SetTechnique(kind));
            self.sender.send(Message::ResetView(View::Volume));
            self.sender.send(Message::ResetView(View::Landscape));

            for n in 0..self.config.frames {
                self.ticker.recv()?;
                self.controller.frame(self.config.width, self.config.height);
                self.report_errors()?;

                if self.controller.active_technique() != Some(kind) {
                    warn!(
                        "{kind} not available, frame drawn with {:?}",
                        self.controller.active_technique()
                    );
                }
                write_png(
                    self.controller.volume_frame(),
                    &volume_frame_path(&self.config.output_dir, kind, n),
                )?;
                written += 1;

                // landscape does not depend on the technique
                if self.has_landscape && i == 0 {
                    write_png(
                        self.controller.landscape_frame(),
                        &landscape_frame_path(&self.config.output_dir, n),
                    )?;
                    written += 1;
                }

                for view in [View::Volume, View::Landscape] {
                    self.sender.send(Message::Drag {
                        view,
                        dx: defaults::ORBIT_STEP,
                        dy: 0.0,
                    });
                }
            }
            info!("{kind}: {} frames written", self.config.frames);
        }

        self.shut_down();
        Ok(written)
    }

    /// Landscape and knobs, queued before the viewport exists
    fn send_setup(&mut self) -> Result<(), Box<dyn Error>> {
        if let Some(path) = &self.config.landscape_path {
            let data = LandscapeData::from_file(path).map_err(VolvisError::from)?;
            info!(
                "Landscape {:?}: {} nodes, {} links",
                path,
                data.nodes.len(),
                data.links.len()
            );
            if let Some(node) = self.config.select {
                let selection = selection_for(&data, node).ok_or_else(|| {
                    format!("cannot select node {node}, landscape has {}", data.nodes.len())
                })?;
                self.sender.send(Message::Select(selection));
            }
            self.sender.send(Message::Landscape(data));
            self.has_landscape = true;
        }

        if let Some(brightness) = self.config.brightness {
            self.sender.send(Message::SetBrightness(brightness));
        }
        self.sender
            .send(Message::SetSurfaceVisible(self.config.surface_visible));
        Ok(())
    }

    /// Draw frames until the loaded volume is installed
    fn wait_for_volume(&mut self) -> Result<(), Box<dyn Error>> {
        let deadline = after(Duration::from_secs(defaults::LOAD_TIMEOUT_S));
        let ticker = self.ticker.clone();
        let mut waited = 0;
        while self.controller.volume().is_none() {
            select! {
                recv(ticker) -> _ => {
                    self.controller.frame(self.config.width, self.config.height);
                    self.report_errors()?;
                    waited += 1;
                }
                recv(deadline) -> _ => return Err("timed out waiting for the volume".into()),
            }
        }
        debug!("Volume arrived after {waited} frames");
        Ok(())
    }

    /// Load failures end the run, other errors are only logged
    fn report_errors(&mut self) -> Result<(), Box<dyn Error>> {
        for e in self.controller.take_errors() {
            match e {
                VolvisError::Load(_) => return Err(e.into()),
                other => warn!("{other}"),
            }
        }
        Ok(())
    }

    fn shut_down(&mut self) {
        self.sender.send(Message::ShutDown);
        self.controller.frame(self.config.width, self.config.height);
        debug!(
            "Live device resources after shutdown: {}",
            self.controller.device().stats().live()
        );
    }
}
