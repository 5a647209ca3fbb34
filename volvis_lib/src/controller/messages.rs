use crossbeam::channel::{self, Receiver, Sender};
use log::warn;

use crate::{
    color::RGB,
    error::LoadError,
    landscape::{LandscapeData, Selection},
    render::TechniqueKind,
    volumetric::Volume,
};

/// Which camera an interaction is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Volume,
    Landscape,
}

/// Everything the controller reacts to
///
/// Messages queue up on the bus and are all handled at the start of the next frame.
#[derive(Debug)]
pub enum Message {
    /// Result of an asynchronous volume load
    VolumeLoaded(Result<Volume, LoadError>),
    Landscape(LandscapeData),
    Select(Selection),
    ClearSelection,
    SetTechnique(TechniqueKind),
    SetRayStep(f32),
    SetSliceCount(usize),
    SetOpacityMultiplier(f32),
    SetBrightness(f32),
    SetSurfaceVisible(bool),
    /// Mouse drag in pixels
    Drag { view: View, dx: f32, dy: f32 },
    Wheel { view: View, delta: f32 },
    ResetView(View),
    AddPoint,
    RemovePoint(usize),
    SelectPoint(usize),
    MovePoint { index: usize, iso: f32, opacity: f32 },
    SetPointColor { index: usize, color: RGB },
    SetPointOpacity { index: usize, opacity: f32 },
    /// Output surface exists, rendering may start
    ViewportReady,
    ShutDown,
}

/// Cloneable sending half of the bus
#[derive(Debug, Clone)]
pub struct MessageSender(Sender<Message>);

impl MessageSender {
    /// Returns `false` if the controller is gone
    pub fn send(&self, message: Message) -> bool {
        match self.0.send(message) {
            Ok(()) => true,
            Err(e) => {
                warn!("Message dropped, controller is gone: {:?}", e.0);
                false
            }
        }
    }
}

/// Unbounded queue between producers (UI, loader thread) and the controller
#[derive(Debug)]
pub struct MessageBus {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
}

impl Default for MessageBus {
    fn default() -> Self {
        MessageBus::new()
    }
}

impl MessageBus {
    pub fn new() -> MessageBus {
        let (sender, receiver) = channel::unbounded();
        MessageBus { sender, receiver }
    }

    pub fn sender(&self) -> MessageSender {
        MessageSender(self.sender.clone())
    }

    /// Messages queued so far, does not block
    pub fn drain(&self) -> Vec<Message> {
        self.receiver.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn drain_keeps_order() {
        let bus = MessageBus::new();
        let sender = bus.sender();
        assert!(sender.send(Message::ViewportReady));
        assert!(sender.send(Message::SetBrightness(2.0)));
        assert!(!bus.is_empty());

        let messages = bus.drain();
        assert!(matches!(messages[0], Message::ViewportReady));
        assert!(matches!(messages[1], Message::SetBrightness(b) if b == 2.0));
        assert!(bus.is_empty());
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn send_after_drop() {
        let sender = MessageBus::new().sender();
        assert!(!sender.send(Message::ShutDown));
    }
}
