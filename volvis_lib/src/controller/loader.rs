use std::{
    path::PathBuf,
    thread::{self, JoinHandle},
    time::Instant,
};

use log::{error, info};

use crate::volumetric::{self, NormalizationPolicy};

use super::{Message, MessageSender};

/// Load a volume on a worker thread, the result arrives as [`Message::VolumeLoaded`]
pub fn spawn_load(
    path: PathBuf,
    policy: NormalizationPolicy,
    sender: MessageSender,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let start = Instant::now();
        let result = volumetric::from_file(&path, policy);
        match &result {
            Ok(volume) => info!(
                "Loaded {:?} ({} voxels) in {} ms",
                path,
                volume.voxel_count(),
                start.elapsed().as_millis()
            ),
            Err(e) => error!("Loading {path:?} failed: {e}"),
        }
        sender.send(Message::VolumeLoaded(result));
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::controller::MessageBus;

    #[test]
    fn missing_file_reports_error() {
        let bus = MessageBus::new();
        spawn_load(
            PathBuf::from("/nonexistent/volume.vtk"),
            NormalizationPolicy::default(),
            bus.sender(),
        )
        .join()
        .unwrap();

        let messages = bus.drain();
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], Message::VolumeLoaded(Err(_))));
    }
}
