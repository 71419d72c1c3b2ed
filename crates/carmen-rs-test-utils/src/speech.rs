use carmen_rs_core::{Playback, SpeechEngine, SpeechError, Utterance};
use parking_lot::Mutex;
use std::sync::Arc;

/// Speech engine that records what it was asked to say.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeech {
    spoken: Arc<Mutex<Vec<Utterance>>>,
    stops: Arc<Mutex<usize>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken.lock().clone()
    }

    /// Number of playbacks that were stopped.
    pub fn stops(&self) -> usize {
        *self.stops.lock()
    }
}

struct RecordedPlayback {
    stops: Arc<Mutex<usize>>,
}

impl Playback for RecordedPlayback {
    fn stop(&mut self) {
        *self.stops.lock() += 1;
    }
}

impl SpeechEngine for RecordingSpeech {
    fn start(&self, utterance: &Utterance) -> Result<Box<dyn Playback>, SpeechError> {
        self.spoken.lock().push(utterance.clone());
        Ok(Box::new(RecordedPlayback {
            stops: self.stops.clone(),
        }))
    }
}
