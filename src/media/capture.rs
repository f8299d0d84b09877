// Audio capture boundary for voice notes.
// The engine treats microphone access as an opaque, fallible capability;
// the console ships with a simulated device since no hardware layer is in
// scope.

use async_trait::async_trait;
use log::debug;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Microphone denied or absent. The recorder stays idle.
    #[error("microphone unavailable: {0}")]
    CapabilityUnavailable(String),
}

/// An acquired input stream, opaque to the engine.
#[derive(Debug)]
pub struct MicStream {
    pub device: String,
}

/// Live capture session handle. Released through `stop_capture`.
#[derive(Debug)]
pub struct MicHandle {
    pub id: String,
    pub device: String,
}

#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Request microphone access. May fail; the caller awaits this without
    /// blocking the rest of the composer.
    async fn acquire_microphone(&self) -> Result<MicStream, CaptureError>;

    /// Begin capturing from an acquired stream.
    fn start_capture(&self, stream: MicStream) -> MicHandle;

    /// Drain the audio captured since the last poll. Called on the
    /// recording tick.
    fn poll_chunk(&self, handle: &mut MicHandle) -> Option<Vec<u8>>;

    /// Stop capturing and release the microphone.
    fn stop_capture(&self, handle: MicHandle);
}

/// Stand-in microphone producing a fixed chunk of silence per poll.
pub struct SimulatedMicrophone {
    denied: bool,
}

/// Bytes of simulated audio per one-second tick.
pub const SIM_CHUNK_LEN: usize = 1024;

impl SimulatedMicrophone {
    pub fn new() -> Self {
        SimulatedMicrophone { denied: false }
    }

    /// A microphone the user has refused access to.
    pub fn denied() -> Self {
        SimulatedMicrophone { denied: true }
    }
}

impl Default for SimulatedMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioCapture for SimulatedMicrophone {
    async fn acquire_microphone(&self) -> Result<MicStream, CaptureError> {
        if self.denied {
            return Err(CaptureError::CapabilityUnavailable(
                "access denied".to_string(),
            ));
        }
        Ok(MicStream {
            device: "default".to_string(),
        })
    }

    fn start_capture(&self, stream: MicStream) -> MicHandle {
        let handle = MicHandle {
            id: Uuid::new_v4().to_string(),
            device: stream.device,
        };
        debug!("Started capture session {}", handle.id);
        handle
    }

    fn poll_chunk(&self, _handle: &mut MicHandle) -> Option<Vec<u8>> {
        Some(vec![0u8; SIM_CHUNK_LEN])
    }

    fn stop_capture(&self, handle: MicHandle) {
        debug!("Released capture session {}", handle.id);
    }
}
