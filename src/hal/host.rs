//! Desktop implementations backed by the standard library.
//!
//! Used by the `decoder_sim` binary to run the full main loop on a host:
//!
//! - [`SystemClock`]: milliseconds since construction via `Instant`
//! - [`ChannelBus`]: transport fed and drained through `mpsc` channels
//! - [`FileStore`]: EEPROM image persisted to a file on every update

use crate::messages::{BusMessage, OutboundMessage};
use crate::store::UNINITIALIZED;
use crate::traits::{BusTransport, ByteStore, Clock};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, SendError, Sender, TryRecvError};
use std::time::Instant;
use std::vec::Vec;

/// Monotonic clock counting from construction.
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Creates a clock reading zero now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Bus transport connected to the rest of the program by channels.
///
/// Incoming messages are pushed through the [`Sender`] returned by
/// [`ChannelBus::new`]; outbound messages arrive on the returned [`Receiver`].
pub struct ChannelBus {
    incoming: Receiver<BusMessage>,
    outgoing: Sender<OutboundMessage>,
    connected: bool,
}

impl ChannelBus {
    /// Create the bus and the far ends of its channels.
    pub fn new() -> (Self, Sender<BusMessage>, Receiver<OutboundMessage>) {
        let (in_tx, in_rx) = channel();
        let (out_tx, out_rx) = channel();
        let bus = Self {
            incoming: in_rx,
            outgoing: out_tx,
            connected: true,
        };
        (bus, in_tx, out_rx)
    }

    /// Whether the incoming side still has a sender.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl BusTransport for ChannelBus {
    type Error = SendError<OutboundMessage>;

    fn try_receive(&mut self) -> Option<BusMessage> {
        match self.incoming.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.connected {
                    tracing::info!("bus input closed");
                }
                self.connected = false;
                None
            }
        }
    }

    fn send(&mut self, msg: OutboundMessage) -> Result<(), Self::Error> {
        self.outgoing.send(msg)
    }
}

/// EEPROM image kept in a file.
///
/// Every changed byte is written through to disk before `update` returns.
/// A missing file starts out uninitialized, so the decoder resets it on
/// first boot.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl FileStore {
    /// Open (or create) an image of `len` bytes at `path`.
    pub fn open(path: impl AsRef<Path>, len: usize) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut blank = std::vec![0xFF; len];
                if len >= 2 {
                    blank[0] = (UNINITIALIZED & 0xFF) as u8;
                    blank[1] = (UNINITIALIZED >> 8) as u8;
                }
                blank
            }
            Err(e) => return Err(e),
        };
        bytes.resize(len, 0xFF);
        std::fs::write(&path, &bytes)?;
        Ok(Self { path, bytes })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStore for FileStore {
    fn read(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0xFF)
    }

    fn update(&mut self, offset: usize, value: u8) {
        let Some(cell) = self.bytes.get_mut(offset) else {
            return;
        };
        if *cell == value {
            return;
        }
        *cell = value;
        if let Err(e) = std::fs::write(&self.path, &self.bytes) {
            tracing::warn!(error = %e, path = %self.path.display(), "EEPROM image not saved");
        }
    }
}
