//! Transport session: open, send, receive, close.

use futures::StreamExt;
use modlink_proto::Message;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::adapter::{NotificationStream, RadioAdapter};
use crate::error::LinkError;
use crate::link::{Link, LinkSettings};
use crate::queue::RecvQueue;
use crate::DATA_CHARACTERISTIC;

/// One live transport session to a module network.
///
/// Composes the frame codec, the receive queue, and the connection manager
/// behind the four operations a consumer drives: [`open`](Self::open),
/// [`send`](Self::send), [`recv`](Self::recv), [`close`](Self::close).
/// A single consumer drives those operations; the only other thread of
/// execution is the notification task `open` spawns, and the receive queue
/// is the sole state shared with it.
pub struct BleSession<R: RadioAdapter> {
    link: Link<R>,
    characteristic: Uuid,
    queue: RecvQueue,
    reader: Option<JoinHandle<()>>,
    open: bool,
}

impl<R: RadioAdapter> BleSession<R> {
    /// Build a session over `radio` using the default module data
    /// characteristic.
    pub fn new(radio: R, settings: LinkSettings) -> Self {
        Self::with_characteristic(radio, settings, DATA_CHARACTERISTIC)
    }

    /// Build a session bound to a specific data characteristic.
    pub fn with_characteristic(radio: R, settings: LinkSettings, characteristic: Uuid) -> Self {
        Self {
            link: Link::new(radio, settings),
            characteristic,
            queue: RecvQueue::new(),
            reader: None,
            open: false,
        }
    }

    /// Whether `open` completed and `close` has not run yet.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Power the radio up, discover and connect the peripheral, then start
    /// draining notifications into the receive queue.
    ///
    /// Any failure releases whatever the partial startup acquired and leaves
    /// the session unusable; the cause propagates to the caller.
    pub async fn open(&mut self) -> Result<(), LinkError> {
        match self.try_open().await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Err(cleanup) = self.link.release().await {
                    log::debug!("cleanup after failed open: {cleanup}");
                }
                Err(err)
            }
        }
    }

    async fn try_open(&mut self) -> Result<(), LinkError> {
        self.link.radio_mut().power_on().await?;
        let address = self.link.discover().await?;
        self.link.connect(&address).await?;
        let stream = self.link.radio_mut().subscribe(self.characteristic).await?;

        let queue = self.queue.clone();
        self.reader = Some(tokio::spawn(drain_notifications(stream, queue)));
        self.open = true;
        Ok(())
    }

    /// Encode `message` and write it to the data characteristic.
    ///
    /// Blocks until the underlying write completes; a write fault propagates
    /// to the caller and is not retried here.
    pub async fn send(&mut self, message: &Message) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        let frame = message.encode()?;
        self.link.radio_mut().write(self.characteristic, &frame).await?;
        Ok(())
    }

    /// Next decoded message, or `None` when nothing is waiting. Never blocks.
    pub fn recv(&mut self) -> Option<Message> {
        self.queue.try_pop()
    }

    /// Broadcast the module reboot message, stop the notification reader,
    /// and release the link.
    ///
    /// The reboot write is fire-and-forget: a failure is logged and teardown
    /// continues, so the connection and radio are released on every path.
    /// Closing an already-closed (or never-opened) session is a no-op.
    pub async fn close(&mut self) -> Result<(), LinkError> {
        if !self.open {
            return Ok(());
        }
        if let Err(err) = self.send(&Message::reboot_broadcast()).await {
            log::warn!("reboot broadcast failed during close: {err}");
        }
        self.open = false;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.link.release().await
    }
}

impl<R: RadioAdapter> Drop for BleSession<R> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if self.open {
            log::warn!("session dropped while open; radio left powered, call close() first");
        }
    }
}

async fn drain_notifications(mut stream: NotificationStream, queue: RecvQueue) {
    while let Some(frame) = stream.next().await {
        match Message::decode(&frame) {
            Ok(message) => {
                if log::log_enabled!(log::Level::Debug) {
                    if let Ok(text) = message.to_json() {
                        log::debug!("recv {text}");
                    }
                }
                queue.push(message);
            }
            Err(err) => {
                // One malformed frame must not stall delivery of the rest.
                log::warn!("dropping malformed frame ({} bytes): {err}", frame.len());
            }
        }
    }
    log::debug!("notification stream closed");
}
