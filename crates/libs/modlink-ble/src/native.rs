//! btleplug-backed radio adapter.

use std::time::Duration;

use btleplug::api::{
    Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use crate::adapter::{NotificationStream, RadioAdapter, ScanEntry};
use crate::error::RadioError;

/// How long one discovery pass listens for advertisements.
const SCAN_WINDOW: Duration = Duration::from_secs(5);

/// Host radio driver backed by btleplug.
///
/// Holds at most one adapter and one connected peripheral, matching the
/// single-link scope of the transport.
pub struct NativeRadio {
    scan_window: Duration,
    adapter: Option<Adapter>,
    peripheral: Option<Peripheral>,
}

impl NativeRadio {
    /// Adapter with the default scan window.
    pub fn new() -> Self {
        Self {
            scan_window: SCAN_WINDOW,
            adapter: None,
            peripheral: None,
        }
    }

    /// Override how long one discovery pass listens.
    pub fn with_scan_window(mut self, scan_window: Duration) -> Self {
        self.scan_window = scan_window;
        self
    }

    fn adapter(&self) -> Result<&Adapter, RadioError> {
        self.adapter
            .as_ref()
            .ok_or_else(|| RadioError::Fault("radio interface is powered off".into()))
    }

    fn connected_characteristic(
        &self,
        uuid: Uuid,
    ) -> Result<(Peripheral, Characteristic), RadioError> {
        let peripheral = self
            .peripheral
            .as_ref()
            .ok_or_else(|| RadioError::NotConnected("no peripheral connected".into()))?
            .clone();
        let characteristic = peripheral
            .characteristics()
            .into_iter()
            .find(|characteristic| characteristic.uuid == uuid)
            .ok_or_else(|| {
                RadioError::Fault(format!("characteristic {uuid} not found on peripheral"))
            })?;
        Ok((peripheral, characteristic))
    }
}

impl Default for NativeRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioAdapter for NativeRadio {
    async fn power_on(&mut self) -> Result<(), RadioError> {
        hci_power(true).await;
        let manager = Manager::new()
            .await
            .map_err(|err| RadioError::Fault(format!("create BLE manager: {err}")))?;
        let adapters = manager
            .adapters()
            .await
            .map_err(|err| RadioError::Fault(format!("enumerate BLE adapters: {err}")))?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| RadioError::Fault("no BLE adapters available on host".into()))?;
        self.adapter = Some(adapter);
        Ok(())
    }

    async fn power_off(&mut self) -> Result<(), RadioError> {
        if let Some(adapter) = self.adapter.take() {
            if let Err(err) = adapter.stop_scan().await {
                log::debug!("stop scan during power off: {err}");
            }
        }
        self.peripheral = None;
        hci_power(false).await;
        Ok(())
    }

    async fn scan(&mut self, _privileged: bool) -> Result<Vec<ScanEntry>, RadioError> {
        // btleplug scans need no privilege escalation; the flag exists for
        // drivers that do.
        let adapter = self.adapter()?.clone();
        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|err| RadioError::Fault(format!("start BLE scan: {err}")))?;
        sleep(self.scan_window).await;
        let peripherals = adapter
            .peripherals()
            .await
            .map_err(|err| RadioError::Fault(format!("list peripherals: {err}")))?;
        if let Err(err) = adapter.stop_scan().await {
            log::debug!("stop scan after discovery pass: {err}");
        }

        let mut entries = Vec::with_capacity(peripherals.len());
        for peripheral in peripherals {
            let properties = peripheral
                .properties()
                .await
                .map_err(|err| RadioError::Fault(format!("read peripheral properties: {err}")))?;
            entries.push(ScanEntry {
                name: properties.and_then(|properties| properties.local_name),
                address: peripheral.address().to_string(),
            });
        }
        Ok(entries)
    }

    async fn connect(&mut self, address: &str, connect_timeout: Duration) -> Result<(), RadioError> {
        let adapter = self.adapter()?.clone();
        let peripherals = adapter
            .peripherals()
            .await
            .map_err(|err| RadioError::Fault(format!("list peripherals: {err}")))?;
        let peripheral = peripherals
            .into_iter()
            .find(|peripheral| peripheral.address().to_string() == address)
            .ok_or_else(|| {
                RadioError::NotConnected(format!("peripheral {address} is no longer visible"))
            })?;

        timeout(connect_timeout, async {
            peripheral
                .connect()
                .await
                .map_err(|err| RadioError::NotConnected(format!("connect {address}: {err}")))?;
            peripheral.discover_services().await.map_err(|err| {
                RadioError::NotConnected(format!("discover GATT services on {address}: {err}"))
            })
        })
        .await
        .map_err(|_| {
            RadioError::NotConnected(format!(
                "connect timeout after {} ms",
                connect_timeout.as_millis()
            ))
        })??;

        self.peripheral = Some(peripheral);
        Ok(())
    }

    async fn subscribe(&mut self, characteristic: Uuid) -> Result<NotificationStream, RadioError> {
        let (peripheral, gatt_char) = self.connected_characteristic(characteristic)?;
        peripheral
            .subscribe(&gatt_char)
            .await
            .map_err(|err| RadioError::Fault(format!("subscribe to {characteristic}: {err}")))?;
        let notifications = peripheral
            .notifications()
            .await
            .map_err(|err| RadioError::Fault(format!("open notification stream: {err}")))?;
        let frames = notifications
            .filter(move |notification| futures::future::ready(notification.uuid == characteristic))
            .map(|notification| notification.value);
        Ok(Box::pin(frames))
    }

    async fn write(&mut self, characteristic: Uuid, bytes: &[u8]) -> Result<(), RadioError> {
        let (peripheral, gatt_char) = self.connected_characteristic(characteristic)?;
        let write_type = if gatt_char.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        peripheral
            .write(&gatt_char, bytes, write_type)
            .await
            .map_err(|err| {
                RadioError::Fault(format!(
                    "write {} bytes to {characteristic}: {err}",
                    bytes.len()
                ))
            })
    }

    async fn disconnect(&mut self) -> Result<(), RadioError> {
        if let Some(peripheral) = self.peripheral.take() {
            match peripheral.is_connected().await {
                Ok(true) => peripheral
                    .disconnect()
                    .await
                    .map_err(|err| RadioError::Fault(format!("disconnect peripheral: {err}")))?,
                Ok(false) => {}
                Err(err) => log::debug!("read BLE connection state during disconnect: {err}"),
            }
        }
        Ok(())
    }
}

/// Best-effort host interface power control, mirroring the `hciconfig`
/// commands module networks are provisioned with on embedded Linux hosts.
/// Failures are logged and ignored: btleplug still works where the tool is
/// absent or unprivileged.
#[cfg(target_os = "linux")]
async fn hci_power(up: bool) {
    let state = if up { "up" } else { "down" };
    match tokio::process::Command::new("hciconfig")
        .args(["hci0", state])
        .status()
        .await
    {
        Ok(status) if status.success() => {}
        Ok(status) => log::debug!("hciconfig hci0 {state} exited with {status}"),
        Err(err) => log::debug!("hciconfig hci0 {state}: {err}"),
    }
}

#[cfg(not(target_os = "linux"))]
async fn hci_power(_up: bool) {}
