//! Peripheral discovery and connection lifecycle.
//!
//! The link walks `IDLE -> SCANNING -> FOUND -> CONNECTING -> CONNECTED`
//! with a bounded retry budget on each radio-facing phase. A scan-time radio
//! fault power-cycles the interface before the next pass; connect attempts
//! stop at the first success. Exhausting either budget is a terminal,
//! propagated failure rather than an indefinite hang.

use std::time::Duration;

use crate::adapter::{RadioAdapter, ScanEntry};
use crate::error::{LinkError, RadioError};

/// Retry and timeout budgets for establishing a link.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Advertised device name to discover.
    pub target_name: String,
    /// Discovery passes before giving up.
    pub max_scan_attempts: u32,
    /// Connect attempts before giving up.
    pub max_connect_attempts: u32,
    /// Bound on a single connect attempt.
    pub connect_timeout: Duration,
    /// Whether scans run with elevated driver privileges.
    pub privileged_scan: bool,
}

impl LinkSettings {
    /// Settings for `target_name` with the default budgets.
    pub fn new(target_name: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            max_scan_attempts: 5,
            max_connect_attempts: 3,
            connect_timeout: Duration::from_secs(10),
            privileged_scan: true,
        }
    }

    /// Override the discovery pass budget (minimum 1).
    pub fn with_max_scan_attempts(mut self, attempts: u32) -> Self {
        self.max_scan_attempts = attempts.max(1);
        self
    }

    /// Override the connect attempt budget (minimum 1).
    pub fn with_max_connect_attempts(mut self, attempts: u32) -> Self {
        self.max_connect_attempts = attempts.max(1);
        self
    }

    /// Override the per-attempt connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Toggle privileged discovery passes.
    pub fn with_privileged_scan(mut self, privileged: bool) -> Self {
        self.privileged_scan = privileged;
        self
    }
}

/// Connection manager for one named peripheral.
pub struct Link<R: RadioAdapter> {
    radio: R,
    settings: LinkSettings,
    peer: Option<String>,
}

impl<R: RadioAdapter> Link<R> {
    /// Wrap `radio` with the given budgets. No radio traffic happens yet.
    pub fn new(radio: R, settings: LinkSettings) -> Self {
        Self { radio, settings, peer: None }
    }

    /// Budgets this link was built with.
    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Address of the connected peer, while one is established.
    pub fn peer_address(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    pub(crate) fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Resolve the target's address by advertised name.
    ///
    /// Runs up to `max_scan_attempts` discovery passes. Entries with no
    /// advertised name are skipped; the first exact match in scan-result
    /// order wins. A radio fault power-cycles the interface before the next
    /// pass and still consumes one attempt.
    pub async fn discover(&mut self) -> Result<String, LinkError> {
        let target = self.settings.target_name.clone();
        for attempt in 1..=self.settings.max_scan_attempts {
            log::info!(
                "scanning for '{target}' (attempt {attempt}/{})",
                self.settings.max_scan_attempts
            );
            let entries = match self.radio.scan(self.settings.privileged_scan).await {
                Ok(entries) => entries,
                Err(RadioError::Fault(reason)) => {
                    log::warn!("scan attempt {attempt} failed: {reason}; power-cycling radio");
                    self.reset_interface().await?;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if let Some(address) = first_match(&entries, &target) {
                log::info!("found '{target}' at {address}");
                return Ok(address.to_owned());
            }
        }
        Err(LinkError::DeviceNotFound {
            name: target,
            attempts: self.settings.max_scan_attempts,
        })
    }

    /// Connect to `address`, stopping at the first successful attempt.
    ///
    /// Only a refused connection is retried; any other radio fault
    /// propagates immediately.
    pub async fn connect(&mut self, address: &str) -> Result<(), LinkError> {
        for attempt in 1..=self.settings.max_connect_attempts {
            log::info!(
                "connecting to '{}' at {address} (attempt {attempt}/{})",
                self.settings.target_name,
                self.settings.max_connect_attempts
            );
            match self.radio.connect(address, self.settings.connect_timeout).await {
                Ok(()) => {
                    log::info!("connected to {address}");
                    self.peer = Some(address.to_owned());
                    return Ok(());
                }
                Err(RadioError::NotConnected(reason)) => {
                    log::warn!("connect attempt {attempt} refused: {reason}");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(LinkError::ConnectFailed {
            address: address.to_owned(),
            attempts: self.settings.max_connect_attempts,
        })
    }

    /// Release the peer link and power the radio interface down.
    ///
    /// Both steps are attempted even if the first fails, so the radio is
    /// never left half-released; the first failure is reported.
    pub async fn release(&mut self) -> Result<(), LinkError> {
        self.peer = None;
        let disconnected = self.radio.disconnect().await;
        let powered_off = self.radio.power_off().await;
        disconnected?;
        powered_off?;
        Ok(())
    }

    async fn reset_interface(&mut self) -> Result<(), LinkError> {
        self.radio.power_off().await?;
        self.radio.power_on().await?;
        Ok(())
    }
}

fn first_match<'a>(entries: &'a [ScanEntry], target: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|entry| entry.name.as_deref() == Some(target))
        .map(|entry| entry.address.as_str())
}
