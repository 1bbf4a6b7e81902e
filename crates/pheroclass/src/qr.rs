//! QR attendance handshake
//!
//! The teacher shows `{"lectureId": <id>, "classAddress": "<0x…>"}` as a QR
//! code; the student's scanner decodes it and hands it to the dashboard.
//! Nothing binds the payload to the transaction that follows: the class check
//! on the student side is a UI guard only.

use anyhow::{Result, anyhow};
use pheroclass_classroom::ContractAddress;
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Could not parse QR code data. Please try again.")]
    Unreadable(String),

    #[error("Invalid QR code format. Please scan a valid attendance QR code.")]
    InvalidFormat,
}

/// What an attendance QR code carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendancePayload {
    pub lecture_id: u64,
    pub class_address: ContractAddress,
}

impl AttendancePayload {
    pub fn new(class_address: ContractAddress, lecture_id: u64) -> Self {
        Self {
            lecture_id,
            class_address,
        }
    }

    /// JSON text put into the QR code
    pub fn encode(&self) -> String {
        json!({
            "lectureId": self.lecture_id,
            "classAddress": self.class_address.as_str(),
        })
        .to_string()
    }

    /// The QR code as terminal text, two modules per character row
    pub fn render(&self) -> Result<String> {
        let code = QrCode::new(self.encode().as_bytes()).map_err(|e| anyhow!("Failed to build QR code: {}", e))?;
        Ok(code
            .render::<Dense1x2>()
            .dark_color(Dense1x2::Light)
            .light_color(Dense1x2::Dark)
            .build())
    }

    /// Decode what a scanner read
    ///
    /// Accepts the bare JSON, a scanner result wrapping it as `{"text": …}`,
    /// and a lecture id given as a number or a numeric string. Both keys must
    /// be present.
    pub fn decode(raw: &str) -> Result<Self, ScanError> {
        let value = unwrap_envelope(parse_json(raw.trim())?)?;

        let lecture_id = match value.get("lectureId") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
        .ok_or(ScanError::InvalidFormat)?;

        let class_address = value
            .get("classAddress")
            .and_then(Value::as_str)
            .and_then(|s| ContractAddress::parse(s).ok())
            .ok_or(ScanError::InvalidFormat)?;

        Ok(Self {
            lecture_id,
            class_address,
        })
    }
}

fn parse_json(text: &str) -> Result<Value, ScanError> {
    serde_json::from_str(text).map_err(|e| ScanError::Unreadable(e.to_string()))
}

fn unwrap_envelope(value: Value) -> Result<Value, ScanError> {
    if let Value::String(inner) = &value {
        return parse_json(inner);
    }
    if value.get("lectureId").is_none() {
        match value.get("text") {
            Some(Value::String(inner)) => return parse_json(inner),
            Some(inner @ Value::Object(_)) => return Ok(inner.clone()),
            _ => {}
        }
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    Decoded(AttendancePayload),
    Failed(String),
}

/// Scanner popup state: `Scanning → Decoded | Failed`, with retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrScanner {
    state: ScanState,
}

impl Default for QrScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl QrScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Feed one scanner read
    ///
    /// Reads arriving after the scanner left `Scanning` are ignored.
    pub fn scan(&mut self, raw: &str) -> Option<Result<AttendancePayload, ScanError>> {
        if self.state != ScanState::Scanning {
            return None;
        }
        let decoded = AttendancePayload::decode(raw);
        match &decoded {
            Ok(payload) => {
                debug!("Decoded attendance QR for lecture {} of {}", payload.lecture_id, payload.class_address);
                self.state = ScanState::Decoded(payload.clone());
            }
            Err(e) => {
                debug!("Rejected QR read: {:?}", e);
                self.state = ScanState::Failed(e.to_string());
            }
        }
        Some(decoded)
    }

    /// The camera could not be used
    pub fn camera_failed(&mut self, message: impl Into<String>) {
        self.state = ScanState::Failed(message.into());
    }

    pub fn retry(&mut self) {
        self.state = ScanState::Scanning;
    }
}
