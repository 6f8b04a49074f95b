//! Simulated IoT telemetry store.

use std::sync::Arc;

use agri_core::models::tenant::TenantId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::IntegrationError;
use crate::store::{self, TenantStore};

/// Readings returned when the caller gives no limit.
pub const DEFAULT_READINGS: usize = 20;

/// Oldest readings are dropped once a device holds this many.
pub const MAX_READINGS_PER_DEVICE: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub light_intensity: Option<f64>,
}

/// A reading as sent by a device. Devices without a clock may omit the
/// timestamp; the time of receipt is used instead.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingReading {
    pub device_id: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub soil_moisture: Option<f64>,
    #[serde(default)]
    pub light_intensity: Option<f64>,
}

fn device_key(device_id: &str) -> String {
    format!("iot:{device_id}")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub struct TelemetryStore {
    store: Arc<dyn TenantStore>,
}

impl TelemetryStore {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    pub fn ingest(
        &self,
        tenant_id: TenantId,
        reading: IncomingReading,
    ) -> Result<SensorReading, IntegrationError> {
        if reading.device_id.trim().is_empty() {
            return Err(IntegrationError::InvalidInput(
                "device_id must not be empty".into(),
            ));
        }

        let reading = SensorReading {
            timestamp: reading.timestamp.unwrap_or_else(Utc::now),
            device_id: reading.device_id,
            temperature: reading.temperature,
            humidity: reading.humidity,
            soil_moisture: reading.soil_moisture,
            light_intensity: reading.light_intensity,
        };

        store::modify(
            self.store.as_ref(),
            tenant_id,
            &device_key(&reading.device_id),
            |series: &mut Vec<SensorReading>| {
                series.push(reading.clone());
                store::retain_latest(series, MAX_READINGS_PER_DEVICE);
                Ok(())
            },
        )?;

        debug!(tenant_id, device_id = %reading.device_id, "IoT reading stored");
        Ok(reading)
    }

    /// The latest `limit` readings for a device, oldest first.
    pub fn readings(
        &self,
        tenant_id: TenantId,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<SensorReading>, IntegrationError> {
        let series: Vec<SensorReading> =
            store::load(self.store.as_ref(), tenant_id, &device_key(device_id))?;
        if series.is_empty() {
            return Err(IntegrationError::NoReadings {
                device_id: device_id.to_string(),
            });
        }
        let skip = series.len().saturating_sub(limit);
        Ok(series.into_iter().skip(skip).collect())
    }

    /// Fill an empty device with a synthetic series at 5-minute spacing
    /// ending now. Returns the number of readings written; a device that
    /// already has data is left alone.
    pub fn seed_demo_series(
        &self,
        tenant_id: TenantId,
        device_id: &str,
        points: usize,
    ) -> Result<usize, IntegrationError> {
        let now = Utc::now();
        let written = store::modify(
            self.store.as_ref(),
            tenant_id,
            &device_key(device_id),
            |series: &mut Vec<SensorReading>| {
                if !series.is_empty() {
                    return Ok(0);
                }
                for i in 0..points {
                    let step = i as f64;
                    let minutes_back = ((points - 1 - i) * 5) as i64;
                    series.push(SensorReading {
                        device_id: device_id.to_string(),
                        timestamp: now - Duration::minutes(minutes_back),
                        temperature: Some(round2(20.0 + step * 0.5 + (i % 3) as f64)),
                        humidity: Some(round2(50.0 + step * 0.3 + (i % 2) as f64)),
                        soil_moisture: Some(round2(30.0 + step * 0.2 + (i % 4) as f64)),
                        light_intensity: None,
                    });
                }
                Ok(points)
            },
        )?;

        if written > 0 {
            info!(tenant_id, device_id, points = written, "Demo IoT series seeded");
        }
        Ok(written)
    }
}
