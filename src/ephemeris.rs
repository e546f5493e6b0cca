// src/ephemeris.rs
//
// Uniform accessor over the ephemeris backend. The Swiss Ephemeris returns
// its primary longitude in different shapes depending on the call path and
// library configuration; this adapter is the only place that knows how to
// read them, so every caller sees a single longitude value and a single
// failure mode.

use std::sync::{Mutex, MutexGuard};

use gag::Gag;
use thiserror::Error;

use crate::{CelestialBody, JulianDay};

// ---------------------------
// ## Calculation Flags
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i32)]
pub enum Flag {
    JplEphemeris = 1,
    SwissEphemeris = 2,
    MoshierEphemeris = 4,
    TruePos = 16,
    HighPrecSpeed = 256,
}

pub fn combine(flags: &[Flag]) -> i32 {
    let mut iflag = 0;
    for f in flags {
        iflag |= *f as i32;
    }
    iflag
}

/// Swiss data source plus true geometric position. Preserved from the
/// original service for numeric compatibility.
pub const CHART_FLAGS: &[Flag] = &[Flag::SwissEphemeris, Flag::TruePos];

/// Placidus house system code.
pub const HOUSE_PLACIDUS: char = 'P';

// ---------------------------
// ## Result Shapes
// ---------------------------

/// The shapes a backend call may hand back. Closed set; extending it means
/// extending the one match in [`extract_longitude`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawPosition {
    /// Flat coordinate sequence, longitude first (`swe_calc_ut` output).
    Sequence(Vec<f64>),
    /// Single named longitude field.
    Named { longitude: f64 },
    /// Longitude nested inside a position record (house output).
    Nested { position: PositionRecord },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRecord {
    pub longitude: f64,
}

fn extract_longitude(raw: RawPosition, call: &'static str) -> Result<f64, AdapterError> {
    match raw {
        RawPosition::Sequence(values) => values
            .first()
            .copied()
            .ok_or(AdapterError::UnrecognizedShape { call }),
        RawPosition::Named { longitude } => Ok(longitude),
        RawPosition::Nested { position } => Ok(position.longitude),
    }
}

// ---------------------------
// ## Error Handling
// ---------------------------

/// Library-level failure, in the shape the Swiss Ephemeris reports it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("ephemeris error {code}: {message}")]
pub struct CalculationError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The backend returned a result the adapter cannot read a longitude
    /// from. Deterministic for a given input; never retried.
    #[error("unrecognized result shape from {call}")]
    UnrecognizedShape { call: &'static str },
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

// ---------------------------
// ## Backend Contract
// ---------------------------

/// What the ephemeris library must provide. Implemented over FFI by
/// [`crate::swisseph::SwissEph`]; tests substitute deterministic backends.
pub trait Ephemeris: Send + Sync {
    /// Julian day (UT) for a Gregorian calendar date and decimal hour.
    fn julian_day(&self, year: i32, month: u32, day: u32, ut_hour: f64) -> JulianDay;

    /// Geocentric position of a classical body.
    fn body_position(
        &self,
        julian_day: JulianDay,
        body: CelestialBody,
        iflag: i32,
    ) -> Result<RawPosition, CalculationError>;

    /// Position of the ascending lunar node (true node).
    fn node_position(
        &self,
        julian_day: JulianDay,
        iflag: i32,
    ) -> Result<RawPosition, CalculationError>;

    /// House calculation for a location; the primary value is the ascendant.
    fn houses(
        &self,
        julian_day: JulianDay,
        iflag: i32,
        latitude: f64,
        longitude: f64,
        house_system: char,
    ) -> Result<RawPosition, CalculationError>;

    /// Sidereal offset in degrees at a Julian day. Drifts with time, so it
    /// is queried per moment and never cached.
    fn ayanamsa(&self, julian_day: JulianDay) -> f64;
}

// ---------------------------
// ## Adapter
// ---------------------------

// The library keeps one global computational context keyed by date; call
// chains from concurrent requests must not interleave.
static EPHEMERIS_LOCK: Mutex<()> = Mutex::new(());

pub struct EphemerisAdapter {
    backend: Box<dyn Ephemeris>,
}

impl EphemerisAdapter {
    pub fn new(backend: Box<dyn Ephemeris>) -> Self {
        EphemerisAdapter { backend }
    }

    /// Exclusive access to the ephemeris context for one request's chain of
    /// calls. Held for the whole assembly sequence.
    pub fn session(&self) -> EphemerisSession<'_> {
        EphemerisSession {
            backend: self.backend.as_ref(),
            _guard: EPHEMERIS_LOCK.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }
}

pub struct EphemerisSession<'a> {
    backend: &'a dyn Ephemeris,
    _guard: MutexGuard<'static, ()>,
}

impl EphemerisSession<'_> {
    pub fn julian_day(&self, year: i32, month: u32, day: u32, ut_hour: f64) -> JulianDay {
        self.quiet(|b| b.julian_day(year, month, day, ut_hour))
    }

    pub fn ayanamsa(&self, julian_day: JulianDay) -> f64 {
        self.quiet(|b| b.ayanamsa(julian_day))
    }

    pub fn body_longitude(
        &self,
        julian_day: JulianDay,
        body: CelestialBody,
        iflag: i32,
    ) -> Result<f64, AdapterError> {
        let raw = self.quiet(|b| b.body_position(julian_day, body, iflag))?;
        extract_longitude(raw, "body_position")
    }

    pub fn node_longitude(&self, julian_day: JulianDay, iflag: i32) -> Result<f64, AdapterError> {
        let raw = self.quiet(|b| b.node_position(julian_day, iflag))?;
        extract_longitude(raw, "node_position")
    }

    pub fn ascendant_longitude(
        &self,
        julian_day: JulianDay,
        iflag: i32,
        latitude: f64,
        longitude: f64,
        house_system: char,
    ) -> Result<f64, AdapterError> {
        let raw =
            self.quiet(|b| b.houses(julian_day, iflag, latitude, longitude, house_system))?;
        extract_longitude(raw, "houses")
    }

    // The library writes diagnostic text to the process stdout during
    // calls. The gag lives exactly as long as the call, dropping on every
    // exit path.
    fn quiet<T>(&self, f: impl FnOnce(&dyn Ephemeris) -> T) -> T {
        let _silence = Gag::stdout().ok();
        f(self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Backend that answers every call with a configurable shape around one
    /// longitude value.
    struct ShapeBackend {
        shape: fn(f64) -> RawPosition,
        longitude: f64,
    }

    impl Ephemeris for ShapeBackend {
        fn julian_day(&self, _: i32, _: u32, _: u32, _: f64) -> JulianDay {
            2451545.0
        }
        fn body_position(
            &self,
            _: JulianDay,
            _: CelestialBody,
            _: i32,
        ) -> Result<RawPosition, CalculationError> {
            Ok((self.shape)(self.longitude))
        }
        fn node_position(&self, _: JulianDay, _: i32) -> Result<RawPosition, CalculationError> {
            Ok((self.shape)(self.longitude))
        }
        fn houses(
            &self,
            _: JulianDay,
            _: i32,
            _: f64,
            _: f64,
            _: char,
        ) -> Result<RawPosition, CalculationError> {
            Ok((self.shape)(self.longitude))
        }
        fn ayanamsa(&self, _: JulianDay) -> f64 {
            23.85
        }
    }

    fn adapter_with_shape(shape: fn(f64) -> RawPosition) -> EphemerisAdapter {
        EphemerisAdapter::new(Box::new(ShapeBackend {
            shape,
            longitude: 123.456,
        }))
    }

    #[test]
    fn every_documented_shape_yields_the_same_longitude() {
        let shapes: [fn(f64) -> RawPosition; 3] = [
            |lon| RawPosition::Sequence(vec![lon, 0.0, 1.0, 0.0, 0.0, 0.0]),
            |lon| RawPosition::Named { longitude: lon },
            |lon| RawPosition::Nested {
                position: PositionRecord { longitude: lon },
            },
        ];
        for shape in shapes {
            let adapter = adapter_with_shape(shape);
            let session = adapter.session();
            let lon = session
                .body_longitude(2451545.0, CelestialBody::Sun, combine(CHART_FLAGS))
                .unwrap();
            assert_relative_eq!(lon, 123.456);
            let node = session.node_longitude(2451545.0, combine(CHART_FLAGS)).unwrap();
            assert_relative_eq!(node, 123.456);
            let asc = session
                .ascendant_longitude(2451545.0, 0, 28.6, 77.2, HOUSE_PLACIDUS)
                .unwrap();
            assert_relative_eq!(asc, 123.456);
        }
    }

    #[test]
    fn empty_sequence_is_an_unrecognized_shape() {
        let adapter = adapter_with_shape(|_| RawPosition::Sequence(Vec::new()));
        let session = adapter.session();
        let err = session
            .body_longitude(2451545.0, CelestialBody::Sun, 0)
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnrecognizedShape { .. }));
    }

    #[test]
    fn backend_failures_pass_through_as_calculation_errors() {
        struct FailingBackend;
        impl Ephemeris for FailingBackend {
            fn julian_day(&self, _: i32, _: u32, _: u32, _: f64) -> JulianDay {
                2451545.0
            }
            fn body_position(
                &self,
                _: JulianDay,
                _: CelestialBody,
                _: i32,
            ) -> Result<RawPosition, CalculationError> {
                Err(CalculationError {
                    code: -1,
                    message: "ephemeris file not found".to_string(),
                })
            }
            fn node_position(&self, _: JulianDay, _: i32) -> Result<RawPosition, CalculationError> {
                self.body_position(0.0, CelestialBody::Rahu, 0)
            }
            fn houses(
                &self,
                _: JulianDay,
                _: i32,
                _: f64,
                _: f64,
                _: char,
            ) -> Result<RawPosition, CalculationError> {
                self.body_position(0.0, CelestialBody::Sun, 0)
            }
            fn ayanamsa(&self, _: JulianDay) -> f64 {
                0.0
            }
        }

        let adapter = EphemerisAdapter::new(Box::new(FailingBackend));
        let err = adapter
            .session()
            .body_longitude(2451545.0, CelestialBody::Mars, 0)
            .unwrap_err();
        match err {
            AdapterError::Calculation(inner) => {
                assert_eq!(inner.code, -1);
                assert!(inner.message.contains("not found"));
            }
            other => panic!("expected calculation error, got {:?}", other),
        }
    }

    #[test]
    fn combine_ors_flag_bits() {
        assert_eq!(combine(CHART_FLAGS), 2 | 16);
        assert_eq!(combine(&[]), 0);
        assert_eq!(combine(&[Flag::HighPrecSpeed]), 256);
    }
}
