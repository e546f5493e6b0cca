#![allow(dead_code)]

use vedic_signs::ephemeris::{CalculationError, Ephemeris, PositionRecord, RawPosition};
use vedic_signs::{CelestialBody, JulianDay};

pub const STUB_AYANAMSA: f64 = 23.85;

/// Deterministic backend: a fixed tropical longitude per body, served in a
/// different raw shape per call path so tests exercise the adapter's
/// normalization as a side effect.
pub struct StubEphemeris {
    fail_body: Option<CelestialBody>,
}

impl StubEphemeris {
    pub fn new() -> Self {
        StubEphemeris { fail_body: None }
    }

    pub fn failing_on(body: CelestialBody) -> Self {
        StubEphemeris {
            fail_body: Some(body),
        }
    }

    pub fn tropical_longitude(body: CelestialBody) -> f64 {
        match body {
            CelestialBody::Sun => 280.5,
            CelestialBody::Moon => 123.4,
            CelestialBody::Mercury => 295.0,
            CelestialBody::Venus => 250.75,
            CelestialBody::Mars => 210.2,
            CelestialBody::Jupiter => 35.6,
            CelestialBody::Saturn => 40.1,
            CelestialBody::Rahu | CelestialBody::Ketu => 100.0,
        }
    }

    pub const ASCENDANT: f64 = 200.0;
}

impl Ephemeris for StubEphemeris {
    // Standard Gregorian Julian day arithmetic (Meeus), good enough for a
    // deterministic stand-in.
    fn julian_day(&self, year: i32, month: u32, day: u32, ut_hour: f64) -> JulianDay {
        let (y, m) = if month <= 2 {
            (year - 1, month + 12)
        } else {
            (year, month)
        };
        let a = (y as f64 / 100.0).floor();
        let b = 2.0 - a + (a / 4.0).floor();
        (365.25 * (y as f64 + 4716.0)).floor() + (30.6001 * (m as f64 + 1.0)).floor()
            + day as f64
            + b
            - 1524.5
            + ut_hour / 24.0
    }

    fn body_position(
        &self,
        _julian_day: JulianDay,
        body: CelestialBody,
        _iflag: i32,
    ) -> Result<RawPosition, CalculationError> {
        if self.fail_body == Some(body) {
            return Err(CalculationError {
                code: -1,
                message: format!("stub failure for {}", body),
            });
        }
        Ok(RawPosition::Sequence(vec![
            Self::tropical_longitude(body),
            0.0,
            1.0,
            0.0,
            0.0,
            0.0,
        ]))
    }

    fn node_position(
        &self,
        _julian_day: JulianDay,
        _iflag: i32,
    ) -> Result<RawPosition, CalculationError> {
        if self.fail_body == Some(CelestialBody::Rahu) {
            return Err(CalculationError {
                code: -1,
                message: "stub failure for the node".to_string(),
            });
        }
        Ok(RawPosition::Named {
            longitude: Self::tropical_longitude(CelestialBody::Rahu),
        })
    }

    fn houses(
        &self,
        _julian_day: JulianDay,
        _iflag: i32,
        _latitude: f64,
        _longitude: f64,
        _house_system: char,
    ) -> Result<RawPosition, CalculationError> {
        Ok(RawPosition::Nested {
            position: PositionRecord {
                longitude: Self::ASCENDANT,
            },
        })
    }

    fn ayanamsa(&self, _julian_day: JulianDay) -> f64 {
        STUB_AYANAMSA
    }
}
