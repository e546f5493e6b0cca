// src/lib.rs

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

pub mod chart;
pub mod ephemeris;
pub mod routes;
#[cfg(feature = "swisseph")]
pub mod swisseph;

pub type JulianDay = f64;

/// Arc of one nakshatra. 27 equal lunar mansions span the ecliptic, so the
/// width must be the exact quotient; a truncated decimal constant drifts
/// into the wrong bucket near the edges.
pub const NAKSHATRA_ARC: f64 = 360.0 / 27.0;

/// Arc of one zodiac sign.
pub const SIGN_ARC: f64 = 30.0;

// ---------------------------
// ## Enumerations
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CelestialBody {
    Sun = 0,
    Moon = 1,
    Mercury = 2,
    Venus = 3,
    Mars = 4,
    Jupiter = 5,
    Saturn = 6,
    Rahu = 11,
    Ketu = 999,
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Rahu => "Rahu",
            CelestialBody::Ketu => "Ketu",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ZodiacSign {
    Aries = 0,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Sign occupied by a sidereal longitude. Input is reduced into
    /// [0, 360) first, so negative longitudes cannot land in a negative
    /// bucket.
    pub fn from_longitude(longitude: f64) -> Self {
        let normalized_longitude = longitude.rem_euclid(360.0);
        let sign_index = (normalized_longitude / SIGN_ARC).floor() as usize;
        match sign_index {
            0 => ZodiacSign::Aries,
            1 => ZodiacSign::Taurus,
            2 => ZodiacSign::Gemini,
            3 => ZodiacSign::Cancer,
            4 => ZodiacSign::Leo,
            5 => ZodiacSign::Virgo,
            6 => ZodiacSign::Libra,
            7 => ZodiacSign::Scorpio,
            8 => ZodiacSign::Sagittarius,
            9 => ZodiacSign::Capricorn,
            10 => ZodiacSign::Aquarius,
            11 => ZodiacSign::Pisces,
            _ => ZodiacSign::Aries, // Fallback
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign_str = match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        };
        write!(f, "{}", sign_str)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Nakshatra {
    Ashwini = 0,
    Bharani,
    Krittika,
    Rohini,
    Mrigashira,
    Ardra,
    Punarvasu,
    Pushya,
    Ashlesha,
    Magha,
    PurvaPhalguni,
    UttaraPhalguni,
    Hasta,
    Chitra,
    Swati,
    Vishakha,
    Anuradha,
    Jyeshtha,
    Moola,
    PurvaAshadha,
    UttaraAshadha,
    Shravana,
    Dhanishta,
    Shatabhisha,
    PurvaBhadrapada,
    UttaraBhadrapada,
    Revati,
}

impl Nakshatra {
    pub fn from_longitude(longitude: f64) -> Nakshatra {
        let normalized_longitude = longitude.rem_euclid(360.0);
        let nakshatra_index = (normalized_longitude / NAKSHATRA_ARC).floor() as usize;
        match nakshatra_index {
            0 => Nakshatra::Ashwini,
            1 => Nakshatra::Bharani,
            2 => Nakshatra::Krittika,
            3 => Nakshatra::Rohini,
            4 => Nakshatra::Mrigashira,
            5 => Nakshatra::Ardra,
            6 => Nakshatra::Punarvasu,
            7 => Nakshatra::Pushya,
            8 => Nakshatra::Ashlesha,
            9 => Nakshatra::Magha,
            10 => Nakshatra::PurvaPhalguni,
            11 => Nakshatra::UttaraPhalguni,
            12 => Nakshatra::Hasta,
            13 => Nakshatra::Chitra,
            14 => Nakshatra::Swati,
            15 => Nakshatra::Vishakha,
            16 => Nakshatra::Anuradha,
            17 => Nakshatra::Jyeshtha,
            18 => Nakshatra::Moola,
            19 => Nakshatra::PurvaAshadha,
            20 => Nakshatra::UttaraAshadha,
            21 => Nakshatra::Shravana,
            22 => Nakshatra::Dhanishta,
            23 => Nakshatra::Shatabhisha,
            24 => Nakshatra::PurvaBhadrapada,
            25 => Nakshatra::UttaraBhadrapada,
            26 => Nakshatra::Revati,
            _ => Nakshatra::Ashwini, // Fallback
        }
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Nakshatra::Ashwini => "Ashwini",
            Nakshatra::Bharani => "Bharani",
            Nakshatra::Krittika => "Krittika",
            Nakshatra::Rohini => "Rohini",
            Nakshatra::Mrigashira => "Mrigashira",
            Nakshatra::Ardra => "Ardra",
            Nakshatra::Punarvasu => "Punarvasu",
            Nakshatra::Pushya => "Pushya",
            Nakshatra::Ashlesha => "Ashlesha",
            Nakshatra::Magha => "Magha",
            Nakshatra::PurvaPhalguni => "Purva Phalguni",
            Nakshatra::UttaraPhalguni => "Uttara Phalguni",
            Nakshatra::Hasta => "Hasta",
            Nakshatra::Chitra => "Chitra",
            Nakshatra::Swati => "Swati",
            Nakshatra::Vishakha => "Vishakha",
            Nakshatra::Anuradha => "Anuradha",
            Nakshatra::Jyeshtha => "Jyeshtha",
            Nakshatra::Moola => "Moola",
            Nakshatra::PurvaAshadha => "Purva Ashadha",
            Nakshatra::UttaraAshadha => "Uttara Ashadha",
            Nakshatra::Shravana => "Shravana",
            Nakshatra::Dhanishta => "Dhanishta",
            Nakshatra::Shatabhisha => "Shatabhisha",
            Nakshatra::PurvaBhadrapada => "Purva Bhadrapada",
            Nakshatra::UttaraBhadrapada => "Uttara Bhadrapada",
            Nakshatra::Revati => "Revati",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------
// ## Structures
// ---------------------------

/// Sidereal placement of a single body: sign, nakshatra, and the degrees
/// into each. Derived from a longitude, immutable, recomputed per request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZodiacPlacement {
    pub sign: ZodiacSign,
    pub degree_in_sign: f64,
    pub nakshatra: Nakshatra,
    pub degree_in_nakshatra: f64,
}

impl ZodiacPlacement {
    pub fn from_longitude(longitude: f64) -> Self {
        let lon = longitude.rem_euclid(360.0);
        ZodiacPlacement {
            sign: ZodiacSign::from_longitude(lon),
            degree_in_sign: lon % SIGN_ARC,
            nakshatra: Nakshatra::from_longitude(lon),
            degree_in_nakshatra: lon % NAKSHATRA_ARC,
        }
    }
}

/// Tropical longitude shifted onto the sidereal zodiac. Total for any
/// ayanamsa up to 360 degrees; the subtraction may go negative and is
/// reduced back into [0, 360).
pub fn to_sidereal(tropical_longitude: f64, ayanamsa: f64) -> f64 {
    (tropical_longitude - ayanamsa).rem_euclid(360.0)
}

/// Birth instant as supplied by the caller: calendar date, wall-clock time,
/// and a flat UTC offset in hours. No zone rules, no daylight saving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moment {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub utc_offset_hours: f64,
}

impl Moment {
    pub fn parse(date: &str, time: &str, utc_offset_hours: f64) -> Result<Self, ChartError> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ChartError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", date))
        })?;
        let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            ChartError::Validation(format!("invalid time '{}', expected HH:MM", time))
        })?;
        Ok(Moment {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            hour: time.hour(),
            minute: time.minute(),
            utc_offset_hours,
        })
    }

    /// Decimal UT hour: wall clock minus the UTC offset. May leave [0, 24);
    /// the Julian day conversion absorbs the overflow.
    pub fn ut_hour(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0 - self.utc_offset_hours
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ChartError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ChartError::Validation(format!(
                "latitude {} out of range [-90, 90]",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ChartError::Validation(format!(
                "longitude {} out of range [-180, 180]",
                longitude
            )));
        }
        Ok(Location {
            latitude,
            longitude,
        })
    }

    pub fn delhi() -> Self {
        Location {
            latitude: 28.6139,
            longitude: 77.2090,
        }
    }
}

// ---------------------------
// ## Error Handling
// ---------------------------

#[derive(Debug, Error)]
pub enum ChartError {
    /// Required input missing or malformed. Surfaced as HTTP 400.
    #[error("{0}")]
    Validation(String),
    /// Ephemeris-side failure, shape or library. Surfaced as HTTP 500.
    #[error(transparent)]
    Adapter(#[from] ephemeris::AdapterError),
}
