// src/swisseph.rs
//
// FFI backend over the Swiss Ephemeris C library. Built only with the
// `swisseph` feature; links the system `libswe`.

use std::ffi::CString;
use std::os::raw::{c_char, c_double, c_int};
use std::path::{Path, PathBuf};
use std::ptr;
use std::str;

use crate::ephemeris::{CalculationError, Ephemeris, PositionRecord, RawPosition};
use crate::{CelestialBody, JulianDay};

const MAXCH: usize = 256;

// Swiss Ephemeris functions
mod bindings {
    use super::*;

    #[link(name = "swe")]
    extern "C" {
        pub fn swe_set_ephe_path(path: *const c_char);
        pub fn swe_set_sid_mode(sid_mode: c_int, t0: c_double, ayan_t0: c_double);
        pub fn swe_julday(
            year: c_int,
            month: c_int,
            day: c_int,
            hour: c_double,
            gregflag: c_int,
        ) -> c_double;
        pub fn swe_calc_ut(
            tjd_ut: c_double,
            ipl: c_int,
            iflag: c_int,
            xx: *mut c_double,
            serr: *mut c_char,
        ) -> c_int;
        pub fn swe_houses_ex(
            tjd_ut: c_double,
            iflag: c_int,
            geolat: c_double,
            geolon: c_double,
            hsys: c_int,
            cusps: *mut c_double,
            ascmc: *mut c_double,
        ) -> c_int;
        pub fn swe_get_ayanamsa_ut(tjd_ut: c_double) -> c_double;
    }
}

use bindings::*;

// Constants for Swiss Ephemeris
pub const SE_GREG_CAL: c_int = 1;
pub const SE_SIDM_LAHIRI: c_int = 1;
pub const SE_TRUE_NODE: c_int = 11;

pub struct SwissEph {
    _ephe_path: Option<PathBuf>,
}

impl SwissEph {
    /// The data path and sidereal mode are process-wide inside the C
    /// library; both are set once here and never touched again.
    pub fn new(ephe_path: Option<&Path>) -> Result<Self, CalculationError> {
        match ephe_path {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(CalculationError {
                        code: -1,
                        message: format!(
                            "ephemeris path is not a directory: {}",
                            dir.display()
                        ),
                    });
                }
                let c_path =
                    CString::new(dir.to_string_lossy().as_bytes()).map_err(|_| {
                        CalculationError {
                            code: -1,
                            message: "ephemeris path contains a NUL byte".to_string(),
                        }
                    })?;
                unsafe { swe_set_ephe_path(c_path.as_ptr()) };
            }
            None => unsafe { swe_set_ephe_path(ptr::null()) },
        }
        unsafe { swe_set_sid_mode(SE_SIDM_LAHIRI, 0.0, 0.0) };
        Ok(SwissEph {
            _ephe_path: ephe_path.map(Path::to_path_buf),
        })
    }

    fn calc_ut(
        &self,
        julian_day: JulianDay,
        ipl: c_int,
        iflag: c_int,
    ) -> Result<RawPosition, CalculationError> {
        let mut results: [c_double; 6] = [0.0; 6];
        let mut error: [u8; MAXCH] = [0; MAXCH];
        let code = unsafe {
            swe_calc_ut(
                julian_day,
                ipl,
                iflag,
                results.as_mut_ptr(),
                error.as_mut_ptr() as *mut c_char,
            )
        };
        if code < 0 {
            let message = str::from_utf8(&error)
                .unwrap_or_default()
                .trim_end_matches('\0')
                .to_string();
            return Err(CalculationError { code, message });
        }
        Ok(RawPosition::Sequence(results.to_vec()))
    }
}

impl Ephemeris for SwissEph {
    fn julian_day(&self, year: i32, month: u32, day: u32, ut_hour: f64) -> JulianDay {
        unsafe { swe_julday(year, month as c_int, day as c_int, ut_hour, SE_GREG_CAL) }
    }

    fn body_position(
        &self,
        julian_day: JulianDay,
        body: CelestialBody,
        iflag: i32,
    ) -> Result<RawPosition, CalculationError> {
        match body {
            // Ketu has no ephemeris id; it is derived from Rahu upstream.
            CelestialBody::Ketu => Err(CalculationError {
                code: -1,
                message: "Ketu is derived from the node, not computed directly".to_string(),
            }),
            CelestialBody::Rahu => self.calc_ut(julian_day, SE_TRUE_NODE, iflag),
            _ => self.calc_ut(julian_day, body as c_int, iflag),
        }
    }

    fn node_position(
        &self,
        julian_day: JulianDay,
        iflag: i32,
    ) -> Result<RawPosition, CalculationError> {
        self.calc_ut(julian_day, SE_TRUE_NODE, iflag)
    }

    fn houses(
        &self,
        julian_day: JulianDay,
        iflag: i32,
        latitude: f64,
        longitude: f64,
        house_system: char,
    ) -> Result<RawPosition, CalculationError> {
        let mut cusps: [c_double; 13] = [0.0; 13];
        let mut ascmc: [c_double; 10] = [0.0; 10];
        let code = unsafe {
            swe_houses_ex(
                julian_day,
                iflag,
                latitude,
                longitude,
                house_system as c_int,
                cusps.as_mut_ptr(),
                ascmc.as_mut_ptr(),
            )
        };
        if code < 0 {
            return Err(CalculationError {
                code,
                message: "error calculating houses".to_string(),
            });
        }
        Ok(RawPosition::Nested {
            position: PositionRecord {
                longitude: ascmc[0],
            },
        })
    }

    fn ayanamsa(&self, julian_day: JulianDay) -> f64 {
        unsafe { swe_get_ayanamsa_ut(julian_day) }
    }
}
