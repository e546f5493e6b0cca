// src/chart.rs

use tracing::debug;

use crate::ephemeris::{combine, EphemerisAdapter, CHART_FLAGS, HOUSE_PLACIDUS};
use crate::{to_sidereal, CelestialBody, ChartError, Location, Moment, ZodiacPlacement};

/// One placement per body, node, and the ascendant. Built fresh for every
/// request and discarded after serialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chart {
    pub sun: ZodiacPlacement,
    pub moon: ZodiacPlacement,
    pub mercury: ZodiacPlacement,
    pub venus: ZodiacPlacement,
    pub mars: ZodiacPlacement,
    pub jupiter: ZodiacPlacement,
    pub saturn: ZodiacPlacement,
    pub rahu: ZodiacPlacement,
    pub ketu: ZodiacPlacement,
    pub ascendant: ZodiacPlacement,
}

pub struct ChartAssembler {
    adapter: EphemerisAdapter,
}

impl ChartAssembler {
    pub fn new(adapter: EphemerisAdapter) -> Self {
        ChartAssembler { adapter }
    }

    /// Assembly is fail-fast: the first body that cannot be computed aborts
    /// the whole request. No partial charts.
    pub fn assemble(&self, moment: &Moment, location: &Location) -> Result<Chart, ChartError> {
        let iflag = combine(CHART_FLAGS);
        // One session holds the ephemeris context for the whole chain.
        let eph = self.adapter.session();

        let julian_day = eph.julian_day(moment.year, moment.month, moment.day, moment.ut_hour());
        let ayanamsa = eph.ayanamsa(julian_day);
        debug!(julian_day, ayanamsa, "assembling chart");

        let place = |body: CelestialBody| -> Result<ZodiacPlacement, ChartError> {
            let tropical = eph.body_longitude(julian_day, body, iflag)?;
            Ok(ZodiacPlacement::from_longitude(to_sidereal(
                tropical, ayanamsa,
            )))
        };

        let sun = place(CelestialBody::Sun)?;
        let moon = place(CelestialBody::Moon)?;
        let mercury = place(CelestialBody::Mercury)?;
        let venus = place(CelestialBody::Venus)?;
        let mars = place(CelestialBody::Mars)?;
        let jupiter = place(CelestialBody::Jupiter)?;
        let saturn = place(CelestialBody::Saturn)?;

        // Rahu from the ascending node; Ketu sits exactly opposite.
        let rahu_longitude = to_sidereal(eph.node_longitude(julian_day, iflag)?, ayanamsa);
        let ketu_longitude = (rahu_longitude + 180.0).rem_euclid(360.0);

        let ascendant_longitude = to_sidereal(
            eph.ascendant_longitude(
                julian_day,
                iflag,
                location.latitude,
                location.longitude,
                HOUSE_PLACIDUS,
            )?,
            ayanamsa,
        );

        Ok(Chart {
            sun,
            moon,
            mercury,
            venus,
            mars,
            jupiter,
            saturn,
            rahu: ZodiacPlacement::from_longitude(rahu_longitude),
            ketu: ZodiacPlacement::from_longitude(ketu_longitude),
            ascendant: ZodiacPlacement::from_longitude(ascendant_longitude),
        })
    }
}
