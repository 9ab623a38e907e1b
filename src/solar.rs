//! Default astronomical calculator and coordinate timezone resolution.
//!
//! Produces the full fourteen-key sun phase table for a calendar day at a
//! position. The named horizon crossings come from the `sunrise` crate;
//! solar noon and nadir from the rise/set midpoint; the two altitude pairs
//! the crate has no named event for (sunrise end / sunset start at −0.3°,
//! golden hour at +6°) from the day's solar declination and the hour-angle
//! relation, anchored on the computed noon. Events that do not occur on the
//! given day (polar conditions) are omitted from the table rather than
//! fabricated.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};
use tzf_rs::DefaultFinder;

use crate::phases::{PhaseCalculator, PhaseTimes};

/// Shared timezone finder. Construction parses the embedded polygon data,
/// so it happens once.
static FINDER: Lazy<DefaultFinder> = Lazy::new(DefaultFinder::new);

/// Sun altitude at which the upper limb leaves the horizon entirely
/// (sunrise end / sunset start).
const SUN_CLEAR_OF_HORIZON_DEG: f64 = -0.3;

/// Sun altitude bounding the golden hour.
const GOLDEN_HOUR_DEG: f64 = 6.0;

/// Resolve the IANA timezone for a coordinate pair, falling back to UTC
/// when the reported name cannot be parsed.
pub fn determine_timezone_from_coordinates(latitude: f64, longitude: f64) -> Tz {
    FINDER
        .get_tz_name(longitude, latitude)
        .parse()
        .unwrap_or(Tz::UTC)
}

/// The bundled [`PhaseCalculator`] implementation.
pub struct SunCalculator;

impl PhaseCalculator for SunCalculator {
    fn phase_times(&self, now: DateTime<Utc>, latitude: f64, longitude: f64) -> Option<PhaseTimes> {
        let coord = Coordinates::new(latitude, longitude)?;
        let date = now.date_naive();
        let day = SolarDay::new(coord, date);

        let sunrise = day.event_time(SolarEvent::Sunrise);
        let sunset = day.event_time(SolarEvent::Sunset);

        let mut times = PhaseTimes::new();
        times.insert("sunrise", sunrise);
        times.insert("sunset", sunset);
        times.insert("dawn", day.event_time(SolarEvent::Dawn(DawnType::Civil)));
        times.insert("dusk", day.event_time(SolarEvent::Dusk(DawnType::Civil)));
        times.insert(
            "nauticalDawn",
            day.event_time(SolarEvent::Dawn(DawnType::Nautical)),
        );
        times.insert(
            "nauticalDusk",
            day.event_time(SolarEvent::Dusk(DawnType::Nautical)),
        );
        times.insert(
            "nightEnd",
            day.event_time(SolarEvent::Dawn(DawnType::Astronomical)),
        );
        times.insert(
            "night",
            day.event_time(SolarEvent::Dusk(DawnType::Astronomical)),
        );

        // Solar noon from the rise/set midpoint; nadir half a day earlier.
        let noon = sunrise + (sunset - sunrise) / 2;
        times.insert("solarNoon", noon);
        times.insert("nadir", noon - Duration::hours(12));

        let declination = solar_declination(date);
        if let Some(half) = hour_angle_offset(latitude, declination, SUN_CLEAR_OF_HORIZON_DEG) {
            times.insert("sunriseEnd", noon - half);
            times.insert("sunsetStart", noon + half);
        }
        if let Some(half) = hour_angle_offset(latitude, declination, GOLDEN_HOUR_DEG) {
            times.insert("goldenHourEnd", noon - half);
            times.insert("goldenHour", noon + half);
        }

        Some(times)
    }

    fn local_zone(&self, latitude: f64, longitude: f64) -> Option<Tz> {
        Some(determine_timezone_from_coordinates(latitude, longitude))
    }
}

/// Solar declination at midday of `date`, in radians. Minute-level accuracy
/// is plenty for phase boundaries.
fn solar_declination(date: NaiveDate) -> f64 {
    let j2000 = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let days = date.signed_duration_since(j2000).num_days() as f64;

    let mean_anomaly = (357.5291 + 0.985_600_28 * days).to_radians();
    let equation_of_center = (1.9148 * mean_anomaly.sin()
        + 0.02 * (2.0 * mean_anomaly).sin()
        + 0.0003 * (3.0 * mean_anomaly).sin())
    .to_radians();
    let perihelion = 102.9372_f64.to_radians();
    let ecliptic_longitude = mean_anomaly + equation_of_center + perihelion + std::f64::consts::PI;

    let obliquity = 23.4397_f64.to_radians();
    (ecliptic_longitude.sin() * obliquity.sin()).asin()
}

/// Time from solar noon to the instant the sun crosses `altitude_deg`, or
/// `None` when the sun never reaches that altitude on this day.
fn hour_angle_offset(latitude: f64, declination: f64, altitude_deg: f64) -> Option<Duration> {
    let lat = latitude.to_radians();
    let alt = altitude_deg.to_radians();

    let cos_hour_angle =
        (alt.sin() - lat.sin() * declination.sin()) / (lat.cos() * declination.cos());
    if !(-1.0..=1.0).contains(&cos_hour_angle) {
        return None;
    }

    // One full rotation per 24 hours.
    let hour_angle = cos_hour_angle.acos();
    let seconds = hour_angle / std::f64::consts::PI * 12.0 * 3600.0;
    Some(Duration::seconds(seconds.round() as i64))
}
