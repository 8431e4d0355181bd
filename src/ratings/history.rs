use std::borrow::Cow;

use time::{Date, Duration, Month};
use tracing::warn;

use crate::error::ApiError;
use crate::ratings::dto::{GameModeHistory, RawPoint};

pub const CSV_HEADER: &str = "Username,Game Mode,Date,Rating 30 Days Ago";

/// Calendar date of a raw point. Upstream months are 0-based and must be
/// shifted before a date can be built.
fn point_date(point: &RawPoint) -> Result<Date, ApiError> {
    let [year, month0, day, _] = *point;
    let invalid = || ApiError::InvalidDatePoint {
        year,
        month: month0 + 1,
        day,
    };

    let month = u8::try_from(month0 + 1)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(invalid)?;
    let year = i32::try_from(year).map_err(|_| invalid())?;
    let day = u8::try_from(day).map_err(|_| invalid())?;
    Date::from_calendar_date(year, month, day).map_err(|_| invalid())
}

/// Keeps the points dated within `[today - window_days, today]`, in upstream
/// order. A point without a valid calendar date is dropped on its own; the
/// rest of the series survives.
pub fn filter_recent_points(points: &[RawPoint], today: Date, window_days: i64) -> Vec<RawPoint> {
    let cutoff = today - Duration::days(window_days);
    points
        .iter()
        .filter(|point| match point_date(point) {
            Ok(date) => date >= cutoff && date <= today,
            Err(err) => {
                warn!(error = %err, "dropping rating point");
                false
            }
        })
        .copied()
        .collect()
}

fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Flattens one player's filtered history into CSV rows: one row per
/// (game mode, point), dates as `YYYY/M/D` with a 1-based month.
pub fn csv_rows(
    username: &str,
    history: &[GameModeHistory],
    today: Date,
    window_days: i64,
) -> Vec<String> {
    let mut rows = Vec::new();
    for mode in history {
        for [year, month0, day, rating] in filter_recent_points(&mode.points, today, window_days) {
            rows.push(format!(
                "{},{},{}/{}/{},{}",
                csv_field(username),
                csv_field(&mode.name),
                year,
                month0 + 1,
                day,
                rating
            ));
        }
    }
    rows
}
