use time::macros::format_description;
use time::OffsetDateTime;

/// Read the current local time. Falls back to UTC if the local UTC offset cannot be determined,
/// which can happen on Unix platforms when multiple threads are running.
#[must_use]
pub fn current_local_time() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|err| {
        log::debug!("Unable to determine local UTC offset, using UTC: {err}");
        OffsetDateTime::now_utc()
    })
}

/// Format a timestamp as `MM/DD/YYYY hh:mm:ss AM/PM` with a 12-hour clock.
#[must_use]
pub fn format_12_hour_timestamp(timestamp: OffsetDateTime) -> String {
    let format = format_description!(
        "[month]/[day]/[year] [hour repr:12]:[minute]:[second] [period case:upper]"
    );

    timestamp.format(format).unwrap_or_else(|err| {
        log::error!("Unable to format timestamp {timestamp}: {err}");
        String::new()
    })
}
