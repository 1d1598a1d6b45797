use std::path::Path;

use chrono::{DateTime, TimeZone};

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Segment file name for a wall-clock time: `YYYYMMDD-HHMMSS.<ext>`.
pub fn segment_file_name<Tz: TimeZone>(time: &DateTime<Tz>, extension: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}.{}", time.format(TIMESTAMP_FORMAT), extension)
}

/// Pick a segment file name in `directory` that is neither `previous` nor an
/// existing file, appending `-1`, `-2`, ... to the timestamp when needed.
pub fn unique_segment_file_name<Tz: TimeZone>(
    directory: &Path,
    time: &DateTime<Tz>,
    extension: &str,
    previous: Option<&str>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let taken = |name: &str| previous == Some(name) || directory.join(name).exists();

    let name = segment_file_name(time, extension);
    if !taken(&name) {
        return name;
    }

    let stem = time.format(TIMESTAMP_FORMAT).to_string();
    (1u32..)
        .map(|n| format!("{}-{}.{}", stem, n, extension))
        .find(|candidate| !taken(candidate))
        .unwrap_or(name)
}
