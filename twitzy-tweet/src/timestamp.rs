use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Timelike, Utc,
};
use thiserror::Error as ThisError;

/// Shown by `tweet::TimeStamp` while the record has no `createdAt`.
pub const TIMESTAMP_PLACEHOLDER: &str = "--:-- - -- --, --";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Month doesn't exist: {0}")]
pub struct InvalidMonthError(pub u32);

#[derive(Debug, ThisError)]
pub enum TimestampError {
    #[error("Failed to parse timestamp {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Timestamp {input:?} does not exist in the display time zone")]
    Nonexistent { input: String },
    #[error(transparent)]
    InvalidMonth(#[from] InvalidMonthError),
}

/// Time zone timestamps are shown in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Zone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Fixed(Utc.fix())
    }

    /// Parses `+HH:MM` / `-HH:MM` / `Z`.
    pub fn from_offset_str(offset: &str) -> Result<Self, TimestampError> {
        let probe = format!("2000-01-01T00:00:00{}", offset);
        DateTime::parse_from_rfc3339(&probe)
            .map(|datetime| Zone::Fixed(*datetime.offset()))
            .map_err(|source| TimestampError::Parse {
                input: offset.to_string(),
                source,
            })
    }

    /// Reads a wall-clock time as a time in this zone.
    pub fn from_naive(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Zone::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|datetime| datetime.with_timezone(&datetime.offset().fix())),
            Zone::Fixed(offset) => offset.from_local_datetime(naive).single(),
        }
    }

    pub fn format(&self, datetime: &DateTime<FixedOffset>) -> Result<String, InvalidMonthError> {
        match self {
            Zone::Local => format_timestamp(&datetime.with_timezone(&Local)),
            Zone::Fixed(offset) => format_timestamp(&datetime.with_timezone(offset)),
        }
    }
}

pub fn month_abbrev(month0: u32) -> Result<&'static str, InvalidMonthError> {
    MONTHS
        .get(month0 as usize)
        .copied()
        .ok_or(InvalidMonthError(month0))
}

/// Accepts RFC 3339 text, plus the two shorter ISO-8601 forms tweets are
/// exported with. A bare date is midnight UTC, a date-time without offset is
/// wall-clock time in `zone`.
pub fn parse_created_at(input: &str, zone: Zone) -> Result<DateTime<FixedOffset>, TimestampError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Ok(datetime);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return zone.from_naive(&naive).ok_or_else(|| TimestampError::Nonexistent {
            input: input.to_string(),
        });
    }
    DateTime::parse_from_rfc3339(&format!("{}T00:00:00Z", input)).map_err(|source| {
        TimestampError::Parse {
            input: input.to_string(),
            source,
        }
    })
}

/// `H:MM - Mon D, YYYY`
pub fn format_timestamp<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Result<String, InvalidMonthError> {
    Ok(format!(
        "{}:{:02} - {} {}, {}",
        datetime.hour(),
        datetime.minute(),
        month_abbrev(datetime.month0())?,
        datetime.day(),
        datetime.year()
    ))
}

pub fn format_created_at(created_at: &str, zone: Zone) -> Result<String, TimestampError> {
    if created_at.trim().is_empty() {
        return Ok(TIMESTAMP_PLACEHOLDER.to_string());
    }
    let datetime = parse_created_at(created_at.trim(), zone)?;
    Ok(zone.format(&datetime)?)
}
