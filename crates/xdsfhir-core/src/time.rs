use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::{CoreError, Result};

/// Precision of a registry timestamp, from year down to second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Precision {
    fn digits(self) -> usize {
        match self {
            Self::Year => 4,
            Self::Month => 6,
            Self::Day => 8,
            Self::Hour => 10,
            Self::Minute => 12,
            Self::Second => 14,
        }
    }

    fn from_digits(len: usize) -> Option<Self> {
        match len {
            4 => Some(Self::Year),
            6 => Some(Self::Month),
            8 => Some(Self::Day),
            10 => Some(Self::Hour),
            12 => Some(Self::Minute),
            14 => Some(Self::Second),
            _ => None,
        }
    }
}

/// A registry timestamp: an instant in UTC together with its precision.
///
/// Displays and serializes in the HL7 DTM form used by the registry
/// (`YYYY[MM[DD[hh[mm[ss]]]]]`), truncated to the precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    instant: OffsetDateTime,
    precision: Precision,
}

impl Timestamp {
    pub fn new(instant: OffsetDateTime, precision: Precision) -> Self {
        Self {
            instant: instant.to_offset(UtcOffset::UTC),
            precision,
        }
    }

    pub fn instant(&self) -> OffsetDateTime {
        self.instant
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Parse a backend `date`, `dateTime` or `instant` value.
    ///
    /// `YYYY`, `YYYY-MM` and `YYYY-MM-DD` keep their reduced precision,
    /// full date-times are read as RFC 3339 with second precision.
    pub fn from_backend(value: &str) -> Result<Self> {
        let value = value.trim();
        let invalid = || CoreError::invalid_timestamp(format!("'{value}' is not a FHIR date"));

        if value.contains('T') {
            let instant = OffsetDateTime::parse(value, &Rfc3339).map_err(|e| {
                CoreError::invalid_timestamp(format!("Failed to parse '{value}': {e}"))
            })?;
            return Ok(Self::new(instant, Precision::Second));
        }

        let parts: Vec<&str> = value.split('-').collect();
        let (year, month, day, precision) = match parts.as_slice() {
            [y] if y.len() == 4 => (*y, "1", "1", Precision::Year),
            [y, m] if y.len() == 4 && m.len() == 2 => (*y, *m, "1", Precision::Month),
            [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
                (*y, *m, *d, Precision::Day)
            }
            _ => return Err(invalid()),
        };
        let date = calendar_date(year, month, day).ok_or_else(invalid)?;
        Ok(Self::new(
            PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc(),
            precision,
        ))
    }

    fn to_dtm(self) -> String {
        let i = self.instant;
        let full = format!(
            "{:04}{:02}{:02}{:02}{:02}{:02}",
            i.year(),
            u8::from(i.month()),
            i.day(),
            i.hour(),
            i.minute(),
            i.second()
        );
        full[..self.precision.digits()].to_string()
    }
}

fn calendar_date(year: &str, month: &str, day: &str) -> Option<Date> {
    let year = year.parse::<i32>().ok()?;
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    let day = day.parse::<u8>().ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

fn dtm_field<'a>(s: &'a str, range: std::ops::Range<usize>, default: &'a str) -> &'a str {
    s.get(range).unwrap_or(default)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dtm())
    }
}

impl FromStr for Timestamp {
    type Err = CoreError;

    /// Parse the HL7 DTM form, always interpreted as UTC.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::invalid_timestamp(format!("'{s}' is not an HL7 DTM value"));
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let precision = Precision::from_digits(s.len()).ok_or_else(invalid)?;
        let date = calendar_date(
            dtm_field(s, 0..4, "0"),
            dtm_field(s, 4..6, "1"),
            dtm_field(s, 6..8, "1"),
        )
        .ok_or_else(invalid)?;
        let time = Time::from_hms(
            dtm_field(s, 8..10, "0").parse().map_err(|_| invalid())?,
            dtm_field(s, 10..12, "0").parse().map_err(|_| invalid())?,
            dtm_field(s, 12..14, "0").parse().map_err(|_| invalid())?,
        )
        .map_err(|_| invalid())?;

        Ok(Self::new(
            PrimitiveDateTime::new(date, time).assume_utc(),
            precision,
        ))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_dtm())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timestamp::from_str(&s).map_err(serde::de::Error::custom)
    }
}
