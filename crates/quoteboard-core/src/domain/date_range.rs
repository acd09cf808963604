use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Inclusive range of naive calendar dates with `start <= end <= today`.
///
/// Deserialization goes through [`DateRange::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateRangeFields")]
pub struct DateRange {
    #[serde(serialize_with = "iso_date::serialize")]
    start: Date,
    #[serde(serialize_with = "iso_date::serialize")]
    end: Date,
}

impl DateRange {
    /// Validate a `YYYY-MM-DD` pair against the current local date.
    pub fn validate(start_text: &str, end_text: &str) -> Result<Self, ValidationError> {
        Self::validate_at(start_text, end_text, today())
    }

    /// Validate a `YYYY-MM-DD` pair against an explicit "today".
    pub fn validate_at(
        start_text: &str,
        end_text: &str,
        today: Date,
    ) -> Result<Self, ValidationError> {
        let start = parse_date(start_text)?;
        let end = parse_date(end_text)?;

        if end < start {
            return Err(ValidationError::EndBeforeStart);
        }
        if end > today {
            return Err(ValidationError::EndInFuture);
        }

        Ok(Self { start, end })
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Deserialize)]
struct DateRangeFields {
    start: String,
    end: String,
}

impl TryFrom<DateRangeFields> for DateRange {
    type Error = ValidationError;

    fn try_from(fields: DateRangeFields) -> Result<Self, Self::Error> {
        Self::validate(&fields.start, &fields.end)
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input, DATE_FORMAT).map_err(|_| ValidationError::InvalidDateFormat {
        value: input.to_owned(),
    })
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Current local calendar date, UTC when the local offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

pub(crate) mod iso_date {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(D::Error::custom)
    }
}
