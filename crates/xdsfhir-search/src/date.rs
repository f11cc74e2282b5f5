//! Date range criteria.

use time::UtcOffset;
use xdsfhir_core::{TimeRange, Timestamp};
use xdsfhir_storage::SearchParams;

/// `ge` on the lower bound, `lt` on the upper bound. Absent bounds emit
/// nothing.
pub fn time_range(params: &mut SearchParams, name: &str, range: &TimeRange) {
    if let Some(from) = range.from {
        params.add_param(name, format!("ge{}", instant(&from)));
    }
    if let Some(to) = range.to {
        params.add_param(name, format!("lt{}", instant(&to)));
    }
}

/// Millisecond UTC instant, e.g. `2019-03-05T10:00:00.000Z`.
pub fn instant(timestamp: &Timestamp) -> String {
    let utc = timestamp.instant().to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        utc.year(),
        u8::from(utc.month()),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second(),
        utc.millisecond()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use time::macros::datetime;
    use xdsfhir_core::Precision;

    fn ts(instant: OffsetDateTime) -> Timestamp {
        Timestamp::new(instant, Precision::Second)
    }

    #[test]
    fn test_range_bounds() {
        let mut params = SearchParams::new("DocumentReference");
        let range = TimeRange {
            from: Some(ts(datetime!(2019-03-05 10:00:00 UTC))),
            to: Some(ts(datetime!(2019-03-06 11:30:15 +02:00))),
        };
        time_range(&mut params, "date", &range);

        assert_eq!(
            params.values("date"),
            vec!["ge2019-03-05T10:00:00.000Z", "lt2019-03-06T09:30:15.000Z"]
        );
    }

    #[test]
    fn test_open_range_emits_nothing() {
        let mut params = SearchParams::new("List");
        time_range(&mut params, "date", &TimeRange::default());
        assert!(params.is_empty());

        let range = TimeRange {
            from: None,
            to: Some(ts(datetime!(2020-01-01 00:00:00 UTC))),
        };
        time_range(&mut params, "date", &range);
        assert_eq!(params.values("date"), vec!["lt2020-01-01T00:00:00.000Z"]);
    }
}
