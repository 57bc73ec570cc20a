use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Backing index of a data stream, i.e `.ds-logs-app-2023.01.01-000001`
static BACKING_INDEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\.ds\-(?P<Index>[a-zA-Z0-9\-_\.]+)\-(?P<Date>\d{4}\.\d{2}\.\d{2}\-\d{6})$",
    )
    .expect("backing index pattern is valid")
});

/// A backing index name split into the data stream it belongs to and its
/// date suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNameMatch {
    /// data stream name, used as the rollover target
    pub base: String,
    /// `YYYY.MM.DD-NNNNNN`
    pub date_suffix: String,
}

impl IndexNameMatch {
    /// Calendar date encoded in the suffix, `None` if the digits do not form
    /// a real date.
    pub fn date(&self) -> Option<NaiveDate> {
        let day = self.date_suffix.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y.%m.%d").ok()
    }
}

/// Parse an index name, return `None` if it is not a data stream backing
/// index.
pub fn parse(index: &str) -> Option<IndexNameMatch> {
    let caps = BACKING_INDEX.captures(index)?;
    Some(IndexNameMatch {
        base: caps["Index"].to_string(),
        date_suffix: caps["Date"].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backing_index() {
        let m = parse(".ds-logs-app-2023.01.01-000001").unwrap();
        assert_eq!(m.base, "logs-app");
        assert_eq!(m.date_suffix, "2023.01.01-000001");
        assert_eq!(m.date(), NaiveDate::from_ymd_opt(2023, 1, 1));
    }

    #[test]
    fn base_may_contain_dots_and_underscores() {
        let m =
            parse(".ds-metrics_system.cpu-default-2024.02.29-000012").unwrap();
        assert_eq!(m.base, "metrics_system.cpu-default");
    }

    #[test]
    fn base_is_greedy() {
        let m = parse(".ds-a-2023.01.01-000001-2023.01.02-000002").unwrap();
        assert_eq!(m.base, "a-2023.01.01-000001");
        assert_eq!(m.date_suffix, "2023.01.02-000002");
    }

    #[test]
    fn rejects_plain_indices() {
        assert_eq!(parse("myindex"), None);
        assert_eq!(parse("logstash-2021.05.11"), None);
        assert_eq!(parse(".ds-logs-app"), None);
    }

    #[test]
    fn match_is_anchored() {
        assert_eq!(parse("x.ds-logs-2023.01.01-000001"), None);
        assert_eq!(parse(".ds-logs-2023.01.01-000001x"), None);
        assert_eq!(parse(".ds-logs-2023.01.01-0000012"), None);
        assert_eq!(parse("restored-.ds-logs-2023.01.01-000001"), None);
    }

    #[test]
    fn match_is_case_sensitive() {
        assert_eq!(parse(".DS-logs-2023.01.01-000001"), None);
    }

    #[test]
    fn rejects_characters_outside_the_base_alphabet() {
        assert_eq!(parse(".ds-logs app-2023.01.01-000001"), None);
        assert_eq!(parse(".ds-logs+app-2023.01.01-000001"), None);
        assert_eq!(parse(".ds--2023.01.01-000001"), None);
    }

    #[test]
    fn invalid_calendar_date_still_matches() {
        let m = parse(".ds-logs-2023.13.40-000001").unwrap();
        assert_eq!(m.base, "logs");
        assert_eq!(m.date(), None);
    }
}
