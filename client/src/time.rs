use chrono::{
    DateTime,
    Utc,
};
use serde::{
    de::Error as _,
    Deserialize,
    Deserializer,
};

/// Seconds since the epoch of `0001-01-01T00:00:00Z`, which the API uses for "never".
const ZERO_TIME_SECONDS: i64 = -62_135_596_800;

/// Deserializes an RFC 3339 timestamp, mapping missing values, empty strings and the zero time to `None`.
pub(crate) fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let timestamp = DateTime::parse_from_rfc3339(raw)
        .map_err(|err| D::Error::custom(format!("invalid timestamp {raw:?}: {err}")))?
        .with_timezone(&Utc);

    if timestamp.timestamp() <= ZERO_TIME_SECONDS {
        Ok(None)
    } else {
        Ok(Some(timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "optional_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    fn parse(json: &str) -> Option<DateTime<Utc>> {
        serde_json::from_str::<Wrapper>(json).unwrap().at
    }

    #[test]
    fn absent_and_zero_timestamps_are_none() {
        assert_eq!(parse("{}"), None);
        assert_eq!(parse(r#"{"at": null}"#), None);
        assert_eq!(parse(r#"{"at": ""}"#), None);
        assert_eq!(parse(r#"{"at": "0001-01-01T00:00:00Z"}"#), None);
    }

    #[test]
    fn rfc3339_timestamps_are_parsed() {
        assert_eq!(
            parse(r#"{"at": "2021-02-01T00:00:00Z"}"#),
            Some(Utc.timestamp_opt(1_612_137_600, 0).unwrap())
        );
        assert_eq!(
            parse(r#"{"at": "2021-02-01T02:00:00+02:00"}"#),
            Some(Utc.timestamp_opt(1_612_137_600, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"at": "yesterday"}"#).is_err());
    }
}
