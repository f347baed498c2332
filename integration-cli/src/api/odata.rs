//! OData v2 response envelopes and value formats

use serde::Deserialize;

/// `{"d": {"results": [...], "__next": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ODataCollection<T> {
    pub d: ODataResults<T>,
}

#[derive(Debug, Deserialize)]
pub struct ODataResults<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Continuation link for server-side paging
    #[serde(default, rename = "__next")]
    pub next: Option<String>,
}

/// Timestamps as sent by OData v2 (`/Date(1700000000000)/`), with
/// RFC 3339 and naive ISO strings accepted as well.
pub mod odata_datetime {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid OData datetime: {}", text))),
        }
    }

    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        if let Some(inner) = text
            .strip_prefix("/Date(")
            .and_then(|rest| rest.strip_suffix(")/"))
        {
            // Offset suffix (e.g. "+0000") does not change the UTC instant
            let millis_part = inner
                .char_indices()
                .skip(1)
                .find(|(_, c)| *c == '+' || *c == '-')
                .map(|(idx, _)| &inner[..idx])
                .unwrap_or(inner);
            let millis: i64 = millis_part.parse().ok()?;
            return Utc.timestamp_millis_opt(millis).single();
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
