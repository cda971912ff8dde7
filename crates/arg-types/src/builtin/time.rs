//! Date and duration types.

use crate::error::TypeResolverError;
use crate::types::{ResolveContext, TypeResolver};
use crate::value::ArgumentValue;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub struct DateResolver;

impl DateResolver {
    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("now") {
            return Some(Utc::now());
        }

        // Epoch-looking integers are milliseconds.
        if !raw.is_empty() && raw.trim_start_matches('-').chars().all(|c| c.is_ascii_digit()) {
            let millis: i64 = raw.parse().ok()?;
            return Utc.timestamp_millis_opt(millis).single();
        }

        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    fn cast(&self, raw: &str) -> Result<ArgumentValue, TypeResolverError> {
        Self::parse(raw)
            .map(ArgumentValue::Date)
            .ok_or_else(|| TypeResolverError::malformed("Invalid date", self.expected(), raw))
    }
}

#[async_trait]
impl TypeResolver for DateResolver {
    fn name(&self) -> &str {
        "date"
    }

    fn expected(&self) -> Vec<String> {
        vec![
            "now".into(),
            "2024-05-01".into(),
            "2024-05-01T12:00:00Z".into(),
            "1714564800000".into(),
        ]
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(value, ArgumentValue::Date(_))
    }

    fn resolve_offline(&self, raw: &str) -> Option<Result<ArgumentValue, TypeResolverError>> {
        Some(self.cast(raw))
    }

    async fn resolve(
        &self,
        raw: &str,
        _ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        self.cast(raw)
    }
}

pub struct DurationResolver;

#[async_trait]
impl TypeResolver for DurationResolver {
    fn name(&self) -> &str {
        "duration"
    }

    fn expected(&self) -> Vec<String> {
        vec!["30s".into(), "10m".into(), "1h 30m".into(), "2days".into()]
    }

    fn accepts(&self, value: &ArgumentValue) -> bool {
        matches!(value, ArgumentValue::Duration(_))
    }

    fn resolve_offline(&self, raw: &str) -> Option<Result<ArgumentValue, TypeResolverError>> {
        Some(self.parse(raw))
    }

    async fn resolve(
        &self,
        raw: &str,
        _ctx: &ResolveContext<'_>,
    ) -> Result<ArgumentValue, TypeResolverError> {
        self.parse(raw)
    }
}

impl DurationResolver {
    fn parse(&self, raw: &str) -> Result<ArgumentValue, TypeResolverError> {
        humantime::parse_duration(raw.trim())
            .map(ArgumentValue::Duration)
            .map_err(|e| {
                TypeResolverError::malformed(
                    format!("Invalid duration: {}", e),
                    self.expected(),
                    raw,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::Fixture;
    use std::time::Duration;

    #[tokio::test]
    async fn test_date_formats() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        for raw in [
            "2024-05-01T12:00:00Z",
            "2024-05-01T14:00:00+02:00",
            "2024-05-01 12:00:00",
            "1714564800000",
        ] {
            let value = DateResolver.resolve(raw, &ctx).await.unwrap();
            assert_eq!(value.as_date(), Some(&expected), "parsing {}", raw);
        }

        let midnight = DateResolver.resolve("2024-05-01", &ctx).await.unwrap();
        assert_eq!(
            midnight.as_date(),
            Some(&Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_date_now() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let before = Utc::now();
        let value = DateResolver.resolve("NOW", &ctx).await.unwrap();
        assert!(value.as_date().unwrap() >= &before);
    }

    #[tokio::test]
    async fn test_date_rejects_garbage() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let err = DateResolver.resolve("yesterday-ish", &ctx).await.unwrap_err();
        assert_eq!(err.message, "Invalid date");
        assert!(err.expected.contains(&"now".to_string()));
    }

    #[tokio::test]
    async fn test_date_round_trip() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let value = ArgumentValue::Date(Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap());
        let again = DateResolver.resolve(&value.to_string(), &ctx).await.unwrap();
        assert_eq!(again, value);

        let precise = ArgumentValue::Date(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap());
        let again = DateResolver.resolve(&precise.to_string(), &ctx).await.unwrap();
        assert_eq!(again, precise);
    }

    #[tokio::test]
    async fn test_duration() {
        let fx = Fixture::new();
        let ctx = fx.ctx();
        let value = DurationResolver.resolve("1h 30m", &ctx).await.unwrap();
        assert_eq!(value.as_duration(), Some(Duration::from_secs(5400)));

        let again = DurationResolver.resolve(&value.to_string(), &ctx).await.unwrap();
        assert_eq!(again, value);

        assert!(DurationResolver.resolve("soon", &ctx).await.is_err());
    }
}
