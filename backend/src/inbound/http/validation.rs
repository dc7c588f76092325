//! Shared validation helpers for inbound HTTP adapters.

use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Error, Price, RecipeLink, RecordId, RecordName, RecordValidationError, TimeMinutes,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must contain valid UUIDs")).with_details(json!({
        "field": field,
        "index": index,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Map a record field violation onto a client error naming `field`.
pub(crate) fn record_field_error(field: FieldName, err: RecordValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::InvalidValue.as_str(),
    }))
}

pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_name(value: String, field: FieldName) -> Result<RecordName, Error> {
    RecordName::new(value).map_err(|err| record_field_error(field, err))
}

pub(crate) fn parse_price(value: Decimal) -> Result<Price, Error> {
    Price::new(value).map_err(|err| record_field_error(FieldName::new("price"), err))
}

pub(crate) fn parse_time_minutes(value: u32) -> Result<TimeMinutes, Error> {
    TimeMinutes::new(value).map_err(|err| record_field_error(FieldName::new("time_minutes"), err))
}

/// Empty strings count as "no link".
pub(crate) fn parse_link(value: Option<String>) -> Result<Option<RecipeLink>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            RecipeLink::new(raw).map_err(|err| record_field_error(FieldName::new("link"), err))
        })
        .transpose()
}

pub(crate) fn record_ids(values: Vec<Uuid>) -> Vec<RecordId> {
    values.into_iter().map(RecordId::from_uuid).collect()
}

/// Parse a comma-separated id list such as `?tags=a,b`.
///
/// Blank segments are skipped; an all-blank value yields an empty list.
pub(crate) fn parse_id_csv(raw: &str, field: FieldName) -> Result<Vec<RecordId>, Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(index, segment)| {
            Uuid::parse_str(segment)
                .map(RecordId::from_uuid)
                .map_err(|_| invalid_uuid_index_error(field, index, segment))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainErrorCode;
    use rstest::rstest;

    const TAGS: FieldName = FieldName::new("tags");

    #[rstest]
    fn csv_ids_are_parsed_in_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let ids = parse_id_csv(&format!("{first}, {second},"), TAGS).expect("ids parse");

        assert_eq!(
            ids,
            vec![RecordId::from_uuid(first), RecordId::from_uuid(second)]
        );
    }

    #[rstest]
    #[case("")]
    #[case(" , ")]
    fn blank_csv_is_empty(#[case] raw: &str) {
        assert!(parse_id_csv(raw, TAGS).expect("blank parses").is_empty());
    }

    #[rstest]
    fn malformed_csv_reports_the_offending_segment() {
        let good = Uuid::new_v4();

        let err = parse_id_csv(&format!("{good},nope"), TAGS).expect_err("rejected");

        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        let details = err.details().expect("details present");
        assert_eq!(details["field"], "tags");
        assert_eq!(details["index"], 1);
        assert_eq!(details["value"], "nope");
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("https://example.com/soup"), false)]
    fn blank_links_clear(#[case] raw: Option<&str>, #[case] cleared: bool) {
        let link = parse_link(raw.map(str::to_owned)).expect("link accepted");
        assert_eq!(link.is_none(), cleared);
    }

    #[rstest]
    fn invalid_links_name_the_field() {
        let err = parse_link(Some("ftp://example.com".to_owned())).expect_err("rejected");
        assert_eq!(err.details().expect("details")["field"], "link");
    }

    #[rstest]
    fn missing_fields_are_reported() {
        let err = require::<u32>(None, FieldName::new("time_minutes")).expect_err("missing");
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "time_minutes", "code": "missing_field" }))
        );
    }
}
