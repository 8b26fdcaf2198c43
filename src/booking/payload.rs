//! Reshaping of form submissions into the booking platform's JSON.
//!
//! All functions are pure: they take the decoded request body and return the
//! body to forward, without touching the network.

use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use serde_json::{json, Map, Value};

use crate::utils::constants::{DEFAULT_FEATURE_VALUE, DEFAULT_OWNER_COUNTRY_ID, DEFAULT_OWNER_LANGUAGE_ID};

const REQUIRED_ACCOMMODATION_FIELDS: [&str; 1] = ["name"];
const ACCOMMODATION_TIME_FIELDS: [&str; 2] = ["arrivalTime", "departureTime"];
const ACCOMMODATION_INTEGER_FIELDS: [&str; 3] = ["personsIncludedInRent", "numberOfPetsAllowed", "code"];

/// Owner form -> booking platform owner.
///
/// `address` is split on the first comma into street and city.
pub fn owner_payload(form: &Value) -> Value {
    let address = form.get("address").and_then(Value::as_str).unwrap_or("");
    let mut parts = address.split(',');
    let streetname = parts.next().unwrap_or("").trim();
    let city = parts.next().unwrap_or("").trim();

    json!({
        "contactPerson": or_default(form.get("name"), json!("")),
        "companyName": or_default(form.get("companyName"), json!("")),
        "email": or_default(form.get("email"), json!("")),
        "phone": or_default(form.get("phone"), json!("")),
        "streetname": streetname,
        "city": city,
        "postalCode": or_default(form.get("postalCode"), json!("")),
        "countryId": or_default(form.get("countryId"), json!(DEFAULT_OWNER_COUNTRY_ID)),
        "languageId": or_default(form.get("languageId"), json!(DEFAULT_OWNER_LANGUAGE_ID)),
    })
}

/// Required accommodation fields that are absent or empty
pub fn missing_accommodation_fields(data: &Value) -> Vec<&'static str> {
    REQUIRED_ACCOMMODATION_FIELDS
        .into_iter()
        .filter(|field| !is_truthy(data.get(*field)))
        .collect()
}

/// Existing accommodation id, when the submission is an update
pub fn accommodation_id(data: &Value) -> Option<String> {
    match data.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(id.to_owned()),
        Some(Value::Number(id)) if id.as_f64() != Some(0.0) => Some(id.to_string()),
        _ => None,
    }
}

/// Normalizes times to RFC3339 on `today` and numeric strings to integers.
pub fn accommodation_payload(mut data: Value, today: NaiveDate) -> Value {
    if let Some(fields) = data.as_object_mut() {
        normalize_accommodation_fields(fields, today);
    }
    data
}

fn normalize_accommodation_fields(fields: &mut Map<String, Value>, today: NaiveDate) {
    for field in ACCOMMODATION_TIME_FIELDS {
        if let Some(Value::String(time)) = fields.get(field) {
            if let Some(timestamp) = time_on_date(time, today) {
                fields.insert(field.to_owned(), Value::String(timestamp));
            }
        }
    }

    for field in ACCOMMODATION_INTEGER_FIELDS {
        if let Some(Value::String(raw)) = fields.get(field) {
            if raw.is_empty() {
                continue;
            }
            let parsed = parse_int_prefix(raw).map(Value::from).unwrap_or(Value::Null);
            fields.insert(field.to_owned(), parsed);
        }
    }
}

/// Stamps the path accommodation id on one room or each room of a list.
pub fn rooms_payload(data: Value, accommodation_id: &str) -> Value {
    let id = id_value(accommodation_id);
    map_objects(data, |room| {
        room.insert("accommodationId".to_owned(), id.clone());
    })
}

/// Stamps the accommodation id on features and defaults empty quantities.
pub fn accommodation_features_payload(data: Value, accommodation_id: &str) -> Value {
    let id = id_value(accommodation_id);
    map_objects(data, |feature| {
        feature.insert("accommodationID".to_owned(), id.clone());
        if !is_truthy(feature.get("value")) {
            feature.insert("value".to_owned(), json!(DEFAULT_FEATURE_VALUE));
        }
    })
}

/// Coerces the feature catalogue into `{results: [...], total}`.
///
/// Returns `None` when the upstream answer is neither an object nor an array.
pub fn feature_catalogue(data: Value) -> Option<Value> {
    match data {
        Value::Array(results) => {
            let total = results.len();
            Some(json!({ "results": results, "total": total }))
        }
        Value::Object(fields) => {
            if fields.get("results").is_some_and(Value::is_array) {
                Some(Value::Object(fields))
            } else {
                Some(json!({ "results": [Value::Object(fields)], "total": 1 }))
            }
        }
        _ => None,
    }
}

/// Distinct `featuregroup` names, in first-seen order
pub fn feature_groups(catalogue: &Value) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for feature in catalogue.get("results").and_then(Value::as_array).into_iter().flatten() {
        let group = feature
            .get("featuregroup")
            .and_then(Value::as_str)
            .filter(|group| !group.is_empty())
            .unwrap_or("Unknown");
        if !groups.iter().any(|known| known == group) {
            groups.push(group.to_owned());
        }
    }
    groups
}

/// Leading integer of a string, ignoring leading whitespace: `"12 people"` -> 12.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn time_on_date(time: &str, date: NaiveDate) -> Option<String> {
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some(
        date.and_time(time)
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

fn id_value(accommodation_id: &str) -> Value {
    parse_int_prefix(accommodation_id)
        .map(Value::from)
        .unwrap_or(Value::Null)
}

fn map_objects(data: Value, stamp: impl Fn(&mut Map<String, Value>)) -> Value {
    match data {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|mut item| {
                    if let Some(fields) = item.as_object_mut() {
                        stamp(fields);
                    }
                    item
                })
                .collect(),
        ),
        Value::Object(mut fields) => {
            stamp(&mut fields);
            Value::Object(fields)
        }
        other => other,
    }
}

fn or_default(value: Option<&Value>, default: Value) -> Value {
    match value {
        Some(v) if is_truthy(Some(v)) => v.clone(),
        _ => default,
    }
}

/// Absent, null, false, empty string and zero count as "not provided".
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
