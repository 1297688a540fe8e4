// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record collections and payload validation.
//!
//! Payloads are JSON objects checked against a closed set of collection
//! schemas at enqueue time, so malformed writes are rejected before they ever
//! reach the queue.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::mutation::OperationKind;

/// Field holding a record's identity in every payload.
pub const IDENTITY_FIELD: &str = "id";

/// Record data carried by a mutation.
pub type Payload = serde_json::Map<String, Value>;

/// A logical collection of records on the remote data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Enrolled students.
    Students,
    /// Class groups (homerooms).
    Classes,
    /// Weekly lesson timetable slots.
    Schedules,
    /// Assignments handed out to a class.
    Tasks,
    /// Scores recorded against students.
    Grades,
    /// Daily attendance marks.
    Attendance,
}

impl Collection {
    /// Every collection, in display order.
    pub const ALL: [Collection; 6] = [
        Collection::Students,
        Collection::Classes,
        Collection::Schedules,
        Collection::Tasks,
        Collection::Grades,
        Collection::Attendance,
    ];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Classes => "classes",
            Collection::Schedules => "schedules",
            Collection::Tasks => "tasks",
            Collection::Grades => "grades",
            Collection::Attendance => "attendance",
        }
    }

    /// Returns the field schema for this collection.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Collection::Students => STUDENT_FIELDS,
            Collection::Classes => CLASS_FIELDS,
            Collection::Schedules => SCHEDULE_FIELDS,
            Collection::Tasks => TASK_FIELDS,
            Collection::Grades => GRADE_FIELDS,
            Collection::Attendance => ATTENDANCE_FIELDS,
        }
    }

    fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "students" => Ok(Collection::Students),
            "classes" => Ok(Collection::Classes),
            "schedules" => Ok(Collection::Schedules),
            "tasks" => Ok(Collection::Tasks),
            "grades" => Ok(Collection::Grades),
            "attendance" => Ok(Collection::Attendance),
            _ => Err(Error::UnknownCollection(s.to_string())),
        }
    }
}

/// The JSON shape a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any string.
    Text,
    /// Whole number.
    Integer,
    /// Any JSON number.
    Number,
    /// Calendar date as `YYYY-MM-DD`.
    Date,
    /// One of a fixed set of strings.
    OneOf(&'static [&'static str]),
}

/// Schema entry for one field of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Must be present (and non-null) when the record may be created.
    pub required: bool,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
    }
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
    }
}

const GENDERS: &[&str] = &["male", "female"];
const TASK_STATES: &[&str] = &["draft", "published", "closed"];
const ATTENDANCE_MARKS: &[&str] = &["present", "absent", "sick", "permitted"];

const STUDENT_FIELDS: &[FieldSpec] = &[
    field(IDENTITY_FIELD, FieldKind::Text),
    required("name", FieldKind::Text),
    field("nis", FieldKind::Text),
    field("class_id", FieldKind::Text),
    field("gender", FieldKind::OneOf(GENDERS)),
    field("birth_date", FieldKind::Date),
];

const CLASS_FIELDS: &[FieldSpec] = &[
    field(IDENTITY_FIELD, FieldKind::Text),
    required("name", FieldKind::Text),
    required("grade_level", FieldKind::Integer),
    field("homeroom_teacher_id", FieldKind::Text),
    field("academic_year", FieldKind::Text),
];

const SCHEDULE_FIELDS: &[FieldSpec] = &[
    field(IDENTITY_FIELD, FieldKind::Text),
    required("class_id", FieldKind::Text),
    required("subject", FieldKind::Text),
    required("day_of_week", FieldKind::Integer),
    required("start_time", FieldKind::Text),
    required("end_time", FieldKind::Text),
    field("room", FieldKind::Text),
    field("teacher_id", FieldKind::Text),
];

const TASK_FIELDS: &[FieldSpec] = &[
    field(IDENTITY_FIELD, FieldKind::Text),
    required("class_id", FieldKind::Text),
    required("title", FieldKind::Text),
    field("description", FieldKind::Text),
    field("due_date", FieldKind::Date),
    field("max_score", FieldKind::Number),
    field("status", FieldKind::OneOf(TASK_STATES)),
];

const GRADE_FIELDS: &[FieldSpec] = &[
    field(IDENTITY_FIELD, FieldKind::Text),
    required("student_id", FieldKind::Text),
    required("subject", FieldKind::Text),
    required("score", FieldKind::Number),
    field("task_id", FieldKind::Text),
    field("term", FieldKind::Text),
    field("note", FieldKind::Text),
];

const ATTENDANCE_FIELDS: &[FieldSpec] = &[
    field(IDENTITY_FIELD, FieldKind::Text),
    required("student_id", FieldKind::Text),
    required("date", FieldKind::Date),
    required("status", FieldKind::OneOf(ATTENDANCE_MARKS)),
    field("schedule_id", FieldKind::Text),
    field("note", FieldKind::Text),
];

/// Validates `payload` for `operation` against the schema of `collection`.
///
/// Rules:
/// - the payload must be a JSON object
/// - unknown fields are rejected, known fields must have the declared shape
/// - `id` must be a non-empty string when present, and is mandatory for
///   everything except `Create`
/// - `Create` and `Upsert` must carry every required field (non-null)
/// - `Delete` needs nothing beyond the identity
pub fn validate(collection: Collection, operation: OperationKind, payload: Value) -> Result<Payload> {
    let invalid = |field: &str, reason: &str| Error::Validation {
        collection: collection.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let Value::Object(map) = payload else {
        return Err(invalid("payload", "must be a JSON object"));
    };

    match map.get(IDENTITY_FIELD) {
        Some(Value::String(id)) if !id.trim().is_empty() => {}
        Some(_) => return Err(invalid(IDENTITY_FIELD, "must be a non-empty string")),
        None if operation.requires_identity() => {
            return Err(invalid(IDENTITY_FIELD, "is required to target an existing record"))
        }
        None => {}
    }

    for (name, value) in &map {
        let spec = collection
            .field(name)
            .ok_or_else(|| invalid(name, "unknown field"))?;
        if value.is_null() {
            if spec.required && operation.may_create() {
                return Err(invalid(name, "cannot be null"));
            }
            continue;
        }
        check_kind(spec.kind, value).map_err(|reason| invalid(name, &reason))?;
    }

    if operation.may_create() {
        if let Some(missing) = collection
            .fields()
            .iter()
            .find(|f| f.required && !map.contains_key(f.name))
        {
            return Err(invalid(missing.name, "is required"));
        }
    }

    Ok(map)
}

fn check_kind(kind: FieldKind, value: &Value) -> std::result::Result<(), String> {
    match kind {
        FieldKind::Text if value.is_string() => Ok(()),
        FieldKind::Text => Err("expected a string".to_string()),
        FieldKind::Integer if value.is_i64() || value.is_u64() => Ok(()),
        FieldKind::Integer => Err("expected a whole number".to_string()),
        FieldKind::Number if value.is_number() => Ok(()),
        FieldKind::Number => Err("expected a number".to_string()),
        FieldKind::Date => match value.as_str() {
            Some(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => Ok(()),
            _ => Err("expected a date as YYYY-MM-DD".to_string()),
        },
        FieldKind::OneOf(choices) => match value.as_str() {
            Some(s) if choices.contains(&s) => Ok(()),
            _ => Err(format!("expected one of: {}", choices.join(", "))),
        },
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
