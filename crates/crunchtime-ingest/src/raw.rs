//! Loosely typed input records
//!
//! Fields that get normalized (status, ratings, deadlines, effort) are kept
//! as raw JSON values so that a bad value degrades to a default instead of
//! failing the whole batch. TOML input is converted to the same JSON shape
//! before deserialization.

use serde::Deserialize;
use serde_json::Value;

/// A list given either flat or wrapped in a `values` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawList<T> {
    Flat(Vec<T>),
    Wrapped { values: Vec<T> },
}

impl<T> Default for RawList<T> {
    fn default() -> Self {
        RawList::Flat(Vec::new())
    }
}

impl<T> RawList<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            RawList::Flat(items) | RawList::Wrapped { values: items } => items,
        }
    }
}

/// One input document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawBatch {
    pub goals: RawList<RawGoal>,
    pub projects: RawList<RawProject>,
    pub milestones: RawList<RawMilestone>,
    pub tasks: RawList<RawTask>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawGoal {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawProject {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<Value>,
    #[serde(alias = "goalId")]
    pub goal: Option<String>,
    pub deadline: Option<Value>,
    pub deadline_type: Option<Value>,
    pub excitement: Option<Value>,
    pub viability: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawMilestone {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<Value>,
    #[serde(alias = "projectId")]
    pub project: Option<String>,
    #[serde(alias = "dependencyIds")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTask {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<Value>,
    #[serde(alias = "milestoneId")]
    pub milestone: Option<String>,
    pub duration: Option<Value>,
    #[serde(alias = "timespent")]
    pub time_spent: Option<Value>,
    #[serde(alias = "dependencyIds")]
    pub dependencies: Vec<String>,
}

/// Convert a TOML document into the equivalent JSON value.
///
/// TOML dates and datetimes become their RFC 3339 string form.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_flat_and_wrapped_lists() {
        let flat: RawBatch = serde_json::from_str(r#"{"goals": [{"id": "g"}]}"#).unwrap();
        let wrapped: RawBatch =
            serde_json::from_str(r#"{"goals": {"values": [{"id": "g"}], "length": 1}}"#).unwrap();

        assert_eq!(flat.goals.into_vec()[0].id, "g");
        assert_eq!(wrapped.goals.into_vec()[0].id, "g");
    }

    #[test]
    fn reference_aliases() {
        let task: RawTask = serde_json::from_str(
            r#"{"id": "t", "milestoneId": "m", "dependencyIds": ["x"], "timespent": 2}"#,
        )
        .unwrap();
        assert_eq!(task.milestone.as_deref(), Some("m"));
        assert_eq!(task.dependencies, vec!["x"]);
        assert_eq!(task.time_spent, Some(Value::from(2)));
    }

    #[test]
    fn toml_dates_become_strings() {
        let table: toml::Table = toml::from_str("due = 2024-03-01\nat = 1979-05-27T07:32:00Z").unwrap();
        let json = toml_to_json(toml::Value::Table(table));
        assert_eq!(json["due"], Value::String("2024-03-01".into()));
        assert_eq!(json["at"], Value::String("1979-05-27T07:32:00Z".into()));
    }
}
