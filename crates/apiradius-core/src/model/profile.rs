// ── RADIUS profile domain type ──

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Profile ids, operator ids and `depends` entries.
pub static PROFILE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-z_]{3,32}$").expect("PROFILE_ID_PATTERN is a valid regex pattern")
});

static DESCRIPTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-zA-Z][0-9a-zA-Z,._\-' ]{1,512}[0-9a-zA-Z.]$")
        .expect("DESCRIPTION_PATTERN is a valid regex pattern")
});

pub const MIN_WEIGHT: u32 = 1;
pub const MAX_WEIGHT: u32 = 100_000;
pub const DEFAULT_WEIGHT: u32 = 100;

/// How a RADIUS attribute is merged into the request or reply list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum AttributeOperator {
    #[serde(rename = "=")]
    #[strum(serialize = "=")]
    Equal,
    #[default]
    #[serde(rename = ":=")]
    #[strum(serialize = ":=")]
    Set,
    #[serde(rename = "+=")]
    #[strum(serialize = "+=")]
    Add,
    #[serde(rename = "|=")]
    #[strum(serialize = "|=")]
    FilterEqual,
    #[serde(rename = "|:=")]
    #[strum(serialize = "|:=")]
    FilterSet,
    #[serde(rename = "|+=")]
    #[strum(serialize = "|+=")]
    FilterAdd,
    #[serde(rename = "|--")]
    #[strum(serialize = "|--")]
    FilterRemove,
}

/// One attribute in a profile's reply or control list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusAttribute {
    pub name: String,
    pub value: Vec<String>,
    #[serde(default)]
    pub op: AttributeOperator,
    #[serde(default)]
    pub expand: bool,
    #[serde(default)]
    pub do_xlat: bool,
    #[serde(default)]
    pub is_json: bool,
}

impl RadiusAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: vec![value.into()],
            op: AttributeOperator::default(),
            expand: false,
            do_xlat: false,
            is_json: false,
        }
    }

    pub fn with_op(mut self, op: AttributeOperator) -> Self {
        self.op = op;
        self
    }
}

/// A RADIUS profile as stored under `/operator/{operator}/profile`.
///
/// Field order here is the field order on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusProfile {
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub depends: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON text describing the profile's parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_schema: Option<String>,
    #[serde(default)]
    pub reply: Vec<RadiusAttribute>,
    #[serde(default)]
    pub control: Vec<RadiusAttribute>,
}

fn default_enabled() -> bool {
    true
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

impl RadiusProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            weight: DEFAULT_WEIGHT,
            depends: Vec::new(),
            description: None,
            parameter_schema: None,
            reply: Vec::new(),
            control: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_id("id", &self.id)?;

        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&self.weight) {
            return Err(CoreError::validation(
                "weight",
                format!("{} is outside {MIN_WEIGHT}..={MAX_WEIGHT}", self.weight),
            ));
        }

        for dep in &self.depends {
            validate_id("depends", dep)?;
        }

        if let Some(desc) = &self.description {
            if !DESCRIPTION_PATTERN.is_match(desc) {
                return Err(CoreError::validation(
                    "description",
                    format!("'{desc}' must match {}", DESCRIPTION_PATTERN.as_str()),
                ));
            }
        }

        if let Some(schema) = &self.parameter_schema {
            serde_json::from_str::<Value>(schema).map_err(|e| {
                CoreError::validation("parameter_schema", format!("not valid JSON: {e}"))
            })?;
        }

        for (list, attrs) in [("reply", &self.reply), ("control", &self.control)] {
            for (i, attr) in attrs.iter().enumerate() {
                if attr.name.trim().is_empty() {
                    return Err(CoreError::validation(
                        format!("{list}[{i}].name"),
                        "must not be blank",
                    ));
                }
            }
        }

        Ok(())
    }

    /// JSON object sent as the create/update body.
    pub fn to_payload(&self) -> Result<Map<String, Value>, CoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(CoreError::InvalidResponse {
                message: "profile did not serialize to a JSON object".into(),
                body: String::new(),
            }),
            Err(e) => Err(CoreError::InvalidResponse {
                message: format!("failed to serialize profile: {e}"),
                body: String::new(),
            }),
        }
    }

    /// Decode a document returned by the API.
    pub fn from_document(doc: Map<String, Value>) -> Result<Self, CoreError> {
        let body = Value::Object(doc);
        serde_json::from_value(body.clone()).map_err(|e| CoreError::InvalidResponse {
            message: format!("profile document does not decode: {e}"),
            body: body.to_string(),
        })
    }
}

pub(crate) fn validate_id(field: &str, value: &str) -> Result<(), CoreError> {
    if PROFILE_ID_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(CoreError::validation(
            field,
            format!("'{value}' must match {}", PROFILE_ID_PATTERN.as_str()),
        ))
    }
}

// ── Loosely typed input ─────────────────────────────────────────────
//
// What a user writes in a profile file. Operators stay strings and weight
// stays signed so that bad values are reported as validation errors naming
// the field, not as decode errors.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeInput {
    pub name: String,
    pub value: Vec<String>,
    pub op: Option<String>,
    #[serde(default)]
    pub expand: bool,
    #[serde(default)]
    pub do_xlat: bool,
    #[serde(default)]
    pub is_json: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileInput {
    #[serde(default)]
    pub id: String,
    pub enabled: Option<bool>,
    pub weight: Option<i64>,
    #[serde(default)]
    pub depends: Vec<String>,
    pub description: Option<String>,
    pub parameter_schema: Option<String>,
    #[serde(default)]
    pub reply: Vec<AttributeInput>,
    #[serde(default)]
    pub control: Vec<AttributeInput>,
}

fn convert_attributes(
    list: &str,
    inputs: Vec<AttributeInput>,
) -> Result<Vec<RadiusAttribute>, CoreError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            let op = match input.op.as_deref() {
                None => AttributeOperator::default(),
                Some(raw) => raw.parse().map_err(|_| {
                    CoreError::validation(
                        format!("{list}[{i}].op"),
                        format!("'{raw}' is not one of =, :=, +=, |=, |:=, |+=, |--"),
                    )
                })?,
            };
            Ok(RadiusAttribute {
                name: input.name,
                value: input.value,
                op,
                expand: input.expand,
                do_xlat: input.do_xlat,
                is_json: input.is_json,
            })
        })
        .collect()
}

impl TryFrom<ProfileInput> for RadiusProfile {
    type Error = CoreError;

    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        let weight = match input.weight {
            None => DEFAULT_WEIGHT,
            Some(w) => u32::try_from(w).map_err(|_| {
                CoreError::validation(
                    "weight",
                    format!("{w} is outside {MIN_WEIGHT}..={MAX_WEIGHT}"),
                )
            })?,
        };

        let profile = Self {
            id: input.id,
            enabled: input.enabled.unwrap_or(true),
            weight,
            depends: input.depends,
            description: input.description,
            parameter_schema: input.parameter_schema,
            reply: convert_attributes("reply", input.reply)?,
            control: convert_attributes("control", input.control)?,
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn profile() -> RadiusProfile {
        let mut p = RadiusProfile::new("abc");
        p.weight = 50;
        p.reply = vec![
            RadiusAttribute::new("Reply-Message", "hello"),
            RadiusAttribute::new("Session-Timeout", "3600").with_op(AttributeOperator::Equal),
        ];
        p
    }

    #[test]
    fn operator_parses_every_token() {
        for token in ["=", ":=", "+=", "|=", "|:=", "|+=", "|--"] {
            let op: AttributeOperator = token.parse().unwrap();
            assert_eq!(op.to_string(), token);
        }
        assert!("==".parse::<AttributeOperator>().is_err());
    }

    #[test]
    fn payload_keeps_field_and_attribute_order() {
        let payload = profile().to_payload().unwrap();
        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "enabled", "weight", "depends", "reply", "control"]);
        assert_eq!(
            payload["reply"],
            json!([
                { "name": "Reply-Message", "value": ["hello"], "op": ":=",
                  "expand": false, "do_xlat": false, "is_json": false },
                { "name": "Session-Timeout", "value": ["3600"], "op": "=",
                  "expand": false, "do_xlat": false, "is_json": false }
            ])
        );
    }

    #[test]
    fn document_defaults_apply() {
        let doc = json!({ "id": "abc", "reply": [{ "name": "Reply-Message", "value": ["x"] }] });
        let Value::Object(doc) = doc else { unreachable!() };
        let p = RadiusProfile::from_document(doc).unwrap();
        assert!(p.enabled);
        assert_eq!(p.weight, DEFAULT_WEIGHT);
        assert_eq!(p.reply[0].op, AttributeOperator::Set);
    }

    #[test]
    fn validation_rejects_bad_fields() {
        let mut p = profile();
        p.id = "AB".into();
        assert!(p.validate().is_err());

        let mut p = profile();
        p.weight = 0;
        assert!(p.validate().is_err());
        p.weight = MAX_WEIGHT + 1;
        assert!(p.validate().is_err());

        let mut p = profile();
        p.depends = vec!["ok_dep".into(), "Bad-Dep".into()];
        assert!(p.validate().is_err());

        let mut p = profile();
        p.description = Some("!nope".into());
        assert!(p.validate().is_err());
        p.description = Some("Default access, v2.".into());
        p.validate().unwrap();

        let mut p = profile();
        p.parameter_schema = Some("{ not json".into());
        assert!(p.validate().is_err());

        let mut p = profile();
        p.control = vec![RadiusAttribute::new("  ", "x")];
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("control[0].name"));
    }

    #[test]
    fn input_with_bogus_operator_is_validation_error() {
        let input: ProfileInput = serde_json::from_value(json!({
            "id": "abc",
            "reply": [{ "name": "Reply-Message", "value": ["x"], "op": "bogus" }]
        }))
        .unwrap();

        let err = RadiusProfile::try_from(input).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation { ref field, .. } if field == "reply[0].op"
        ));
    }

    #[test]
    fn input_negative_weight_is_validation_error() {
        let input = ProfileInput {
            id: "abc".into(),
            weight: Some(-5),
            ..ProfileInput::default()
        };
        assert!(matches!(
            RadiusProfile::try_from(input),
            Err(CoreError::Validation { .. })
        ));
    }
}
