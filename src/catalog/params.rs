//! Parameter contracts and validation of JSON arguments against them.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::{
    error::ParamError,
    script::{Expr, Unit},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Text,
    /// Array of strings.
    TextList,
    Integer,
    Number,
    /// Number baked into a measurement string with this unit.
    Length(Unit),
    Flag,
    Choice(&'static [&'static str]),
}

impl ParamKind {
    fn expected(&self) -> &'static str {
        match self {
            ParamKind::Text | ParamKind::Choice(_) => "a string",
            ParamKind::TextList => "an array of strings",
            ParamKind::Integer => "an integer",
            ParamKind::Number | ParamKind::Length(_) => "a number",
            ParamKind::Flag => "a boolean",
        }
    }
}

/// A validated parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    TextList(Vec<String>),
    Integer(i64),
    Number(f64),
    Length(f64, Unit),
    Flag(bool),
    Choice(String),
}

impl ParamValue {
    /// The value as a script literal.
    pub fn to_expr(&self) -> Expr {
        match self {
            ParamValue::Text(s) | ParamValue::Choice(s) => Expr::Str(s.clone()),
            ParamValue::TextList(items) => {
                Expr::Array(items.iter().map(|s| Expr::Str(s.clone())).collect())
            }
            ParamValue::Integer(v) => Expr::Int(*v),
            ParamValue::Number(v) => Expr::Num(*v),
            ParamValue::Length(v, unit) => Expr::Measure(*v, *unit),
            ParamValue::Flag(v) => Expr::Bool(*v),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            ParamValue::Text(s) | ParamValue::Choice(s) => json!(s),
            ParamValue::TextList(items) => json!(items),
            ParamValue::Integer(v) => json!(v),
            ParamValue::Number(v) | ParamValue::Length(v, _) => json!(v),
            ParamValue::Flag(v) => json!(v),
        }
    }
}

/// Declared shape of one operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allow_empty: bool,
}

impl ParamSpec {
    fn new(name: &'static str, description: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: None,
            min: None,
            max: None,
            allow_empty: false,
        }
    }

    pub fn text(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::Text)
    }

    pub fn text_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::TextList)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::Integer)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::Number)
    }

    /// A length in points.
    pub fn length(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::Length(Unit::Pt))
    }

    pub fn flag(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::Flag)
    }

    pub fn choice(
        name: &'static str,
        description: &'static str,
        choices: &'static [&'static str],
    ) -> Self {
        Self::new(name, description, ParamKind::Choice(choices))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn default_int(mut self, v: i64) -> Self {
        self.default = Some(ParamValue::Integer(v));
        self
    }

    pub fn default_length(mut self, v: f64) -> Self {
        let unit = match self.kind {
            ParamKind::Length(unit) => unit,
            _ => Unit::Pt,
        };
        self.default = Some(ParamValue::Length(v, unit));
        self
    }

    pub fn default_flag(mut self, v: bool) -> Self {
        self.default = Some(ParamValue::Flag(v));
        self
    }

    pub fn default_choice(mut self, v: &'static str) -> Self {
        self.default = Some(ParamValue::Choice(v.to_string()));
        self
    }

    pub fn default_text(mut self, v: &'static str) -> Self {
        self.default = Some(ParamValue::Text(v.to_string()));
        self
    }

    /// JSON Schema fragment for this parameter.
    pub fn schema(&self) -> Value {
        let mut schema = Map::new();
        let ty = match self.kind {
            ParamKind::Text | ParamKind::Choice(_) => "string",
            ParamKind::TextList => "array",
            ParamKind::Integer => "integer",
            ParamKind::Number | ParamKind::Length(_) => "number",
            ParamKind::Flag => "boolean",
        };
        schema.insert("type".into(), json!(ty));
        let description = match self.kind {
            ParamKind::Length(unit) => format!("{} (in {})", self.description, unit.suffix()),
            _ => self.description.to_string(),
        };
        schema.insert("description".into(), json!(description));
        match self.kind {
            ParamKind::Choice(choices) => {
                schema.insert("enum".into(), json!(choices));
            }
            ParamKind::TextList => {
                schema.insert("items".into(), json!({ "type": "string" }));
            }
            _ => {}
        }
        if let Some(min) = self.min {
            schema.insert("minimum".into(), json!(min));
        }
        if let Some(max) = self.max {
            schema.insert("maximum".into(), json!(max));
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.to_json());
        }
        Value::Object(schema)
    }

    fn validate(&self, value: &Value) -> Result<ParamValue, ParamError> {
        let wrong = || ParamError::WrongType {
            name: self.name.to_string(),
            expected: self.kind.expected(),
        };
        let parsed = match &self.kind {
            ParamKind::Text => {
                let s = value.as_str().ok_or_else(wrong)?;
                if s.is_empty() && !self.allow_empty {
                    return Err(ParamError::Empty {
                        name: self.name.to_string(),
                    });
                }
                ParamValue::Text(s.to_string())
            }
            ParamKind::TextList => {
                let items = value.as_array().ok_or_else(wrong)?;
                let strings = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(wrong)?;
                ParamValue::TextList(strings)
            }
            ParamKind::Integer => {
                let v = match value.as_i64() {
                    Some(v) => v,
                    // 3.0 is an integer; 3.5 is not
                    None => match value.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                        _ => return Err(wrong()),
                    },
                };
                self.check_range(v as f64)?;
                ParamValue::Integer(v)
            }
            ParamKind::Number => {
                let v = value.as_f64().ok_or_else(wrong)?;
                self.check_range(v)?;
                ParamValue::Number(v)
            }
            ParamKind::Length(unit) => {
                let v = value.as_f64().ok_or_else(wrong)?;
                self.check_range(v)?;
                ParamValue::Length(v, *unit)
            }
            ParamKind::Flag => ParamValue::Flag(value.as_bool().ok_or_else(wrong)?),
            ParamKind::Choice(choices) => {
                let s = value.as_str().ok_or_else(wrong)?;
                if !choices.contains(&s) {
                    return Err(ParamError::NotAChoice {
                        name: self.name.to_string(),
                        value: s.to_string(),
                        allowed: choices.join(", "),
                    });
                }
                ParamValue::Choice(s.to_string())
            }
        };
        Ok(parsed)
    }

    fn check_range(&self, value: f64) -> Result<(), ParamError> {
        let below = self.min.is_some_and(|min| value < min);
        let above = self.max.is_some_and(|max| value > max);
        if below || above {
            return Err(ParamError::OutOfRange {
                name: self.name.to_string(),
                value,
                min: self.min.unwrap_or(f64::NEG_INFINITY),
                max: self.max.unwrap_or(f64::INFINITY),
            });
        }
        Ok(())
    }
}

/// Check `args` against `specs`, applying defaults. `null` counts as absent.
pub fn validate(specs: &[ParamSpec], args: &Value) -> Result<Params, ParamError> {
    let empty = Map::new();
    let object = match args {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => return Err(ParamError::NotAnObject),
    };

    if let Some(unknown) = object
        .keys()
        .find(|key| !specs.iter().any(|spec| spec.name == key.as_str()))
    {
        return Err(ParamError::Unknown(unknown.clone()));
    }

    let mut values = BTreeMap::new();
    for spec in specs {
        match object.get(spec.name).filter(|v| !v.is_null()) {
            Some(raw) => {
                values.insert(spec.name, spec.validate(raw)?);
            }
            None if spec.required => return Err(ParamError::Missing(spec.name.to_string())),
            None => {
                if let Some(default) = &spec.default {
                    values.insert(spec.name, default.clone());
                }
            }
        }
    }
    Ok(Params { values })
}

/// Validated arguments of one call. Templates read them by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<&'static str, ParamValue>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParamValue::Text(s) | ParamValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn require_text(&self, name: &str) -> Result<&str, ParamError> {
        self.text(name).ok_or_else(|| missing(name))
    }

    pub fn text_list(&self, name: &str) -> Option<&[String]> {
        match self.get(name)? {
            ParamValue::TextList(items) => Some(items),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ParamValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn require_integer(&self, name: &str) -> Result<i64, ParamError> {
        self.integer(name).ok_or_else(|| missing(name))
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ParamValue::Number(v) | ParamValue::Length(v, _) => Some(*v),
            ParamValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn require_number(&self, name: &str) -> Result<f64, ParamError> {
        self.number(name).ok_or_else(|| missing(name))
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParamValue::Flag(v) => Some(*v),
            _ => None,
        }
    }

    /// Literal expression for an optional parameter.
    pub fn expr(&self, name: &str) -> Option<Expr> {
        self.get(name).map(ParamValue::to_expr)
    }

    pub fn require_expr(&self, name: &str) -> Result<Expr, ParamError> {
        self.expr(name).ok_or_else(|| missing(name))
    }
}

fn missing(name: &str) -> ParamError {
    ParamError::Missing(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::text("name", "Name").required(),
            ParamSpec::integer("count", "Count").range(1.0, 10.0).default_int(1),
            ParamSpec::length("width", "Width"),
            ParamSpec::choice("mode", "Mode", &["a", "b"]).default_choice("a"),
        ]
    }

    #[test]
    fn applies_defaults_and_units() {
        let params = validate(&specs(), &json!({ "name": "x", "width": 72 })).unwrap();
        assert_eq!(params.integer("count"), Some(1));
        assert_eq!(params.text("mode"), Some("a"));
        assert_eq!(params.get("width"), Some(&ParamValue::Length(72.0, Unit::Pt)));
    }

    #[test]
    fn rejects_contract_violations() {
        let specs = specs();
        assert_eq!(
            validate(&specs, &json!({})),
            Err(ParamError::Missing("name".into()))
        );
        assert_eq!(
            validate(&specs, &json!({ "name": "" })),
            Err(ParamError::Empty { name: "name".into() })
        );
        assert!(matches!(
            validate(&specs, &json!({ "name": "x", "count": 11 })),
            Err(ParamError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate(&specs, &json!({ "name": "x", "count": 1.5 })),
            Err(ParamError::WrongType { .. })
        ));
        assert!(matches!(
            validate(&specs, &json!({ "name": "x", "mode": "c" })),
            Err(ParamError::NotAChoice { .. })
        ));
        assert_eq!(
            validate(&specs, &json!({ "name": "x", "colour": "red" })),
            Err(ParamError::Unknown("colour".into()))
        );
        assert_eq!(validate(&specs, &json!([1])), Err(ParamError::NotAnObject));
    }

    #[test]
    fn whitespace_is_text() {
        let params = validate(&specs(), &json!({ "name": "  " })).unwrap();
        assert_eq!(params.text("name"), Some("  "));
    }

    #[test]
    fn whole_floats_are_integers() {
        let params = validate(&specs(), &json!({ "name": "x", "count": 3.0 })).unwrap();
        assert_eq!(params.integer("count"), Some(3));
    }

    #[test]
    fn schema_lists_enum_and_default() {
        let schema = ParamSpec::choice("mode", "Mode", &["a", "b"])
            .default_choice("a")
            .schema();
        assert_eq!(
            schema,
            json!({ "type": "string", "description": "Mode", "enum": ["a", "b"], "default": "a" })
        );
    }
}
