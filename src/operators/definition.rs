// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative operator contracts: input slots, output slots and the typed
//! attribute schema every instance is validated against.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::GraphError;
use crate::schema::{FeatureType, Schema};

/// Kind of a non-data operator parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Integer,
    String,
    Boolean,
    StringList,
    StringMap,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::Float => "float",
            AttributeType::Integer => "integer",
            AttributeType::String => "string",
            AttributeType::Boolean => "boolean",
            AttributeType::StringList => "list of strings",
            AttributeType::StringMap => "map of strings",
        };
        f.write_str(name)
    }
}

/// Value of a non-data operator parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f64),
    Integer(i64),
    String(String),
    Boolean(bool),
    StringList(Vec<String>),
    StringMap(BTreeMap<String, String>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeType {
        match self {
            AttributeValue::Float(_) => AttributeType::Float,
            AttributeValue::Integer(_) => AttributeType::Integer,
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::Boolean(_) => AttributeType::Boolean,
            AttributeValue::StringList(_) => AttributeType::StringList,
            AttributeValue::StringMap(_) => AttributeType::StringMap,
        }
    }

    /// Converts the value to `kind`; integers widen to floats, nothing else converts.
    fn coerce(self, kind: AttributeType) -> Result<AttributeValue, AttributeValue> {
        match (self, kind) {
            (AttributeValue::Integer(v), AttributeType::Float) => Ok(AttributeValue::Float(v as f64)),
            (value, kind) if value.kind() == kind => Ok(value),
            (value, _) => Err(value),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        AttributeValue::StringList(value)
    }
}

impl From<BTreeMap<String, String>> for AttributeValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        AttributeValue::StringMap(value)
    }
}

/// Declared attribute: name, kind and optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDef {
    pub name: &'static str,
    pub kind: AttributeType,
    pub default: Option<AttributeValue>,
}

impl AttributeDef {
    pub fn required(name: &'static str, kind: AttributeType) -> Self {
        Self {
            name,
            kind,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: AttributeType, default: AttributeValue) -> Self {
        Self {
            name,
            kind,
            default: Some(default),
        }
    }
}

/// Attribute values bound to one operator instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.0.get(name) {
            Some(AttributeValue::Float(v)) => Some(*v),
            Some(AttributeValue::Integer(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(AttributeValue::String(v)) => Some(v),
            _ => None,
        }
    }

    pub fn string_list(&self, name: &str) -> Option<&[String]> {
        match self.0.get(name) {
            Some(AttributeValue::StringList(v)) => Some(v),
            _ => None,
        }
    }

    pub fn string_map(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        match self.0.get(name) {
            Some(AttributeValue::StringMap(v)) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Constraint every feature of an input slot must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureConstraint {
    Any,
    Numeric,
    Float,
    /// Exactly one feature, of boolean type.
    SingleBoolean,
}

impl FeatureConstraint {
    fn check(self, key: &str, slot: &str, schema: &Schema) -> Result<(), GraphError> {
        match self {
            FeatureConstraint::Any => Ok(()),
            FeatureConstraint::Numeric => Self::each(key, slot, schema, FeatureType::is_numeric, "a numeric"),
            FeatureConstraint::Float => Self::each(key, slot, schema, FeatureType::is_float, "a floating point"),
            FeatureConstraint::SingleBoolean => match schema.features.as_slice() {
                [feature] if feature.dtype == FeatureType::Boolean => Ok(()),
                _ => Err(GraphError::type_contract(
                    key,
                    format!(
                        "input '{}' must hold a single boolean feature, got [{}]",
                        slot,
                        describe_features(schema)
                    ),
                )),
            },
        }
    }

    fn each(
        key: &str,
        slot: &str,
        schema: &Schema,
        accepts: fn(FeatureType) -> bool,
        expected: &str,
    ) -> Result<(), GraphError> {
        match schema.features.iter().find(|f| !accepts(f.dtype)) {
            None => Ok(()),
            Some(feature) => Err(GraphError::type_contract(
                key,
                format!(
                    "feature '{}' of input '{}' has type {}; expected {} type. Cast the feature first",
                    feature.name, slot, feature.dtype, expected
                ),
            )),
        }
    }
}

fn describe_features(schema: &Schema) -> String {
    schema
        .features
        .iter()
        .map(|f| format!("{}: {}", f.name, f.dtype))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Declared input slot.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDef {
    pub name: &'static str,
    pub constraint: FeatureConstraint,
    /// Optional slots come after every required slot and may be left unbound.
    pub optional: bool,
}

/// What an operator's contract function sees at construction time.
#[derive(Debug)]
pub struct OperatorContext<'a> {
    pub key: &'a str,
    /// Input schemas in slot order.
    pub inputs: &'a [&'a Schema],
    /// Validated attributes, defaults filled in.
    pub attributes: &'a Attributes,
}

impl OperatorContext<'_> {
    pub fn input(&self, slot: usize) -> &Schema {
        self.inputs[slot]
    }

    pub fn type_error(&self, message: impl Into<String>) -> GraphError {
        GraphError::type_contract(self.key, message)
    }

    pub fn attribute_error(&self, attribute: &str, message: impl Into<String>) -> GraphError {
        GraphError::invalid_attribute(self.key, attribute, message)
    }
}

/// Operator-specific contract: checks relations between inputs and
/// attributes and returns one schema per declared output.
pub type InferFn = fn(&OperatorContext<'_>) -> Result<Vec<Schema>, GraphError>;

/// Immutable description of an operator, registered once at startup.
#[derive(Clone)]
pub struct OperatorDefinition {
    pub key: &'static str,
    pub inputs: Vec<InputDef>,
    pub outputs: Vec<&'static str>,
    pub attributes: Vec<AttributeDef>,
    pub infer: InferFn,
}

impl fmt::Debug for OperatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDefinition")
            .field("key", &self.key)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl OperatorDefinition {
    pub fn new(key: &'static str, infer: InferFn) -> Self {
        Self {
            key,
            inputs: Vec::new(),
            outputs: Vec::new(),
            attributes: Vec::new(),
            infer,
        }
    }

    pub fn input(mut self, name: &'static str, constraint: FeatureConstraint) -> Self {
        self.inputs.push(InputDef {
            name,
            constraint,
            optional: false,
        });
        self
    }

    /// Adds a trailing slot that instances may leave unbound.
    pub fn optional_input(mut self, name: &'static str, constraint: FeatureConstraint) -> Self {
        self.inputs.push(InputDef {
            name,
            constraint,
            optional: true,
        });
        self
    }

    /// Number of slots every instance must bind.
    pub fn required_inputs(&self) -> usize {
        self.inputs.iter().take_while(|input| !input.optional).count()
    }

    pub fn output(mut self, name: &'static str) -> Self {
        self.outputs.push(name);
        self
    }

    pub fn attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn output_position(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|o| *o == name)
    }

    /// Checks slot count and per-slot feature constraints. Inputs bind slots
    /// in declaration order; trailing optional slots may be left out.
    pub fn check_inputs(&self, inputs: &[&Schema]) -> Result<(), GraphError> {
        let required = self.required_inputs();
        if inputs.len() < required || inputs.len() > self.inputs.len() {
            let slots: Vec<&str> = self.inputs.iter().map(|i| i.name).collect();
            let expected = if required == self.inputs.len() {
                required.to_string()
            } else {
                format!("{} to {}", required, self.inputs.len())
            };
            return Err(GraphError::type_contract(
                self.key,
                format!(
                    "expected {} inputs [{}], got {}",
                    expected,
                    slots.join(", "),
                    inputs.len()
                ),
            ));
        }
        for (slot, schema) in self.inputs.iter().zip(inputs) {
            slot.constraint.check(self.key, slot.name, schema)?;
        }
        Ok(())
    }

    /// Validates `given` against the attribute schema and fills in defaults.
    pub fn validate_attributes(&self, given: Attributes) -> Result<Attributes, GraphError> {
        let mut given = given.0;
        let mut validated = Attributes::new();

        for def in &self.attributes {
            let value = match given.remove(def.name) {
                Some(value) => value.coerce(def.kind).map_err(|value| {
                    GraphError::invalid_attribute(
                        self.key,
                        def.name,
                        format!("expected {}, got {}", def.kind, value.kind()),
                    )
                })?,
                None => def.default.clone().ok_or_else(|| {
                    GraphError::invalid_attribute(self.key, def.name, "missing required attribute")
                })?,
            };
            validated.0.insert(def.name.to_string(), value);
        }

        if let Some(unknown) = given.keys().next() {
            return Err(GraphError::invalid_attribute(
                self.key,
                unknown,
                "unknown attribute",
            ));
        }

        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FeatureSchema;

    fn passthrough(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
        Ok(vec![ctx.input(0).clone()])
    }

    fn definition() -> OperatorDefinition {
        OperatorDefinition::new("SCALE", passthrough)
            .input("input", FeatureConstraint::Numeric)
            .output("output")
            .attribute(AttributeDef::required("factor", AttributeType::Float))
            .attribute(AttributeDef::optional(
                "label",
                AttributeType::String,
                AttributeValue::from("scaled"),
            ))
    }

    fn schema(dtype: FeatureType) -> Schema {
        Schema::new(vec![FeatureSchema::new("x", dtype)], vec![])
    }

    #[test]
    fn test_attributes_defaults_and_widening() {
        let attributes = definition()
            .validate_attributes(Attributes::new().with("factor", 2i64))
            .unwrap();
        assert_eq!(attributes.float("factor"), Some(2.0));
        assert_eq!(attributes.get("factor"), Some(&AttributeValue::Float(2.0)));
        assert_eq!(attributes.string("label"), Some("scaled"));
    }

    #[test]
    fn test_attribute_failures() {
        let cases = vec![
            ("missing", Attributes::new(), "factor"),
            ("wrong kind", Attributes::new().with("factor", "two"), "factor"),
            (
                "unknown",
                Attributes::new().with("factor", 1.0).with("offset", 1.0),
                "offset",
            ),
        ];

        for (name, attributes, expected_attribute) in cases {
            match definition().validate_attributes(attributes) {
                Err(GraphError::InvalidAttribute { attribute, .. }) => {
                    assert_eq!(attribute, expected_attribute, "case '{}'", name)
                }
                other => panic!("case '{}': expected InvalidAttribute, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_input_constraints() {
        let def = definition();
        let float = schema(FeatureType::Float64);
        let text = schema(FeatureType::String);

        assert!(def.check_inputs(&[&float]).is_ok());
        assert!(matches!(
            def.check_inputs(&[&text]),
            Err(GraphError::TypeContract { .. })
        ));
        assert!(matches!(
            def.check_inputs(&[&float, &float]),
            Err(GraphError::TypeContract { .. })
        ));
    }

    #[test]
    fn test_optional_trailing_input() {
        let def = OperatorDefinition::new("WINDOWED", passthrough)
            .input("input", FeatureConstraint::Numeric)
            .optional_input("sampling", FeatureConstraint::Any)
            .output("output");
        let float = schema(FeatureType::Float64);
        let text = schema(FeatureType::String);

        assert_eq!(def.required_inputs(), 1);
        assert!(def.check_inputs(&[&float]).is_ok());
        assert!(def.check_inputs(&[&float, &text]).is_ok());
        assert!(def.check_inputs(&[]).is_err());
        assert!(def.check_inputs(&[&float, &text, &text]).is_err());
    }

    #[test]
    fn test_single_boolean_constraint() {
        let flag = schema(FeatureType::Boolean);
        let two_flags = Schema::new(
            vec![
                FeatureSchema::new("a", FeatureType::Boolean),
                FeatureSchema::new("b", FeatureType::Boolean),
            ],
            vec![],
        );
        assert!(FeatureConstraint::SingleBoolean.check("F", "condition", &flag).is_ok());
        assert!(FeatureConstraint::SingleBoolean
            .check("F", "condition", &two_flags)
            .is_err());
    }
}
