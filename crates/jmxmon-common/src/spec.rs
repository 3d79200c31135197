//! Attribute specifications: which custom values to poll and how.
//!
//! A record has the form
//! `mode; title; attributePath; objectPattern[; methodName[; type; value]...]`.

use crate::error::{Result, SpecError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a value is reported as read or converted into a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeMode {
    Plain,
    Rate,
}

/// How the value is obtained from each matching object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeAccess {
    /// Read an attribute, then walk into composite values.
    Read(AttributePath),
    /// Invoke an operation with already-typed arguments.
    Invoke {
        method: String,
        params: Vec<MethodParam>,
    },
}

/// Dot-separated attribute path; the first segment is the attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributePath {
    segments: Vec<String>,
}

impl AttributePath {
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.trim().split('.').map(str::to_string).collect(),
        }
    }

    /// The attribute to read from the remote object.
    pub fn attribute(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    /// Segments to walk inside the attribute's composite value.
    pub fn nested(&self) -> &[String] {
        self.segments.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A typed argument for an operation invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// One operation argument: its JMX signature type and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodParam {
    /// Signature name, e.g. `int` or `java.lang.String`.
    pub signature: String,
    pub value: ParamValue,
}

impl MethodParam {
    /// Resolves a declared type and literal into a typed parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmxmon_common::spec::{MethodParam, ParamValue};
    ///
    /// let p = MethodParam::parse("Integer", "5").unwrap();
    /// assert_eq!(p.signature, "java.lang.Integer");
    /// assert_eq!(p.value, ParamValue::Int(5));
    /// assert!(MethodParam::parse("int", "five").is_err());
    /// ```
    pub fn parse(type_name: &str, literal: &str) -> Result<Self> {
        let type_name = type_name.trim();
        let literal = literal.trim();
        let class = type_name.strip_prefix("java.lang.").unwrap_or(type_name);
        let invalid = || SpecError::InvalidParamValue {
            type_name: type_name.to_string(),
            literal: literal.to_string(),
        };

        let (signature, value) = match type_name {
            "boolean" => ("boolean".to_string(), parse_bool(literal)),
            "int" => (
                "int".to_string(),
                ParamValue::Int(literal.parse::<i32>().map_err(|_| invalid())?.into()),
            ),
            "long" => (
                "long".to_string(),
                ParamValue::Int(literal.parse::<i64>().map_err(|_| invalid())?),
            ),
            "double" => (
                "double".to_string(),
                ParamValue::Float(literal.parse::<f64>().map_err(|_| invalid())?),
            ),
            _ => {
                let value = match class {
                    "String" => ParamValue::Text(literal.to_string()),
                    "Boolean" => parse_bool(literal),
                    "Integer" => {
                        ParamValue::Int(literal.parse::<i32>().map_err(|_| invalid())?.into())
                    }
                    "Long" => ParamValue::Int(literal.parse::<i64>().map_err(|_| invalid())?),
                    "Short" => {
                        ParamValue::Int(literal.parse::<i16>().map_err(|_| invalid())?.into())
                    }
                    "Byte" => ParamValue::Int(literal.parse::<i8>().map_err(|_| invalid())?.into()),
                    "Double" | "Float" => {
                        ParamValue::Float(literal.parse::<f64>().map_err(|_| invalid())?)
                    }
                    _ => return Err(SpecError::UnknownParamType(type_name.to_string())),
                };
                (format!("java.lang.{class}"), value)
            }
        };

        Ok(Self { signature, value })
    }
}

fn parse_bool(literal: &str) -> ParamValue {
    // Anything but "true" (any case) reads as false.
    ParamValue::Bool(literal.eq_ignore_ascii_case("true"))
}

/// One configured custom metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub mode: AttributeMode,
    pub title: String,
    /// Attribute path as configured (`invoke` for operations).
    pub attribute_name: String,
    /// Object name pattern, may match many instances.
    pub object_pattern: String,
    pub access: AttributeAccess,
}

impl AttributeSpec {
    /// Parses one `;`-separated attribute record.
    ///
    /// Returns `Ok(None)` for a blank record.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmxmon_common::spec::{AttributeMode, AttributeSpec};
    ///
    /// let spec = AttributeSpec::parse("; Used JVM Mem; HeapMemoryUsage.used; java.lang:type=Memory")
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(spec.mode, AttributeMode::Plain);
    /// assert_eq!(spec.title, "Used JVM Mem");
    /// assert_eq!(spec.object_pattern, "java.lang:type=Memory");
    /// ```
    pub fn parse(record: &str) -> Result<Option<Self>> {
        if record.trim().is_empty() {
            return Ok(None);
        }

        let fields: Vec<&str> = record.split(';').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(SpecError::TooFewFields(record.to_string()));
        }

        let mode_field = fields[0].to_ascii_lowercase();
        let mode = if mode_field.starts_with("diff") || mode_field.starts_with("rate") {
            AttributeMode::Rate
        } else {
            AttributeMode::Plain
        };

        let title = fields[1];
        let attribute_name = fields[2];
        let object_pattern = fields[3];
        for (field, value) in [
            ("title", title),
            ("attribute", attribute_name),
            ("object pattern", object_pattern),
        ] {
            if value.is_empty() {
                return Err(SpecError::EmptyField {
                    record: record.to_string(),
                    field,
                });
            }
        }

        let access = if attribute_name.eq_ignore_ascii_case("invoke") {
            let method = fields
                .get(4)
                .filter(|m| !m.is_empty())
                .ok_or_else(|| SpecError::MissingMethod(record.to_string()))?;
            let raw_params = fields.get(5..).unwrap_or_default();
            if raw_params.len() % 2 != 0 {
                return Err(SpecError::UnpairedParams(record.to_string()));
            }
            let params = raw_params
                .chunks(2)
                .map(|pair| MethodParam::parse(pair[0], pair[1]))
                .collect::<Result<Vec<_>>>()?;
            AttributeAccess::Invoke {
                method: method.to_string(),
                params,
            }
        } else {
            AttributeAccess::Read(AttributePath::parse(attribute_name))
        };

        Ok(Some(Self {
            mode,
            title: title.to_string(),
            attribute_name: attribute_name.to_string(),
            object_pattern: object_pattern.to_string(),
            access,
        }))
    }

    /// Parses records in order, skipping blank ones.
    pub fn parse_all<S: AsRef<str>>(records: &[S]) -> Result<Vec<Self>> {
        let mut specs = Vec::with_capacity(records.len());
        for record in records {
            if let Some(spec) = Self::parse(record.as_ref())? {
                specs.push(spec);
            }
        }
        Ok(specs)
    }

    pub fn is_rate(&self) -> bool {
        self.mode == AttributeMode::Rate
    }
}
