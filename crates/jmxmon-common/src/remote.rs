use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value read from (or returned by) a remote management bean.
///
/// Composite values nest, so an attribute path such as
/// `HeapMemoryUsage.used` is resolved one segment at a time through
/// [`RemoteValue::resolve_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Composite(BTreeMap<String, RemoteValue>),
    List(Vec<RemoteValue>),
}

/// Where a path walk stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMiss {
    /// The segment that could not be resolved.
    pub segment: String,
    /// Kind of the value the segment was applied to.
    pub found: &'static str,
}

impl RemoteValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteValue::Null => "null",
            RemoteValue::Bool(_) => "boolean",
            RemoteValue::Integer(_) => "integer",
            RemoteValue::Float(_) => "float",
            RemoteValue::Text(_) => "text",
            RemoteValue::Composite(_) => "composite",
            RemoteValue::List(_) => "list",
        }
    }

    /// Walks nested composite values along `segments`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use jmxmon_common::remote::RemoteValue;
    ///
    /// let mut usage = BTreeMap::new();
    /// usage.insert("used".to_string(), RemoteValue::Integer(1024));
    /// let heap = RemoteValue::Composite(usage);
    ///
    /// assert_eq!(heap.resolve_path(&["used"]), Ok(&RemoteValue::Integer(1024)));
    /// assert!(heap.resolve_path(&["max"]).is_err());
    /// ```
    pub fn resolve_path<S: AsRef<str>>(&self, segments: &[S]) -> Result<&RemoteValue, PathMiss> {
        let mut current = self;
        for segment in segments {
            let segment = segment.as_ref();
            current = match current {
                RemoteValue::Composite(fields) => fields.get(segment).ok_or_else(|| PathMiss {
                    segment: segment.to_string(),
                    found: "composite",
                })?,
                other => {
                    return Err(PathMiss {
                        segment: segment.to_string(),
                        found: other.kind(),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Integer reading of the value, if it has one.
    ///
    /// Integers qualify as they are; text qualifies when it parses as a
    /// signed 64-bit integer. Floats never do.
    pub fn as_counter(&self) -> Option<i64> {
        match self {
            RemoteValue::Integer(v) => Some(*v),
            RemoteValue::Text(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for RemoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteValue::Null => write!(f, "null"),
            RemoteValue::Bool(b) => write!(f, "{b}"),
            RemoteValue::Integer(v) => write!(f, "{v}"),
            RemoteValue::Float(v) => write!(f, "{v}"),
            RemoteValue::Text(s) => write!(f, "{s}"),
            RemoteValue::Composite(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                write!(f, "}}")
            }
            RemoteValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_usage() -> RemoteValue {
        let mut usage = BTreeMap::new();
        usage.insert("committed".to_string(), RemoteValue::Integer(4096));
        usage.insert("used".to_string(), RemoteValue::Integer(1024));
        let mut outer = BTreeMap::new();
        outer.insert("HeapMemoryUsage".to_string(), RemoteValue::Composite(usage));
        RemoteValue::Composite(outer)
    }

    #[test]
    fn resolve_nested_path() {
        let value = memory_usage();
        let used = value.resolve_path(&["HeapMemoryUsage", "used"]).unwrap();
        assert_eq!(used, &RemoteValue::Integer(1024));
    }

    #[test]
    fn resolve_empty_path_returns_self() {
        let value = RemoteValue::Integer(7);
        let segments: [&str; 0] = [];
        assert_eq!(value.resolve_path(&segments).unwrap(), &value);
    }

    #[test]
    fn resolve_through_scalar_reports_kind() {
        let value = memory_usage();
        let miss = value
            .resolve_path(&["HeapMemoryUsage", "used", "bits"])
            .unwrap_err();
        assert_eq!(miss.segment, "bits");
        assert_eq!(miss.found, "integer");
    }

    #[test]
    fn counter_from_integer_and_text() {
        assert_eq!(RemoteValue::Integer(-3).as_counter(), Some(-3));
        assert_eq!(RemoteValue::Text("42".into()).as_counter(), Some(42));
        assert_eq!(RemoteValue::Text(" 42".into()).as_counter(), None);
        assert_eq!(RemoteValue::Float(1.0).as_counter(), None);
        assert_eq!(RemoteValue::Null.as_counter(), None);
    }

    #[test]
    fn display_composite_sorted_by_key() {
        let value = memory_usage();
        assert_eq!(
            value.to_string(),
            "{HeapMemoryUsage={committed=4096, used=1024}}"
        );
    }
}
