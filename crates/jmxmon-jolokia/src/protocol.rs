//! Jolokia request and response bodies.

use jmxmon_common::remote::RemoteValue;
use jmxmon_common::spec::{MethodParam, ParamValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JolokiaError, Result};

/// One request posted to the agent endpoint.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request<'a> {
    Read {
        mbean: &'a str,
        attribute: &'a str,
    },
    Search {
        mbean: &'a str,
    },
    Exec {
        mbean: &'a str,
        operation: String,
        arguments: Vec<Value>,
    },
    Version,
}

impl<'a> Request<'a> {
    /// Builds an `exec` request, with the full signature so overloaded
    /// operations resolve.
    pub fn exec(mbean: &'a str, method: &str, params: &[MethodParam]) -> Self {
        Request::Exec {
            mbean,
            operation: operation_signature(method, params),
            arguments: params.iter().map(|p| param_json(&p.value)).collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::Read { .. } => "read",
            Request::Search { .. } => "search",
            Request::Exec { .. } => "exec",
            Request::Version => "version",
        }
    }
}

/// Response envelope. `status` mirrors HTTP codes; 200 means success.
#[derive(Debug, Deserialize)]
pub struct Response {
    pub status: u16,
    /// Absent and `null` both read as [`Value::Null`].
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl Response {
    /// The value of a successful response, or the remote error.
    pub fn into_value(self) -> Result<Value> {
        if self.status != 200 {
            return Err(JolokiaError::Remote {
                status: self.status,
                error_type: self.error_type.unwrap_or_else(|| "unknown".to_string()),
                message: self.error.unwrap_or_default(),
            });
        }
        Ok(self.value)
    }
}

/// `name(type1,type2)`.
pub fn operation_signature(method: &str, params: &[MethodParam]) -> String {
    let types: Vec<&str> = params.iter().map(|p| p.signature.as_str()).collect();
    format!("{method}({})", types.join(","))
}

fn param_json(value: &ParamValue) -> Value {
    match value {
        ParamValue::Bool(b) => Value::Bool(*b),
        ParamValue::Int(i) => Value::from(*i),
        ParamValue::Float(f) => Value::from(*f),
        ParamValue::Text(s) => Value::String(s.clone()),
    }
}

/// Converts a JSON value into the remote value model.
///
/// # Examples
///
/// ```
/// use jmxmon_common::remote::RemoteValue;
/// use jmxmon_jolokia::protocol::to_remote;
///
/// let value = serde_json::json!({"used": 1024, "max": -1});
/// let remote = to_remote(&value);
/// assert_eq!(remote.resolve_path(&["used"]), Ok(&RemoteValue::Integer(1024)));
/// ```
pub fn to_remote(value: &Value) -> RemoteValue {
    match value {
        Value::Null => RemoteValue::Null,
        Value::Bool(b) => RemoteValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => RemoteValue::Integer(i),
            None => RemoteValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => RemoteValue::Text(s.clone()),
        Value::Array(items) => RemoteValue::List(items.iter().map(to_remote).collect()),
        Value::Object(fields) => RemoteValue::Composite(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_remote(v)))
                .collect(),
        ),
    }
}

/// Object names listed by a `search` response.
pub fn search_names(value: &Value) -> Result<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(JolokiaError::HttpStatus {
            status: 200,
            body: format!("search returned {value}"),
        });
    };
    Ok(items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_request_shape() {
        let req = Request::Read {
            mbean: "java.lang:type=Runtime",
            attribute: "Uptime",
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"type": "read", "mbean": "java.lang:type=Runtime", "attribute": "Uptime"})
        );
        assert_eq!(serde_json::to_value(Request::Version).unwrap(), json!({"type": "version"}));
    }

    #[test]
    fn exec_request_carries_signature_and_typed_args() {
        let params = vec![
            MethodParam::parse("long", "7").unwrap(),
            MethodParam::parse("String", "x").unwrap(),
        ];
        let req = Request::exec("java.lang:type=Threading", "getThreadInfo", &params);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "type": "exec",
                "mbean": "java.lang:type=Threading",
                "operation": "getThreadInfo(long,java.lang.String)",
                "arguments": [7, "x"]
            })
        );
    }

    #[test]
    fn no_arg_operation_signature() {
        assert_eq!(operation_signature("gc", &[]), "gc()");
    }

    #[test]
    fn remote_error_status() {
        let resp: Response = serde_json::from_value(json!({
            "status": 404,
            "error_type": "javax.management.InstanceNotFoundException",
            "error": "java.lang:type=Nope"
        }))
        .unwrap();
        match resp.into_value() {
            Err(JolokiaError::Remote { status, error_type, .. }) => {
                assert_eq!(status, 404);
                assert!(error_type.ends_with("InstanceNotFoundException"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn numbers_map_to_integer_or_float() {
        assert_eq!(to_remote(&json!(5)), RemoteValue::Integer(5));
        assert_eq!(to_remote(&json!(0.25)), RemoteValue::Float(0.25));
        assert_eq!(to_remote(&json!(null)), RemoteValue::Null);
        assert_eq!(
            to_remote(&json!(["a"])),
            RemoteValue::List(vec![RemoteValue::Text("a".into())])
        );
    }

    #[test]
    fn search_response_names() {
        let names = search_names(&json!(["a:b=1", "a:b=2"])).unwrap();
        assert_eq!(names, ["a:b=1", "a:b=2"]);
        assert!(search_names(&json!({"x": 1})).is_err());
    }
}
