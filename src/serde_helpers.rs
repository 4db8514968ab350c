//! Response body decoding.
//!
//! When the `tracing` feature is enabled, unknown fields are logged as warnings and a
//! failed decode is logged with the path of the offending field, which helps detect
//! API changes.

use serde::de::DeserializeOwned;

/// Decode a JSON body, warning about fields the target type does not capture.
///
/// Unknown fields never cause decoding to fail.
///
/// ```ignore
/// let body = br#"{"known_field": "value", "unknown_field": "extra"}"#;
/// let result: MyType = deserialize_with_warnings(body)?;
/// // Logs: WARN unknown field in API response field="unknown_field" value="extra"
/// ```
#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(body: &[u8]) -> crate::Result<T> {
    use std::any::type_name;

    let mut unknown_paths: Vec<String> = Vec::new();
    let mut de = serde_json::Deserializer::from_slice(body);
    let mut record_unknown =
        |path: serde_ignored::Path<'_>| unknown_paths.push(path.to_string());

    let result: T = serde_path_to_error::deserialize(serde_ignored::Deserializer::new(
        &mut de,
        &mut record_unknown,
    ))
    .map_err(|e| {
        tracing::error!(
            type_name = %type_name::<T>(),
            path = %e.path(),
            error = %e.inner(),
            "deserialization failed"
        );
        e.into_inner()
    })?;
    de.end()?;

    if !unknown_paths.is_empty() {
        let original = serde_json::from_slice::<serde_json::Value>(body).ok();
        for path in unknown_paths {
            let value = original
                .as_ref()
                .and_then(|v| v.pointer(&json_pointer(&path)))
                .map_or_else(|| "<unable to retrieve>".to_owned(), ToString::to_string);

            tracing::warn!(
                type_name = %type_name::<T>(),
                field = %path,
                value = %value,
                "unknown field in API response"
            );
        }
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(body: &[u8]) -> crate::Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Turns a `serde_ignored` path (`members.3.name`, with `?` for options) into a JSON
/// pointer (`/members/3/name`).
#[cfg(feature = "tracing")]
fn json_pointer(path: &str) -> String {
    path.split('.')
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .fold(String::new(), |mut pointer, segment| {
            pointer.push('/');
            pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
            pointer
        })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::deserialize_with_warnings;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        known_field: String,
        #[serde(default)]
        optional_field: Option<i32>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct NestedStruct {
        outer: String,
        inner: InnerStruct,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct InnerStruct {
        value: i32,
    }

    #[test]
    fn deserialize_known_fields_only() {
        let body = br#"{"known_field": "value", "optional_field": 42}"#;

        let result: TestStruct = deserialize_with_warnings(body).expect("deserialization failed");
        assert_eq!(result.known_field, "value");
        assert_eq!(result.optional_field, Some(42));
    }

    #[test]
    fn deserialize_with_unknown_fields() {
        let body = br#"{"known_field": "value", "unknown_field": "extra", "another_unknown": 123}"#;

        let result: TestStruct = deserialize_with_warnings(body).expect("deserialization failed");
        assert_eq!(result.known_field, "value");
        assert_eq!(result.optional_field, None);
    }

    #[test]
    fn deserialize_missing_required_field_fails() {
        let body = br#"{"optional_field": 42}"#;

        let err = deserialize_with_warnings::<TestStruct>(body).expect_err("missing field");
        assert_eq!(err.kind(), crate::error::Kind::Decode);
    }

    #[test]
    fn deserialize_trailing_garbage_fails() {
        let body = br#"{"known_field": "value"} trailing"#;

        deserialize_with_warnings::<TestStruct>(body).expect_err("trailing characters");
    }

    #[test]
    fn deserialize_array() {
        let result: Vec<i32> = deserialize_with_warnings(b"[1, 2, 3]").expect("deserialization failed");
        assert_eq!(result, vec![1, 2, 3]);
    }

    #[test]
    fn deserialize_nested_unknown_fields() {
        let body = br#"{"outer": "test", "inner": {"value": 42, "nested_unknown": "surprise"}}"#;

        let result: NestedStruct =
            deserialize_with_warnings(body).expect("deserialization failed");
        assert_eq!(result.outer, "test");
        assert_eq!(result.inner.value, 42);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn json_pointer_skips_option_markers() {
        assert_eq!(super::json_pointer("members.?.3.name"), "/members/3/name");
        assert_eq!(super::json_pointer("a/b"), "/a~1b");
        assert_eq!(super::json_pointer(""), "");
    }

    /// Captures tracing output to prove unknown fields are reported.
    #[cfg(feature = "tracing")]
    #[test]
    fn warning_is_emitted_for_unknown_fields() {
        use std::sync::{Arc, Mutex};

        use tracing_subscriber::layer::SubscriberExt as _;

        struct CaptureWriter(Arc<Mutex<Vec<String>>>);

        impl std::io::Write for CaptureWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if let Ok(s) = std::str::from_utf8(buf) {
                    self.0.lock().expect("lock").push(s.to_owned());
                }
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let warnings: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let writer_target = Arc::clone(&warnings);

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(move || CaptureWriter(Arc::clone(&writer_target)))
            .with_ansi(false);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            let body = br#"{"known_field": "value", "clan_wars_2": "surprise!", "another_unknown": 42}"#;

            let result: TestStruct =
                deserialize_with_warnings(body).expect("deserialization should succeed");
            assert_eq!(result.known_field, "value");
        });

        let all_output = warnings.lock().expect("lock").join("");
        assert!(
            all_output.contains("unknown field"),
            "Expected 'unknown field' in output, got: {all_output}"
        );
        assert!(
            all_output.contains("clan_wars_2"),
            "Expected 'clan_wars_2' in output, got: {all_output}"
        );
        assert!(
            all_output.contains("surprise!"),
            "Expected the field value in output, got: {all_output}"
        );
    }
}
