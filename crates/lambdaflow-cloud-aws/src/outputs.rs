//! `cdk deploy --outputs-file` reader
//!
//! The file maps stack name to output key to value:
//!
//! ```json
//! { "my-app-main": { "FunctionUrl": "https://abc.lambda-url.ap-northeast-2.on.aws/" } }
//! ```

use crate::error::{AwsError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Output key holding the Lambda function URL unless configured otherwise
pub const DEFAULT_URL_OUTPUT_KEY: &str = "FunctionUrl";

/// Marker of a Lambda function URL host
const LAMBDA_URL_MARKER: &str = ".lambda-url.";

/// Stack name → output key → value
pub type StackOutputs = BTreeMap<String, Map<String, Value>>;

pub fn read_outputs(path: &Path) -> Result<StackOutputs> {
    let content = std::fs::read_to_string(path).map_err(|source| AwsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| AwsError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Find the function URL of `stack`
///
/// `key` is tried first, then any string output containing `.lambda-url.`.
pub fn find_function_url(outputs: &StackOutputs, stack: &str, key: &str) -> Option<String> {
    let stack_outputs = outputs.get(stack)?;

    let by_key = stack_outputs.get(key).and_then(Value::as_str);
    let by_marker = || {
        stack_outputs
            .values()
            .filter_map(Value::as_str)
            .find(|v| v.contains(LAMBDA_URL_MARKER))
    };

    by_key
        .or_else(by_marker)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Read the outputs file and return the function URL as a bare host
pub fn read_function_url(path: &Path, stack: &str, key: &str) -> Result<String> {
    let outputs = read_outputs(path)?;
    find_function_url(&outputs, stack, key)
        .map(|url| normalize_host(&url))
        .ok_or_else(|| AwsError::OutputsNotFound(format!("{} / {}", stack, key)))
}

/// `https://abc.lambda-url.region.on.aws/` → `abc.lambda-url.region.on.aws`
pub fn normalize_host(url: &str) -> String {
    let url = url.trim();
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUTS: &str = r#"{
  "my-app-main": {
    "FunctionUrl": "https://abc.lambda-url.ap-northeast-2.on.aws/",
    "BucketName": "my-app-main-assets"
  },
  "other-stack": {
    "Endpoint": "https://xyz.lambda-url.us-east-1.on.aws/"
  }
}"#;

    fn outputs() -> StackOutputs {
        serde_json::from_str(OUTPUTS).unwrap()
    }

    #[test]
    fn test_configured_key() {
        assert_eq!(
            find_function_url(&outputs(), "my-app-main", DEFAULT_URL_OUTPUT_KEY).as_deref(),
            Some("https://abc.lambda-url.ap-northeast-2.on.aws/")
        );
    }

    #[test]
    fn test_fallback_search() {
        assert_eq!(
            find_function_url(&outputs(), "other-stack", DEFAULT_URL_OUTPUT_KEY).as_deref(),
            Some("https://xyz.lambda-url.us-east-1.on.aws/")
        );
        // キーが URL 以外を指していても構わない
        assert_eq!(
            find_function_url(&outputs(), "my-app-main", "BucketName").as_deref(),
            Some("my-app-main-assets")
        );
    }

    #[test]
    fn test_absent() {
        assert_eq!(find_function_url(&outputs(), "missing-stack", DEFAULT_URL_OUTPUT_KEY), None);

        let outputs: StackOutputs =
            serde_json::from_str(r#"{ "s": { "BucketName": "b", "Port": 443 } }"#).unwrap();
        assert_eq!(find_function_url(&outputs, "s", DEFAULT_URL_OUTPUT_KEY), None);
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("https://abc.lambda-url.ap-northeast-2.on.aws/"),
            "abc.lambda-url.ap-northeast-2.on.aws"
        );
        assert_eq!(normalize_host("abc.lambda-url.on.aws"), "abc.lambda-url.on.aws");
        assert_eq!(normalize_host(" http://host/path?q=1 "), "host");
    }

    #[test]
    fn test_read_function_url() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cdk-outputs.json");
        std::fs::write(&path, OUTPUTS).unwrap();

        assert_eq!(
            read_function_url(&path, "my-app-main", DEFAULT_URL_OUTPUT_KEY).unwrap(),
            "abc.lambda-url.ap-northeast-2.on.aws"
        );
        assert!(matches!(
            read_function_url(&path, "nope", DEFAULT_URL_OUTPUT_KEY),
            Err(AwsError::OutputsNotFound(_))
        ));
    }

    #[test]
    fn test_read_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cdk-outputs.json");

        assert!(matches!(read_outputs(&path), Err(AwsError::Io { .. })));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(read_outputs(&path), Err(AwsError::Json { .. })));
    }
}
