//! Custom Assertion Helpers
//!
//! Assertions over the calls recorded by `RecordingTransport`.

use serde_json::Value;

use domain_woo::adapter::mock::RecordedCall;
use domain_woo::HttpMethod;

/// Asserts that `call` is `method resource` with `arguments`
pub fn assert_call(call: &RecordedCall, method: HttpMethod, resource: &str, arguments: &Value) {
    assert_eq!(call.method, method, "unexpected method for {}", call.resource);
    assert_eq!(call.resource, resource, "unexpected resource");
    assert_eq!(&call.arguments, arguments, "unexpected arguments for {method} {resource}");
}

/// Asserts the sequence of verbs of `calls`
pub fn assert_methods(calls: &[RecordedCall], expected: &[HttpMethod]) {
    let methods: Vec<HttpMethod> = calls.iter().map(|call| call.method).collect();
    assert_eq!(methods, expected, "unexpected call sequence");
}
