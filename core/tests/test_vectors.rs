//! Verify the validator against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names a resource and caller options, and expects either the
//! exact wire parameters plus a warning count, or an exact error message.
//! Options decoded from JSON arrive with their keys sorted, so expected
//! parameters are listed in key order.

use launch_core::{validate, RawValue, Resource};

fn parse_resource(s: &str) -> Resource {
    Resource::ALL
        .into_iter()
        .find(|r| r.as_str() == s)
        .unwrap_or_else(|| panic!("unknown resource: {s}"))
}

#[test]
fn validation_test_vectors() {
    let raw = include_str!("../../test-vectors/validation.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let resource = parse_resource(case["resource"].as_str().unwrap());
        let options = RawValue::from(case["options"].clone());

        let result = validate(resource, &options);

        if let Some(expected) = case["expected_error"].as_str() {
            let err = result.expect_err(name);
            assert_eq!(err.to_string(), expected, "{name}: error");
            continue;
        }

        let validated = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
        let expected: Vec<(String, String)> = case["expected_params"]
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| {
                let pair = pair.as_array().unwrap();
                (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(validated.params.into_pairs(), expected, "{name}: params");
        assert_eq!(
            validated.warnings.len() as u64,
            case["expected_warnings"].as_u64().unwrap(),
            "{name}: warnings"
        );
    }
}
