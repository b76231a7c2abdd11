//! Canonical hashing shared by seed derivation and criteria fingerprints.
//!
//! Values are rendered into a key-sorted, type-tagged string form before hashing, so two
//! logically equal structures hash the same no matter how their maps were built. Strings
//! carry a length prefix, which keeps the joined form unambiguous.

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::Criteria;

const SEED_BYTES: usize = 6;

pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push('n'),
        Value::Bool(flag) => {
            out.push_str(if *flag { "b:1" } else { "b:0" });
        }
        Value::Number(number) => {
            out.push_str("d:");
            out.push_str(&number.to_string());
        }
        Value::String(text) => write_string(text, out),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push('=');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
    }
}

fn write_string(text: &str, out: &mut String) {
    out.push_str("s:");
    out.push_str(&text.len().to_string());
    out.push(':');
    out.push_str(text);
}

/// Converts any serializable value into a seed part. Values that cannot be represented
/// as JSON collapse to `Null` and are skipped by [`derive_seed`].
pub fn part<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Stable seed for a tuple of inputs. `Null` parts are skipped.
pub fn derive_seed(parts: &[Value]) -> u64 {
    let joined = parts
        .iter()
        .filter(|part| !part.is_null())
        .map(canonicalize)
        .collect::<Vec<_>>()
        .join("|");

    let digest = Sha256::digest(joined.as_bytes());
    digest[..SEED_BYTES]
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// `StdRng` is only reproducible within one `rand` minor line, so the dependency stays
/// pinned to 0.8.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Order-independent fingerprint of a request, used to flag artifacts produced from
/// criteria that have since changed.
pub fn criteria_signature(criteria: &Criteria) -> String {
    let mut normalized = criteria.clone();
    for set in [
        &mut normalized.industries,
        &mut normalized.functions,
        &mut normalized.levels,
    ] {
        set.sort();
        set.dedup();
    }

    let digest = Sha256::digest(canonicalize(&part(&normalized)).as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_form_ignores_key_order() {
        let a = json!({"b": 1, "a": [true, "x"]});
        let b: Value = serde_json::from_str(r#"{"a": [true, "x"], "b": 1}"#).unwrap();
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn seed_is_stable_and_fits_48_bits() {
        let parts = [json!("e1"), json!({"industries": ["SaaS"]}), json!(45)];
        let first = derive_seed(&parts);
        assert_eq!(first, derive_seed(&parts));
        assert!(first < (1u64 << 48));
    }

    #[test]
    fn seed_matches_recorded_value() {
        let parts = [json!("e1"), json!({"industries": ["SaaS"]}), json!(45)];
        assert_eq!(
            parts.iter().map(canonicalize).collect::<Vec<_>>().join("|"),
            "s:2:e1|{s:10:industries=[s:4:SaaS]}|d:45"
        );
        assert_eq!(derive_seed(&parts), 27_337_174_383_746);
    }

    #[test]
    fn differently_split_parts_do_not_collide() {
        let joined = derive_seed(&[json!("a|b")]);
        let split = derive_seed(&[json!("a"), json!("b")]);
        assert_ne!(joined, split);
    }

    #[test]
    fn null_parts_are_skipped() {
        assert_eq!(
            derive_seed(&[json!("a"), Value::Null, json!("b")]),
            derive_seed(&[json!("a"), json!("b")])
        );
    }

    #[test]
    fn signature_ignores_set_order() {
        let mut first = Criteria::default();
        first.industries = vec!["SaaS".to_string(), "Healthcare".to_string()];
        let mut second = first.clone();
        second.industries.reverse();
        assert_eq!(criteria_signature(&first), criteria_signature(&second));

        second.budget = 300.0;
        assert_ne!(criteria_signature(&first), criteria_signature(&second));
    }
}
