//! Claim types for Tessera
//!
//! A claim is a flat set of properties about its owner, validated against a
//! claim type (cType) identified by its hash. Schema validation itself happens
//! outside this crate; only the cType hash travels with the claim.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::compress::{expect_array, field};
use crate::digest::{Address, Digest};
use crate::error::TesseraError;

/// Name of a claim property
pub type PropertyName = String;

/// Number of positional fields in a compressed claim
pub const COMPRESSED_CLAIM_ARITY: usize = 3;

/// A claim about an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Hash of the claim type the contents conform to
    pub ctype_hash: Digest,

    /// Owner of the claim; `None` once the owner has been redacted
    pub owner: Option<Address>,

    /// Property values, keyed by property name
    pub contents: BTreeMap<PropertyName, Value>,
}

impl Claim {
    pub fn new(
        ctype_hash: Digest,
        owner: Address,
        contents: impl IntoIterator<Item = (PropertyName, Value)>,
    ) -> Self {
        Self {
            ctype_hash,
            owner: Some(owner),
            contents: contents.into_iter().collect(),
        }
    }

    /// Build a claim from a JSON object of contents
    pub fn from_json(ctype_hash: Digest, owner: Address, contents: Value) -> Result<Self, TesseraError> {
        match contents {
            Value::Object(map) => Ok(Self::new(ctype_hash, owner, map)),
            _ => Err(TesseraError::Structural(
                "claim contents must be a JSON object".into(),
            )),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.contents.get(name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(String::as_str)
    }

    pub fn is_owner_redacted(&self) -> bool {
        self.owner.is_none()
    }

    /// Encode as `[ctype_hash, contents, owner]`
    pub fn compress(&self) -> Result<Value, TesseraError> {
        Ok(Value::Array(vec![
            serde_json::to_value(self.ctype_hash)?,
            serde_json::to_value(&self.contents)?,
            serde_json::to_value(&self.owner)?,
        ]))
    }

    /// Decode the `[ctype_hash, contents, owner]` encoding
    pub fn decompress(value: &Value) -> Result<Self, TesseraError> {
        let items = expect_array(value, "claim", COMPRESSED_CLAIM_ARITY)?;
        Ok(Self {
            ctype_hash: field(items, 0, "claim")?,
            contents: field(items, 1, "claim")?,
            owner: field(items, 2, "claim")?,
        })
    }
}

/// Canonical byte serialization of a JSON value.
///
/// Object keys are sorted recursively and the output is compact, so two
/// logically equal values always produce the same bytes regardless of the
/// insertion order of their keys.
pub fn canonical_json(value: &Value) -> Vec<u8> {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out.into_bytes()
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push('{');
            for (i, (key, item)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn owner() -> Address {
        Address::new("0xbob")
    }

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let a = json!({"b": 1, "a": {"z": true, "y": [3, {"q": 1, "p": 2}]}});
        let b = json!({"a": {"y": [3, {"p": 2, "q": 1}], "z": true}, "b": 1});

        assert_eq!(canonical_json(&a), canonical_json(&b));
        assert_eq!(
            String::from_utf8(canonical_json(&a)).unwrap(),
            r#"{"a":{"y":[3,{"p":2,"q":1}],"z":true},"b":1}"#
        );
    }

    #[test]
    fn test_canonical_json_preserves_array_order() {
        assert_ne!(canonical_json(&json!([1, 2])), canonical_json(&json!([2, 1])));
    }

    #[test]
    fn test_canonical_json_escapes_keys() {
        let value = json!({"quo\"te": "x"});
        assert_eq!(
            String::from_utf8(canonical_json(&value)).unwrap(),
            r#"{"quo\"te":"x"}"#
        );
    }

    #[test]
    fn test_from_json_requires_object() {
        let ctype = Digest::from_bytes([7u8; 32]);
        assert!(Claim::from_json(ctype, owner(), json!([1])).is_err());

        let claim = Claim::from_json(ctype, owner(), json!({"name": "Bob"})).unwrap();
        assert_eq!(claim.property("name"), Some(&json!("Bob")));
        assert!(!claim.is_owner_redacted());
    }

    #[test]
    fn test_compress_roundtrip() {
        let ctype = Digest::from_bytes([7u8; 32]);
        let claim = Claim::from_json(ctype, owner(), json!({"a": "a", "n": 3})).unwrap();

        let compressed = claim.compress().unwrap();
        assert_eq!(compressed.as_array().unwrap().len(), COMPRESSED_CLAIM_ARITY);
        assert_eq!(Claim::decompress(&compressed).unwrap(), claim);
    }

    #[test]
    fn test_decompress_wrong_arity() {
        let err = Claim::decompress(&json!(["0x00", {}])).unwrap_err();
        assert!(matches!(
            err,
            TesseraError::Arity {
                what: "claim",
                expected: 3,
                actual: 2
            }
        ));
    }
}
