//! Static, per-type registries describing which semantic attributes and getters an entity offers.

use crate::entities::parsed_json::ParsedJson;
use serde_json::Value;

/// One named semantic attribute and how to read it off an entity.
pub struct Attribute<T> {
    pub name: &'static str,
    pub read: fn(&T) -> Value,
}

impl<T> Attribute<T> {
    pub const fn new(name: &'static str, read: fn(&T) -> Value) -> Self {
        Self { name, read }
    }
}

/// Introspection over an entity's API and its retained sub-document.
///
/// Attribute and getter lists are fixed per concrete type; only [`Introspect::keys`]
/// reflects the instance, because it lists the raw keys actually present.
pub trait Introspect: Sized + 'static {
    fn attributes() -> &'static [Attribute<Self>];

    /// Names of the get-with-default methods callable on this entity.
    fn getter_names(&self) -> &'static [&'static str];

    /// The sub-document this entity was built from.
    fn raw(&self) -> &ParsedJson;

    fn attr_names(&self) -> Vec<&'static str> {
        Self::attributes().iter().map(|attr| attr.name).collect()
    }

    /// Reads a semantic attribute by name; `None` if the type declares no such attribute.
    /// A declared attribute whose value is missing reads as `Value::Null`.
    fn attribute(&self, name: &str) -> Option<Value> {
        Self::attributes()
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| (attr.read)(self))
    }

    /// Every declared attribute with its current value, in declaration order.
    fn attribute_values(&self) -> Vec<(&'static str, Value)> {
        Self::attributes()
            .iter()
            .map(|attr| (attr.name, (attr.read)(self)))
            .collect()
    }

    fn keys(&self) -> Vec<&str> {
        self.raw().keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Sample {
        raw: ParsedJson,
        answer: Option<i64>,
    }

    static SAMPLE_ATTRIBUTES: &[Attribute<Sample>] = &[
        Attribute::new("answer", |p: &Sample| json!(p.answer)),
        Attribute::new("constant", |_: &Sample| json!("fixed")),
    ];

    impl Introspect for Sample {
        fn attributes() -> &'static [Attribute<Self>] {
            SAMPLE_ATTRIBUTES
        }

        fn getter_names(&self) -> &'static [&'static str] {
            &["get"]
        }

        fn raw(&self) -> &ParsedJson {
            &self.raw
        }
    }

    #[test]
    fn test_registry_drives_names_and_values() {
        let sample = Sample {
            raw: ParsedJson::from_value_lossy(json!({ "z": 1, "a": 2 })),
            answer: None,
        };
        assert_eq!(sample.attr_names(), vec!["answer", "constant"]);
        assert_eq!(sample.attribute("answer"), Some(Value::Null));
        assert_eq!(sample.attribute("constant"), Some(json!("fixed")));
        assert_eq!(sample.attribute("nope"), None);
        assert_eq!(sample.keys(), vec!["z", "a"]);
        assert_eq!(sample.getter_names(), &["get"]);
    }
}
