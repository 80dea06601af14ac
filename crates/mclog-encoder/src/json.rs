use serde_json::{Map, Value, json};

/// Builder for a parameter block in the producer's layout.
///
/// Entries keep insertion order. Calling [`value`](Self::value) and
/// [`spot`](Self::spot) with the same name merges into one entry:
///
/// ```rust
/// use mclog_encoder::ParameterJson;
///
/// let text = ParameterJson::new()
///     .value("pwmirqfrq", 8789)
///     .value("pwmmax", 8192)
///     .spot("vbus", 0)
///     .to_json();
/// assert_eq!(
///     text,
///     r#"{"pwmirqfrq":{"value":8789},"pwmmax":{"value":8192},"vbus":{"si":0}}"#
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct ParameterJson {
    entries: Vec<(String, Map<String, Value>)>,
}

impl ParameterJson {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `value` of entry `name`.
    #[must_use]
    pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.entry(name).insert("value".to_string(), value.into());
        self
    }

    /// Register `name` as spot lookup slot `slot`.
    #[must_use]
    pub fn spot(mut self, name: &str, slot: u32) -> Self {
        self.entry(name).insert("si".to_string(), json!(slot));
        self
    }

    /// Serialise to compact JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        let root: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), Value::Object(entry.clone())))
            .collect();
        Value::Object(root).to_string()
    }

    fn entry(&mut self, name: &str) -> &mut Map<String, Value> {
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.entries.push((name.to_string(), Map::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}

/// Builder for a schema block. Fields are emitted in call order, which is
/// the bit layout of every record.
///
/// ```rust
/// use mclog_encoder::SchemaJson;
///
/// let text = SchemaJson::new().field("angle", 1.0, false, 16).to_json();
/// assert_eq!(
///     text,
///     r#"{"angle":{"name":"angle","scale":1.0,"signed":0,"size":16}}"#
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct SchemaJson {
    fields: Map<String, Value>,
}

impl SchemaJson {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: &str, scale: f64, signed: bool, size: u32) -> Self {
        self.fields.insert(
            name.to_string(),
            json!({
                "name": name,
                "scale": scale,
                "signed": u8::from(signed),
                "size": size,
            }),
        );
        self
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}
