use crate::schema::MessageSchema;

/// Physical values of one decoded record.
///
/// `values` holds one entry per schema field, wire and calculated alike, in
/// schema order. Internal fields (`csum`, `spot`) are kept so that every
/// index from [`MessageSchema::fields`] is valid here; sinks pick the
/// output columns through [`MessageSchema::output_fields`].
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedRecord {
    /// Zero-based count of valid records before this one.
    pub index: u64,
    /// Elapsed time in seconds, `index / frequency`.
    pub time: f64,
    pub values: Vec<f64>,
}

impl DecodedRecord {
    #[must_use]
    pub fn value(&self, field: usize) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Look a value up by field name.
    #[must_use]
    pub fn get(&self, schema: &MessageSchema, name: &str) -> Option<f64> {
        schema.index_of(name).and_then(|i| self.value(i))
    }
}

/// One completed sweep of the spot channel.
///
/// `values` is in spot-lookup order, one per lookup slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotRow {
    pub time: f64,
    pub values: Vec<f64>,
}
