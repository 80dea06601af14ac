use crate::error::TypeError;
use crate::params::{DecodeParameters, ParameterBlock, SpotLookup};
use crate::schema::MessageSchema;

/// Everything learned from the two JSON blocks at the head of a log.
#[derive(Clone, Debug, PartialEq)]
pub struct LogHeader {
    pub parameters: DecodeParameters,
    pub spot_lookup: SpotLookup,
    pub schema: MessageSchema,
    /// Verbatim bytes of the parameter block followed by the schema block.
    pub raw: Vec<u8>,
}

impl LogHeader {
    /// Interpret both blocks, in the order they appear on the wire.
    ///
    /// # Errors
    ///
    /// Propagates any [`TypeError`] from the parameter or schema parser.
    pub fn parse(parameter_text: &[u8], schema_text: &[u8]) -> Result<Self, TypeError> {
        let ParameterBlock {
            parameters,
            spot_lookup,
        } = ParameterBlock::parse(parameter_text)?;
        let schema = MessageSchema::parse(schema_text)?;

        let mut raw = Vec::with_capacity(parameter_text.len() + schema_text.len());
        raw.extend_from_slice(parameter_text);
        raw.extend_from_slice(schema_text);

        Ok(Self {
            parameters,
            spot_lookup,
            schema,
            raw,
        })
    }
}
