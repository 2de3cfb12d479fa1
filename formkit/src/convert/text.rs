use std::marker::PhantomData;

use super::Converter;
use crate::{error::Result, model::Document};

/// Converter between a [`Document`] and its pretty-printed JSON text.
///
/// Used by the raw-JSON editors: the internal side is whatever the user has
/// typed, and only text that parses and validates is pushed outward.
pub struct TextCodec<D>(PhantomData<fn(D) -> D>);

impl<D> TextCodec<D> {
    pub fn new() -> Self {
        TextCodec(PhantomData)
    }
}

impl<D> Default for TextCodec<D> {
    fn default() -> Self {
        TextCodec::new()
    }
}

impl<D: Document> Converter for TextCodec<D> {
    type External = D;
    type Internal = String;

    fn to_internal(&self, external: &D) -> Result<String> {
        external.stringify()
    }

    fn to_external(&self, internal: &String) -> Result<D> {
        D::parse(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataSchema, FormData, SchemaType, UiSchema};

    #[test]
    fn test_text_codec() {
        let codec = TextCodec::<DataSchema>::new();
        let schema = DataSchema::object().with_property("a", DataSchema::new(SchemaType::Integer));
        let text = codec.to_internal(&schema).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(codec.to_external(&text).unwrap(), schema);

        assert!(codec.to_external(&"{".to_string()).unwrap_err().is_syntax());
        assert!(
            codec
                .to_external(&"{\"type\": 1}".to_string())
                .unwrap_err()
                .is_validation()
        );
    }

    #[test]
    fn test_defaults_stringify() {
        let ui = TextCodec::<UiSchema>::new()
            .to_internal(&UiSchema::default())
            .unwrap();
        assert_eq!(UiSchema::parse(&ui).unwrap(), UiSchema::default());

        let data = TextCodec::<FormData>::new()
            .to_internal(&FormData::default())
            .unwrap();
        assert_eq!(data, "{}");
    }
}
