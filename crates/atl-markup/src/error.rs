//! Error types for markup conversion.

/// Error while converting between markup formats.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MarkupError {
    /// Storage format is not well-formed XML.
    #[error("XML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// Text or tag name could not be decoded.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Conversion produced no usable output.
    #[error("conversion failed: {0}")]
    Conversion(String),
}
