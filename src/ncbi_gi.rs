//! Extraction of the NCBI GI reference embedded in gene product annotations.
//!
//! Models exported from BiGG carry cross references as identifiers.org
//! URIs, e.g. `rdf:resource="http://identifiers.org/ncbigi/GI:16127995"`.

pub const NCBI_GI_MARKER: &str = "ncbigi/";

/// Width of the namespace tag (`GI:`) that follows the marker.
const NAMESPACE_TAG_LEN: usize = 3;

/// Returns the GI referenced by `annotation`, or `None` when the marker or
/// the closing quote is missing.
pub fn extract_ncbi_gi(annotation: &str) -> Option<&str> {
    let marker = annotation.find(NCBI_GI_MARKER)?;
    let start = marker + NCBI_GI_MARKER.len() + NAMESPACE_TAG_LEN;
    let rest = annotation.get(start..)?;
    let end = rest.find('"')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ncbi_gi_from_identifiers_uri() {
        let annotation = r#"<annotation><rdf:li rdf:resource="http://identifiers.org/ncbigi/GI:16127995"/></annotation>"#;
        assert_eq!(extract_ncbi_gi(annotation), Some("16127995"));
    }

    #[test]
    fn test_extract_ncbi_gi_uses_first_reference() {
        let annotation = r#"<rdf:li rdf:resource="http://identifiers.org/ncbigi/gi:1"/><rdf:li rdf:resource="http://identifiers.org/ncbigi/gi:2"/>"#;
        assert_eq!(extract_ncbi_gi(annotation), Some("1"));
    }

    #[test]
    fn test_extract_ncbi_gi_without_marker() {
        let annotation = r#"<rdf:li rdf:resource="http://identifiers.org/uniprot/P00561"/>"#;
        assert_eq!(extract_ncbi_gi(annotation), None);
    }

    #[test]
    fn test_extract_ncbi_gi_without_closing_quote() {
        assert_eq!(extract_ncbi_gi("http://identifiers.org/ncbigi/GI:123"), None);
        assert_eq!(extract_ncbi_gi("ncbigi/G"), None);
    }
}
