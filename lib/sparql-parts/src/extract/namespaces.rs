use rustc_hash::FxHashSet;
use sparql_parts_model::XSD_NAMESPACE;

/// Groups IRIs used in the pattern blocks without a covering `PREFIX`
/// declaration into synthetic namespace aliases.
///
/// An IRI is covered when it starts with any declared prefix IRI. The
/// remaining IRIs are grouped by namespace root (the IRI truncated after its
/// last `/` or `#`) and aliased `ns-0`, `ns-1`, ... in order of first
/// appearance. The XSD root always receives the fixed alias `xsd`.
///
/// Only IRIs textually present in the blocks count; datatypes inferred from
/// bare numerals and the target IRIs of FROM/WITH/GRAPH clauses do not.
pub(crate) fn extract_namespaces(
    blocks: &[String],
    prefixes: &[(String, String)],
) -> Vec<(String, String)> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut namespaces = Vec::new();
    let mut counter = 0usize;
    for block in blocks {
        for iri in iri_refs(block) {
            if !iri.contains("://") {
                continue;
            }
            if prefixes
                .iter()
                .any(|(_, declared)| !declared.is_empty() && iri.starts_with(declared.as_str()))
            {
                continue;
            }
            let root = namespace_root(iri);
            if !seen.insert(root) {
                continue;
            }
            if root == XSD_NAMESPACE {
                namespaces.push(("xsd".to_owned(), root.to_owned()));
            } else {
                namespaces.push((format!("ns-{counter}"), root.to_owned()));
                counter += 1;
            }
        }
    }
    namespaces
}

/// The IRI truncated after its last `/` or `#`.
fn namespace_root(iri: &str) -> &str {
    match iri.rfind(['/', '#']) {
        Some(idx) => &iri[..=idx],
        None => iri,
    }
}

/// All `<...>` references in `text`, skipping string literals. A `<` with no
/// closing `>` before whitespace is a comparison operator, not an IRI.
fn iri_refs(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut refs = Vec::new();
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            quote @ (b'"' | b'\'') => {
                idx += 1;
                while idx < bytes.len() {
                    if bytes[idx] == b'\\' {
                        idx += 2;
                    } else if bytes[idx] == quote {
                        idx += 1;
                        break;
                    } else {
                        idx += 1;
                    }
                }
            }
            b'<' => {
                let start = idx + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != b'>' && !bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                if end < bytes.len() && bytes[end] == b'>' {
                    refs.push(&text[start..end]);
                    idx = end + 1;
                } else {
                    idx += 1;
                }
            }
            _ => idx += 1,
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(name, iri)| ((*name).to_owned(), (*iri).to_owned()))
            .collect()
    }

    #[test]
    fn roots_are_grouped_and_numbered() {
        let blocks = vec!["?s <http://foo/sss> ?o. ?s <http://foo/ttt> ?o2. ?s <http://bar#x> ?o3".to_owned()];
        let namespaces = extract_namespaces(&blocks, &[]);
        assert_eq!(
            namespaces,
            vec![
                ("ns-0".to_owned(), "http://foo/".to_owned()),
                ("ns-1".to_owned(), "http://bar#".to_owned()),
            ]
        );
    }

    #[test]
    fn declared_prefixes_cover_their_iris() {
        let prefixes = declared(&[("dc", "http://foo/bar/")]);
        let blocks = vec!["?s dc: ?o. ?s <http://foo/sss> ?o".to_owned()];
        assert_eq!(
            extract_namespaces(&blocks, &prefixes),
            vec![("ns-0".to_owned(), "http://foo/".to_owned())]
        );
        let covered = vec!["?s <http://foo/bar/p1> ?o".to_owned()];
        assert!(extract_namespaces(&covered, &prefixes).is_empty());
    }

    #[test]
    fn xsd_root_keeps_its_fixed_alias() {
        let blocks =
            vec!["?x <http://foobar/name> \"Alice\". ?y <http://www.w3.org/2001/XMLSchema#string> \"Alice\"".to_owned()];
        assert_eq!(
            extract_namespaces(&blocks, &[]),
            vec![
                ("ns-0".to_owned(), "http://foobar/".to_owned()),
                ("xsd".to_owned(), XSD_NAMESPACE.to_owned()),
            ]
        );
    }

    #[test]
    fn comparison_operators_are_not_iris() {
        let blocks = vec!["?s ?p ?o. FILTER(?o < 40)".to_owned()];
        assert!(extract_namespaces(&blocks, &[]).is_empty());
    }
}
