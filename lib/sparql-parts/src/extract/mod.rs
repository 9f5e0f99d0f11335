pub(crate) mod filters;
pub(crate) mod graphs;
pub(crate) mod namespaces;
pub(crate) mod prefixes;
pub(crate) mod triples;
pub(crate) mod variables;

use graphs::BlockSegment;
use sparql_parts_model::{FilterNode, QueryParseError, TriplePattern};

/// Everything harvested from one set of pattern blocks.
pub(crate) struct BlockExtract {
    /// IRIs of inline `GRAPH` blocks, in order of appearance.
    pub graphs: Vec<String>,
    pub triples: Vec<TriplePattern>,
    pub filters: Vec<FilterNode>,
    /// Graph-stripped block text, kept for the namespace scan.
    pub scanned: Vec<String>,
}

/// Runs the block pipeline over the given pattern blocks in order: split
/// off inline `GRAPH` blocks, remove and parse `FILTER` clauses, tokenize
/// the remaining triples.
pub(crate) fn process_blocks(
    blocks: &[&str],
    prefixes: &[(String, String)],
) -> Result<BlockExtract, QueryParseError> {
    let mut extract = BlockExtract {
        graphs: Vec::new(),
        triples: Vec::new(),
        filters: Vec::new(),
        scanned: Vec::new(),
    };
    for block in blocks {
        for segment in graphs::split_graph_blocks(block)? {
            let body = match segment {
                BlockSegment::Triples(text) => text,
                BlockSegment::Graph { iri, body } => {
                    extract.graphs.push(iri);
                    body
                }
            };
            let (remaining, filters) = filters::extract_filters(&body, prefixes)?;
            extract.scanned.push(body);
            extract.filters.extend(filters);
            extract
                .triples
                .extend(triples::tokenize_block(&remaining, prefixes)?);
        }
    }
    Ok(extract)
}

/// Absent-over-empty: a clause that produced nothing leaves its field unset.
pub(crate) fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
