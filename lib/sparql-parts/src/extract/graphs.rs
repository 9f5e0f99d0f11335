use crate::scan::Scanner;
use sparql_parts_model::QueryParseError;

/// Collects `FROM <iri>` and `FROM NAMED <iri>` clauses, in textual order.
pub(crate) fn extract_from_clauses(
    text: &str,
) -> Result<(Vec<String>, Vec<String>), QueryParseError> {
    let mut scanner = Scanner::new(text);
    let mut graphs = Vec::new();
    let mut named_graphs = Vec::new();
    while scanner.find_keyword("FROM") {
        scanner.skip_trivia();
        if scanner.eat_keyword("NAMED") {
            scanner.skip_trivia();
            named_graphs.push(scanner.read_iri_ref()?.to_owned());
        } else {
            graphs.push(scanner.read_iri_ref()?.to_owned());
        }
    }
    Ok((graphs, named_graphs))
}

/// One top-level piece of a pattern block: either bare triple text or an
/// inline `GRAPH <iri> { ... }` block.
pub(crate) enum BlockSegment {
    Triples(String),
    Graph { iri: String, body: String },
}

/// Splits a pattern block into its inline `GRAPH` blocks and the bare text
/// around them, preserving textual order.
pub(crate) fn split_graph_blocks(block: &str) -> Result<Vec<BlockSegment>, QueryParseError> {
    let mut scanner = Scanner::new(block);
    let mut segments = Vec::new();
    let mut bare_start = 0usize;
    loop {
        scanner.skip_trivia();
        if scanner.is_at_end() {
            push_bare(&mut segments, &block[bare_start..]);
            return Ok(segments);
        }
        let checkpoint = scanner.pos();
        if scanner.eat_keyword("GRAPH") {
            push_bare(&mut segments, &block[bare_start..checkpoint]);
            scanner.skip_trivia();
            let iri = scanner.read_iri_ref()?.to_owned();
            scanner.skip_trivia();
            let body = scanner.read_braced_block()?.to_owned();
            segments.push(BlockSegment::Graph { iri, body });
            bare_start = scanner.pos();
        } else {
            scanner.skip_atom()?;
        }
    }
}

fn push_bare(segments: &mut Vec<BlockSegment>, text: &str) {
    if !text.trim().is_empty() {
        segments.push(BlockSegment::Triples(text.to_owned()));
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;

    #[test]
    fn from_and_from_named() -> Result<(), QueryParseError> {
        let (graphs, named) = extract_from_clauses(
            "DESCRIBE ?s FROM <http://foo/bar/> FROM NAMED <http://foo/bar/named> WHERE { ?s ?p ?o }",
        )?;
        assert_eq!(graphs, vec!["http://foo/bar/"]);
        assert_eq!(named, vec!["http://foo/bar/named"]);
        Ok(())
    }

    #[test]
    fn graph_blocks_in_order() -> Result<(), QueryParseError> {
        let segments = split_graph_blocks(
            "Graph <http://g1> {<http://s1> <http://p1> <http://o1>}\n
             Graph <http://g2> {<http://s1> <http://p1> <http://o1>}",
        )?;
        let iris: Vec<_> = segments
            .iter()
            .map(|segment| match segment {
                BlockSegment::Graph { iri, .. } => iri.as_str(),
                BlockSegment::Triples(_) => "bare",
            })
            .collect();
        assert_eq!(iris, vec!["http://g1", "http://g2"]);
        Ok(())
    }

    #[test]
    fn bare_text_around_graph_blocks_is_kept() -> Result<(), QueryParseError> {
        let segments =
            split_graph_blocks("?a ?b ?c. GRAPH <http://g> { ?s ?p ?o } ?x ?y ?z")?;
        assert_eq!(segments.len(), 3);
        assert!(matches!(&segments[0], BlockSegment::Triples(text) if text.contains("?a")));
        assert!(matches!(&segments[1], BlockSegment::Graph { iri, .. } if iri == "http://g"));
        assert!(matches!(&segments[2], BlockSegment::Triples(text) if text.contains("?z")));
        Ok(())
    }
}
