use crate::extract::{self, non_empty};
use crate::query::skip_prologue;
use crate::scan::{expect_keyword, snippet, Scanner};
use sparql_parts_model::{QueryParseError, QueryParts, QuerySubType};

/// Classifies an update query into one of the five supported sub-forms and
/// extracts its parts.
///
/// The states are terminal and mutually exclusive; the first match wins.
/// For the `WITH` forms the probe for an `INSERT` template between the
/// `DELETE` template and `WHERE` decides between `withDeleteWhere` and
/// `withDeleteInsertWhere`.
pub(crate) fn extract_update_parts(text: &str) -> Result<QueryParts, QueryParseError> {
    let prefixes = extract::prefixes::extract_prefixes(text)?;
    let mut scanner = Scanner::new(text);
    skip_prologue(&mut scanner)?;
    scanner.skip_trivia();

    let mut parts = QueryParts::default();
    let mut graphs: Vec<String> = Vec::new();
    // blocks carrying the query's match semantics, in contribution order
    let mut blocks: Vec<&str> = Vec::new();

    let sub_type = if scanner.eat_keyword("INSERT") {
        scanner.skip_trivia();
        if scanner.eat_keyword("DATA") {
            let body = read_data_block(&mut scanner)?;
            parts.insert_data = Some(body.trim().to_owned());
            blocks.push(body);
            QuerySubType::InsertData
        } else if scanner.eat_keyword("INTO") {
            scanner.skip_trivia();
            expect_keyword(&mut scanner, "GRAPH")?;
            scanner.skip_trivia();
            graphs.push(scanner.read_iri_ref()?.to_owned());
            scanner.skip_trivia();
            let body = scanner.read_braced_block()?;
            parts.insert_data = Some(body.trim().to_owned());
            blocks.push(body);
            QuerySubType::InsertInto
        } else {
            return Err(QueryParseError::AmbiguousSubForm(
                "INSERT without a DATA block or a target graph".to_owned(),
            ));
        }
    } else if scanner.eat_keyword("DELETE") {
        scanner.skip_trivia();
        if scanner.eat_keyword("DATA") {
            let body = read_data_block(&mut scanner)?;
            parts.delete_data = Some(body.trim().to_owned());
            blocks.push(body);
            QuerySubType::DeleteData
        } else {
            return Err(QueryParseError::AmbiguousSubForm(
                "DELETE without a DATA block and without a WITH clause".to_owned(),
            ));
        }
    } else if scanner.eat_keyword("WITH") {
        scanner.skip_trivia();
        graphs.push(scanner.read_iri_ref()?.to_owned());
        scanner.skip_trivia();
        if !scanner.eat_keyword("DELETE") {
            return Err(QueryParseError::AmbiguousSubForm(
                "WITH without a DELETE template".to_owned(),
            ));
        }
        scanner.skip_trivia();
        let delete_template = scanner.read_braced_block()?;
        parts.delete_data = Some(delete_template.trim().to_owned());
        blocks.push(delete_template);
        scanner.skip_trivia();
        let insert_template = if scanner.eat_keyword("INSERT") {
            scanner.skip_trivia();
            Some(scanner.read_braced_block()?)
        } else {
            None
        };
        scanner.skip_trivia();
        if !scanner.eat_keyword("WHERE") {
            return Err(QueryParseError::AmbiguousSubForm(
                "WITH update without a WHERE clause".to_owned(),
            ));
        }
        scanner.skip_trivia();
        let where_block = scanner.read_braced_block()?;
        blocks.push(where_block);
        let where_text = where_block.trim().to_owned();
        parts.delete_where = Some(where_text.clone());
        match insert_template {
            Some(template) => {
                // the INSERT template is written, not matched; it stays out
                // of the triple patterns
                parts.insert_data = Some(template.trim().to_owned());
                parts.insert_where = Some(where_text);
                QuerySubType::WithDeleteInsertWhere
            }
            None => QuerySubType::WithDeleteWhere,
        }
    } else {
        return Err(QueryParseError::AmbiguousSubForm(format!(
            "unsupported update form near {:?}",
            snippet(scanner.rest())
        )));
    };

    let extracted = extract::process_blocks(&blocks, &prefixes)?;
    graphs.extend(extracted.graphs);
    let namespaces = extract::namespaces::extract_namespaces(&extracted.scanned, &prefixes);
    let variables =
        extract::variables::collect_variables(&[], &extracted.triples, &extracted.filters);

    parts.prefixes = non_empty(prefixes);
    parts.namespaces = non_empty(namespaces);
    parts.graphs = non_empty(graphs);
    parts.triple_patterns = non_empty(extracted.triples);
    parts.filter_patterns = non_empty(extracted.filters);
    parts.variables = non_empty(variables);
    parts.sub_type = Some(sub_type);
    Ok(parts)
}

/// Reads the `{ ... }` block of a DATA form, rejecting empty blocks.
fn read_data_block<'a>(scanner: &mut Scanner<'a>) -> Result<&'a str, QueryParseError> {
    scanner.skip_trivia();
    let body = scanner.read_braced_block()?;
    if body.trim().is_empty() {
        return Err(QueryParseError::EmptyDataBlock);
    }
    Ok(body)
}
