use crate::scan::Scanner;
use sparql_parts_model::QueryParseError;

/// Collects all `PREFIX name: <iri>` declarations, in declaration order.
pub(crate) fn extract_prefixes(text: &str) -> Result<Vec<(String, String)>, QueryParseError> {
    let mut scanner = Scanner::new(text);
    let mut prefixes = Vec::new();
    while scanner.find_keyword("PREFIX") {
        scanner.skip_trivia();
        let label = scanner.read_prefix_label()?.to_owned();
        scanner.skip_trivia();
        let iri = scanner.read_iri_ref()?.to_owned();
        prefixes.push((label, iri));
    }
    Ok(prefixes)
}

/// Expands `prefix:local` against the declared prefixes.
pub(crate) fn expand_prefixed_name(
    token: &str,
    prefixes: &[(String, String)],
) -> Result<String, QueryParseError> {
    let Some((prefix, local)) = token.split_once(':') else {
        return Err(QueryParseError::malformed(format!(
            "expected a prefixed name, found {token:?}"
        )));
    };
    match prefixes.iter().find(|(name, _)| name == prefix) {
        Some((_, iri)) => Ok(format!("{iri}{local}")),
        None => Err(QueryParseError::UnresolvedPrefix(prefix.to_owned())),
    }
}
