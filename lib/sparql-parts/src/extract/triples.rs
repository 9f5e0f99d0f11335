use crate::extract::prefixes::expand_prefixed_name;
use oxilangtag::LanguageTag;
use oxrdf::vocab::xsd;
use sparql_parts_model::{PatternTerm, QueryParseError, TriplePattern};

/// Which slot of a triple a token occupies. Subject and predicate slots
/// reject literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TermPosition {
    Subject,
    Predicate,
    Object,
}

impl TermPosition {
    fn label(self) -> &'static str {
        match self {
            TermPosition::Subject => "subject",
            TermPosition::Predicate => "predicate",
            TermPosition::Object => "object",
        }
    }
}

/// Splits a pattern block (braces stripped, filters removed) into triples
/// and classifies each term.
pub(crate) fn tokenize_block(
    block: &str,
    prefixes: &[(String, String)],
) -> Result<Vec<TriplePattern>, QueryParseError> {
    let mut patterns = Vec::new();
    for statement in split_statements(block) {
        let terms = split_terms(statement);
        if terms.is_empty() {
            continue;
        }
        if terms.len() != 3 {
            return Err(QueryParseError::malformed(format!(
                "expected subject, predicate and object in {:?}",
                statement.trim()
            )));
        }
        patterns.push(TriplePattern::new(
            classify_term(terms[0], TermPosition::Subject, prefixes)?,
            classify_term(terms[1], TermPosition::Predicate, prefixes)?,
            classify_term(terms[2], TermPosition::Object, prefixes)?,
        ));
    }
    Ok(patterns)
}

/// Splits on `.` statement terminators. A dot inside a string literal or an
/// IRI reference does not terminate, and neither does a dot between two
/// digits (a decimal numeral).
fn split_statements(block: &str) -> Vec<&str> {
    let bytes = block.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0usize;
    let mut idx = 0usize;
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
                idx += 1;
                while idx < bytes.len() && bytes[idx] != b'>' && !bytes[idx].is_ascii_whitespace() {
                    idx += 1;
                }
                if idx < bytes.len() && bytes[idx] == b'>' {
                    idx += 1;
                }
            }
            b'.' => {
                let decimal = idx > 0
                    && bytes[idx - 1].is_ascii_digit()
                    && bytes.get(idx + 1).is_some_and(u8::is_ascii_digit);
                if decimal {
                    idx += 1;
                } else {
                    statements.push(&block[start..idx]);
                    idx += 1;
                    start = idx;
                }
            }
            _ => idx += 1,
        }
    }
    statements.push(&block[start..]);
    statements
}

/// Splits one statement into whitespace-separated terms, keeping string
/// literals (with their `^^`/`@` suffixes) and IRI references atomic.
fn split_terms(statement: &str) -> Vec<&str> {
    let bytes = statement.as_bytes();
    let mut terms = Vec::new();
    let mut idx = 0usize;
    while idx < bytes.len() {
        while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
            idx += 1;
        }
        if idx >= bytes.len() {
            break;
        }
        let start = idx;
        while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() {
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
                    idx += 1;
                    while idx < bytes.len()
                        && bytes[idx] != b'>'
                        && !bytes[idx].is_ascii_whitespace()
                    {
                        idx += 1;
                    }
                    if idx < bytes.len() && bytes[idx] == b'>' {
                        idx += 1;
                    }
                }
                _ => idx += 1,
            }
        }
        terms.push(&statement[start..idx]);
    }
    terms
}

/// Classifies a single term token.
pub(crate) fn classify_term(
    token: &str,
    position: TermPosition,
    prefixes: &[(String, String)],
) -> Result<PatternTerm, QueryParseError> {
    if let Some(name) = token.strip_prefix(['?', '$']) {
        if name.is_empty() {
            return Err(QueryParseError::malformed("empty variable name"));
        }
        return Ok(PatternTerm::variable(name));
    }
    if let Some(inner) = token.strip_prefix('<') {
        let Some(iri) = inner.strip_suffix('>') else {
            return Err(QueryParseError::malformed(format!(
                "unterminated IRI reference {token:?}"
            )));
        };
        return Ok(PatternTerm::uri(iri));
    }
    if token.starts_with(['"', '\'']) {
        let term = parse_quoted_literal(token, prefixes)?;
        return in_object_position(term, position);
    }
    if let Some(datatype) = numeric_datatype(token) {
        return in_object_position(PatternTerm::typed_literal(token, datatype), position);
    }
    if token.contains(':') {
        return Ok(PatternTerm::uri(expand_prefixed_name(token, prefixes)?));
    }
    Err(QueryParseError::malformed(format!(
        "unrecognized {} term {:?}",
        position.label(),
        token
    )))
}

fn in_object_position(
    term: PatternTerm,
    position: TermPosition,
) -> Result<PatternTerm, QueryParseError> {
    if position == TermPosition::Object {
        Ok(term)
    } else {
        Err(QueryParseError::malformed(format!(
            "a literal cannot occur in {} position",
            position.label()
        )))
    }
}

/// Parses a quoted literal with an optional `^^` datatype or `@` language
/// suffix.
fn parse_quoted_literal(
    token: &str,
    prefixes: &[(String, String)],
) -> Result<PatternTerm, QueryParseError> {
    let bytes = token.as_bytes();
    let quote = bytes[0];
    let mut idx = 1usize;
    let mut close = None;
    while idx < bytes.len() {
        if bytes[idx] == b'\\' {
            idx += 2;
        } else if bytes[idx] == quote {
            close = Some(idx);
            break;
        } else {
            idx += 1;
        }
    }
    let Some(close) = close else {
        return Err(QueryParseError::malformed(format!(
            "unterminated string literal {token:?}"
        )));
    };
    let value = &token[1..close];
    let suffix = &token[close + 1..];
    if suffix.is_empty() {
        return Ok(PatternTerm::literal(value));
    }
    if let Some(datatype) = suffix.strip_prefix("^^") {
        let iri = if let Some(inner) = datatype.strip_prefix('<') {
            inner
                .strip_suffix('>')
                .ok_or_else(|| {
                    QueryParseError::malformed(format!("unterminated datatype IRI {datatype:?}"))
                })?
                .to_owned()
        } else {
            expand_prefixed_name(datatype, prefixes)?
        };
        return Ok(PatternTerm::typed_literal(value, iri));
    }
    if let Some(tag) = suffix.strip_prefix('@') {
        LanguageTag::parse(tag).map_err(|error| {
            QueryParseError::malformed(format!("invalid language tag {tag:?}: {error}"))
        })?;
        return Ok(PatternTerm::language_literal(value, tag));
    }
    Err(QueryParseError::malformed(format!(
        "unrecognized literal suffix {suffix:?}"
    )))
}

/// The XSD datatype inferred for a bare numeral, if the token is one.
pub(crate) fn numeric_datatype(token: &str) -> Option<&'static str> {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    if digits.is_empty() {
        return None;
    }
    if digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Some(xsd::INTEGER.as_str());
    }
    let (whole, fraction) = digits.split_once('.')?;
    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }
    Some(xsd::DECIMAL.as_str())
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use sparql_parts_model::TermKind;

    const FOAF: &str = "http://xmlns.com/foaf/0.1/";

    fn foaf() -> Vec<(String, String)> {
        vec![("foaf".to_owned(), FOAF.to_owned())]
    }

    #[test]
    fn plain_triple_of_variables() -> Result<(), QueryParseError> {
        let patterns = tokenize_block("?s ?p ?o", &[])?;
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].subject, PatternTerm::variable("s"));
        assert_eq!(patterns[0].predicate, PatternTerm::variable("p"));
        assert_eq!(patterns[0].object, PatternTerm::variable("o"));
        Ok(())
    }

    #[test]
    fn prefixed_names_expand() -> Result<(), QueryParseError> {
        let patterns = tokenize_block("?x foaf:name \"Alice\"", &foaf())?;
        assert_eq!(patterns[0].predicate.value, format!("{FOAF}name"));
        assert_eq!(patterns[0].predicate.kind, TermKind::Uri);
        assert_eq!(patterns[0].object, PatternTerm::literal("Alice"));
        Ok(())
    }

    #[test]
    fn undeclared_prefix_fails() {
        assert_eq!(
            tokenize_block("?x foaf:name \"Alice\"", &[]),
            Err(QueryParseError::UnresolvedPrefix("foaf".to_owned()))
        );
    }

    #[test]
    fn typed_and_tagged_literals() -> Result<(), QueryParseError> {
        let patterns = tokenize_block(
            "?x foaf:name \"Alice\"^^<http://www.w3.org/2001/XMLSchema#string>. ?x foaf:nick \"Ali\"@en",
            &foaf(),
        )?;
        assert_eq!(
            patterns[0].object,
            PatternTerm::typed_literal("Alice", "http://www.w3.org/2001/XMLSchema#string")
        );
        assert_eq!(patterns[1].object, PatternTerm::language_literal("Ali", "en"));
        Ok(())
    }

    #[test]
    fn bad_language_tag_fails() {
        tokenize_block("?x foaf:name \"Alice\"@not-a-tag-!!", &foaf()).unwrap_err();
    }

    #[test]
    fn numerals_infer_xsd_datatypes() -> Result<(), QueryParseError> {
        let patterns = tokenize_block("?x foaf:age 40. ?x foaf:size 1.75", &foaf())?;
        assert_eq!(
            patterns[0].object,
            PatternTerm::typed_literal("40", "http://www.w3.org/2001/XMLSchema#integer")
        );
        assert_eq!(
            patterns[1].object,
            PatternTerm::typed_literal("1.75", "http://www.w3.org/2001/XMLSchema#decimal")
        );
        Ok(())
    }

    #[test]
    fn dots_inside_iris_do_not_terminate() -> Result<(), QueryParseError> {
        let patterns = tokenize_block("?x <http://xmlns.com/foaf/0.1/name> \"A.B. Smith\"", &[])?;
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].predicate.value, format!("{FOAF}name"));
        Ok(())
    }

    #[test]
    fn literal_in_subject_position_fails() {
        tokenize_block("\"Alice\" foaf:name ?x", &foaf()).unwrap_err();
        tokenize_block("?x 40 ?y", &[]).unwrap_err();
    }

    #[test]
    fn incomplete_statement_fails() {
        tokenize_block("?s ?p", &[]).unwrap_err();
    }

    #[test]
    fn trailing_terminator_is_fine() -> Result<(), QueryParseError> {
        assert_eq!(tokenize_block("?s ?p ?o.", &[])?.len(), 1);
        Ok(())
    }
}
