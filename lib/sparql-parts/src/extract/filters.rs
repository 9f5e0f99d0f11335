use crate::extract::prefixes::expand_prefixed_name;
use crate::extract::triples::numeric_datatype;
use crate::scan::{snippet, Scanner};
use sparql_parts_model::{
    BooleanOperator, FilterNode, FilterOperand, QueryParseError, RelationalOperator,
};

/// Finds every `FILTER ( ... )` clause in a pattern block, parses each into
/// a [`FilterNode`], and returns the block text with the clauses removed so
/// the triple tokenizer never sees them.
pub(crate) fn extract_filters(
    block: &str,
    prefixes: &[(String, String)],
) -> Result<(String, Vec<FilterNode>), QueryParseError> {
    let mut scanner = Scanner::new(block);
    let mut filters = Vec::new();
    let mut remaining = String::new();
    let mut copy_from = 0usize;
    loop {
        scanner.skip_trivia();
        if scanner.is_at_end() {
            remaining.push_str(&block[copy_from..]);
            return Ok((remaining, filters));
        }
        let checkpoint = scanner.pos();
        if scanner.eat_keyword("FILTER") {
            remaining.push_str(&block[copy_from..checkpoint]);
            scanner.skip_trivia();
            let inner = scanner.read_parenthesized()?;
            filters.push(parse_expression(inner, prefixes)?);
            copy_from = scanner.pos();
        } else {
            scanner.skip_atom()?;
        }
    }
}

/// Parses a filter expression: `||` binds loosest, then `&&`, then a single
/// relational comparison.
fn parse_expression(
    text: &str,
    prefixes: &[(String, String)],
) -> Result<FilterNode, QueryParseError> {
    let parts = split_top_level(text, "||");
    if parts.len() > 1 {
        let children = parts
            .iter()
            .map(|part| parse_conjunction(part, prefixes))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FilterNode::Boolean {
            operator: BooleanOperator::Or,
            children,
        });
    }
    parse_conjunction(text, prefixes)
}

fn parse_conjunction(
    text: &str,
    prefixes: &[(String, String)],
) -> Result<FilterNode, QueryParseError> {
    let parts = split_top_level(text, "&&");
    if parts.len() > 1 {
        let children = parts
            .iter()
            .map(|part| parse_relational(part, prefixes))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FilterNode::Boolean {
            operator: BooleanOperator::And,
            children,
        });
    }
    parse_relational(text, prefixes)
}

/// Splits on a boolean operator occurring outside quotes, IRIs and
/// parentheses.
fn split_top_level<'a>(text: &'a str, operator: &str) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut idx = 0usize;
    let mut depth = 0usize;
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
            b'(' => {
                depth += 1;
                idx += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                idx += 1;
            }
            _ if depth == 0 && text[idx..].starts_with(operator) => {
                parts.push(&text[start..idx]);
                idx += operator.len();
                start = idx;
            }
            _ => idx += 1,
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parses `operand operator operand`, preserving operand order.
fn parse_relational(
    text: &str,
    prefixes: &[(String, String)],
) -> Result<FilterNode, QueryParseError> {
    let trimmed = strip_outer_parens(text.trim());
    let bytes = trimmed.as_bytes();
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
            b'<' if looks_like_iri(&trimmed[idx..]) => {
                while idx < bytes.len() && bytes[idx] != b'>' {
                    idx += 1;
                }
                idx += 1;
            }
            b'<' | b'>' | b'=' | b'!' => {
                let two_chars = bytes.get(idx + 1) == Some(&b'=');
                let operator = match bytes[idx] {
                    b'<' if two_chars => RelationalOperator::LessOrEqual,
                    b'<' => RelationalOperator::Less,
                    b'>' if two_chars => RelationalOperator::GreaterOrEqual,
                    b'>' => RelationalOperator::Greater,
                    b'=' => RelationalOperator::Equal,
                    b'!' if two_chars => RelationalOperator::NotEqual,
                    _ => {
                        return Err(QueryParseError::malformed(format!(
                            "unsupported operator in filter expression {:?}",
                            snippet(trimmed)
                        )))
                    }
                };
                let end = idx + operator.as_str().len();
                let left = classify_operand(trimmed[..idx].trim(), prefixes)?;
                let right = classify_operand(trimmed[end..].trim(), prefixes)?;
                return Ok(FilterNode::Relational {
                    operator,
                    left,
                    right,
                });
            }
            _ => idx += 1,
        }
    }
    Err(QueryParseError::malformed(format!(
        "unsupported filter expression {:?}",
        snippet(trimmed)
    )))
}

/// True when the text from a `<` reaches a `>` before any whitespace.
fn looks_like_iri(text: &str) -> bool {
    for byte in text.bytes().skip(1) {
        if byte == b'>' {
            return true;
        }
        if byte.is_ascii_whitespace() {
            return false;
        }
    }
    false
}

/// Strips one balanced pair of parentheses wrapping the whole expression.
fn strip_outer_parens(text: &str) -> &str {
    let mut current = text;
    while current.starts_with('(') && current.ends_with(')') && wraps_whole(current) {
        current = current[1..current.len() - 1].trim();
    }
    current
}

fn wraps_whole(text: &str) -> bool {
    let mut depth = 0usize;
    for (idx, byte) in text.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return idx == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Classifies a filter operand with the same literal rules as the triple
/// tokenizer: variables keep their name, everything else is a literal with
/// an inferred datatype where the surface syntax provides one.
fn classify_operand(
    token: &str,
    prefixes: &[(String, String)],
) -> Result<FilterOperand, QueryParseError> {
    if let Some(name) = token.strip_prefix(['?', '$']) {
        if name.is_empty() {
            return Err(QueryParseError::malformed("empty variable name in filter"));
        }
        return Ok(FilterOperand::variable(name));
    }
    if let Some(inner) = token.strip_prefix('<') {
        let Some(iri) = inner.strip_suffix('>') else {
            return Err(QueryParseError::malformed(format!(
                "unterminated IRI reference {token:?} in filter"
            )));
        };
        return Ok(FilterOperand::literal(iri, None));
    }
    if token.starts_with(['"', '\'']) {
        return classify_quoted_operand(token, prefixes);
    }
    if let Some(datatype) = numeric_datatype(token) {
        return Ok(FilterOperand::literal(token, Some(datatype.to_owned())));
    }
    if token.contains(':') {
        return Ok(FilterOperand::literal(
            expand_prefixed_name(token, prefixes)?,
            None,
        ));
    }
    Err(QueryParseError::malformed(format!(
        "unrecognized filter operand {token:?}"
    )))
}

fn classify_quoted_operand(
    token: &str,
    prefixes: &[(String, String)],
) -> Result<FilterOperand, QueryParseError> {
    let bytes = token.as_bytes();
    let quote = bytes[0];
    let mut idx = 1usize;
    while idx < bytes.len() {
        if bytes[idx] == b'\\' {
            idx += 2;
        } else if bytes[idx] == quote {
            let value = &token[1..idx];
            let suffix = &token[idx + 1..];
            if suffix.is_empty() {
                return Ok(FilterOperand::literal(value, None));
            }
            if let Some(datatype) = suffix.strip_prefix("^^") {
                let iri = if let Some(inner) = datatype.strip_prefix('<') {
                    inner
                        .strip_suffix('>')
                        .ok_or_else(|| {
                            QueryParseError::malformed(format!(
                                "unterminated datatype IRI {datatype:?}"
                            ))
                        })?
                        .to_owned()
                } else {
                    expand_prefixed_name(datatype, prefixes)?
                };
                return Ok(FilterOperand::literal(value, Some(iri)));
            }
            return Err(QueryParseError::malformed(format!(
                "unrecognized literal suffix {suffix:?} in filter"
            )));
        } else {
            idx += 1;
        }
    }
    Err(QueryParseError::malformed(format!(
        "unterminated string literal {token:?} in filter"
    )))
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use sparql_parts_model::OperandKind;

    #[test]
    fn relational_comparison() -> Result<(), QueryParseError> {
        let (remaining, filters) = extract_filters("?s ?p ?o. FILTER (?o < 40)", &[])?;
        assert_eq!(remaining.trim(), "?s ?p ?o.");
        assert_eq!(
            filters,
            vec![FilterNode::Relational {
                operator: RelationalOperator::Less,
                left: FilterOperand::variable("o"),
                right: FilterOperand::literal(
                    "40",
                    Some("http://www.w3.org/2001/XMLSchema#integer".to_owned())
                ),
            }]
        );
        Ok(())
    }

    #[test]
    fn operand_order_is_preserved() -> Result<(), QueryParseError> {
        let (_, filters) = extract_filters("FILTER(40 >= ?o)", &[])?;
        let FilterNode::Relational {
            operator,
            left,
            right,
        } = &filters[0]
        else {
            panic!("expected a relational node");
        };
        assert_eq!(*operator, RelationalOperator::GreaterOrEqual);
        assert_eq!(left.kind, OperandKind::Literal);
        assert_eq!(right.kind, OperandKind::Variable);
        Ok(())
    }

    #[test]
    fn no_space_around_operator() -> Result<(), QueryParseError> {
        let (_, filters) = extract_filters("FILTER(?o<40)", &[])?;
        assert!(matches!(
            &filters[0],
            FilterNode::Relational {
                operator: RelationalOperator::Less,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn multiple_filters_accumulate_in_order() -> Result<(), QueryParseError> {
        let (_, filters) =
            extract_filters("?s ?p ?o. FILTER(?o > 1) FILTER(?o != \"x\")", &[])?;
        assert_eq!(filters.len(), 2);
        assert!(matches!(
            &filters[0],
            FilterNode::Relational {
                operator: RelationalOperator::Greater,
                ..
            }
        ));
        assert!(matches!(
            &filters[1],
            FilterNode::Relational {
                operator: RelationalOperator::NotEqual,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn boolean_composition_nests() -> Result<(), QueryParseError> {
        let (_, filters) = extract_filters("FILTER(?o < 40 || ?o > 100 && ?o != 50)", &[])?;
        let FilterNode::Boolean {
            operator, children, ..
        } = &filters[0]
        else {
            panic!("expected a boolean node");
        };
        assert_eq!(*operator, BooleanOperator::Or);
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[0], FilterNode::Relational { .. }));
        assert!(matches!(
            &children[1],
            FilterNode::Boolean {
                operator: BooleanOperator::And,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn iri_operand_compares() -> Result<(), QueryParseError> {
        let (_, filters) = extract_filters("FILTER(?type = <http://foo/Person>)", &[])?;
        let FilterNode::Relational { right, .. } = &filters[0] else {
            panic!("expected a relational node");
        };
        assert_eq!(right.value, "http://foo/Person");
        Ok(())
    }

    #[test]
    fn unsupported_expression_fails() {
        extract_filters("FILTER(bound(?o))", &[]).unwrap_err();
    }
}
