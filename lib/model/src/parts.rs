use crate::{FilterNode, QuerySubType, TriplePattern};

/// The normalized structural breakdown of one query.
///
/// Every field is optional: a clause that does not occur in the query text
/// leaves its field `None` rather than an empty placeholder, so consumers
/// probe for presence instead of testing emptiness. Once handed out, a
/// `QueryParts` is an immutable snapshot; it is rebuilt only when the owning
/// query is re-initialized with new text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParts {
    /// Declared `PREFIX` bindings, in declaration order.
    pub prefixes: Option<Vec<(String, String)>>,
    /// Synthetic aliases for namespace roots used without a declaration,
    /// in order of first appearance (`ns-0`, `ns-1`, ... plus the fixed
    /// `xsd` alias).
    pub namespaces: Option<Vec<(String, String)>>,
    /// Default and update target graphs (`FROM`, `WITH`, inline `GRAPH`).
    pub graphs: Option<Vec<String>>,
    /// `FROM NAMED` graphs.
    pub named_graphs: Option<Vec<String>>,
    pub triple_patterns: Option<Vec<TriplePattern>>,
    pub filter_patterns: Option<Vec<FilterNode>>,
    /// All distinct variables, in first-occurrence order.
    pub variables: Option<Vec<String>>,
    /// The explicit projection of a `SELECT` or `DESCRIBE` query.
    pub result_variables: Option<Vec<String>>,
    pub sub_type: Option<QuerySubType>,
    /// Raw text of a `DELETE DATA` block or `DELETE` template.
    pub delete_data: Option<String>,
    /// Raw text of an `INSERT DATA` block or `INSERT` template.
    pub insert_data: Option<String>,
    /// Raw text of the `WHERE` body governing a delete.
    pub delete_where: Option<String>,
    /// Raw text of the `WHERE` body governing an insert.
    pub insert_where: Option<String>,
}

impl QueryParts {
    /// Number of fields present.
    pub fn field_count(&self) -> usize {
        [
            self.prefixes.is_some(),
            self.namespaces.is_some(),
            self.graphs.is_some(),
            self.named_graphs.is_some(),
            self.triple_patterns.is_some(),
            self.filter_patterns.is_some(),
            self.variables.is_some(),
            self.result_variables.is_some(),
            self.sub_type.is_some(),
            self.delete_data.is_some(),
            self.insert_data.is_some(),
            self.delete_where.is_some(),
            self.insert_where.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Looks up the IRI a prefix was declared for.
    pub fn prefix_iri(&self, prefix: &str) -> Option<&str> {
        self.prefixes
            .as_ref()?
            .iter()
            .find(|(name, _)| name == prefix)
            .map(|(_, iri)| iri.as_str())
    }

    /// Looks up the namespace root behind a synthetic alias.
    pub fn namespace_iri(&self, alias: &str) -> Option<&str> {
        self.namespaces
            .as_ref()?
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, iri)| iri.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_have_no_fields() {
        assert_eq!(QueryParts::default().field_count(), 0);
    }

    #[test]
    fn lookup_helpers() {
        let parts = QueryParts {
            prefixes: Some(vec![("foaf".to_owned(), "http://xmlns.com/foaf/0.1/".to_owned())]),
            namespaces: Some(vec![("ns-0".to_owned(), "http://foo/".to_owned())]),
            ..QueryParts::default()
        };
        assert_eq!(parts.prefix_iri("foaf"), Some("http://xmlns.com/foaf/0.1/"));
        assert_eq!(parts.prefix_iri("dc"), None);
        assert_eq!(parts.namespace_iri("ns-0"), Some("http://foo/"));
        assert_eq!(parts.field_count(), 2);
    }
}
