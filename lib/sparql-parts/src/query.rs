use crate::extract::{self, non_empty};
use crate::scan::{expect_keyword, snippet, Scanner};
use crate::update;
use sparql_parts_model::{QueryForm, QueryParseError, QueryParts, QuerySubType};
use std::fmt;
use std::sync::OnceLock;

/// A classified SPARQL query and its lazily computed structural breakdown.
///
/// The raw text is immutable once set; [`Query::init`] replaces it and drops
/// the memoized parts. Extraction runs at most once per text: the first call
/// to [`Query::query_parts`] computes and caches, later calls return the
/// cached value. A failed extraction caches nothing.
#[derive(Debug)]
pub struct Query {
    form: QueryForm,
    text: String,
    parts: OnceLock<QueryParts>,
}

impl Query {
    /// Classifies `text` by its leading form keyword and wraps it.
    ///
    /// Prefix declarations and comments before the form keyword are
    /// permitted. Parts extraction is deferred until
    /// [`Query::query_parts`] is first called.
    pub fn parse(text: impl Into<String>) -> Result<Self, QueryParseError> {
        let text = text.into();
        let form = detect_form(&text)?;
        Ok(Query {
            form,
            text,
            parts: OnceLock::new(),
        })
    }

    /// Creates a query of a known form with no text yet; [`Query::init`]
    /// must be called before the parts can be extracted.
    pub fn empty(form: QueryForm) -> Self {
        Query {
            form,
            text: String::new(),
            parts: OnceLock::new(),
        }
    }

    /// Replaces the query text and invalidates any memoized parts.
    pub fn init(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.parts = OnceLock::new();
    }

    /// The raw query text, unchanged.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn form(&self) -> QueryForm {
        self.form
    }

    /// The structural breakdown of this query, extracting it on first use.
    ///
    /// Concurrent first calls may race to compute, but initialization of the
    /// cache itself is exclusive and extraction is pure, so every caller
    /// observes the same value.
    pub fn query_parts(&self) -> Result<&QueryParts, QueryParseError> {
        if let Some(parts) = self.parts.get() {
            return Ok(parts);
        }
        let parts = extract_parts(self.form, &self.text)?;
        Ok(self.parts.get_or_init(|| parts))
    }

    /// The structural sub-form, if this query has one: update queries
    /// always do, a `DESCRIBE` with a `WHERE` clause reports
    /// [`QuerySubType::DescribeWhere`], everything else reports `None`.
    pub fn sub_type(&self) -> Result<Option<QuerySubType>, QueryParseError> {
        Ok(self.query_parts()?.sub_type)
    }

    pub fn is_ask_query(&self) -> bool {
        self.form == QueryForm::Ask
    }

    pub fn is_describe_query(&self) -> bool {
        self.form == QueryForm::Describe
    }

    pub fn is_graph_query(&self) -> bool {
        self.form == QueryForm::Graph
    }

    pub fn is_select_query(&self) -> bool {
        self.form == QueryForm::Select
    }

    pub fn is_update_query(&self) -> bool {
        self.form == QueryForm::Update
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Skips prologue declarations (`PREFIX`, `BASE`) and surrounding trivia.
pub(crate) fn skip_prologue(scanner: &mut Scanner<'_>) -> Result<(), QueryParseError> {
    loop {
        scanner.skip_trivia();
        if scanner.eat_keyword("PREFIX") {
            scanner.skip_trivia();
            scanner.read_prefix_label()?;
            scanner.skip_trivia();
            scanner.read_iri_ref()?;
        } else if scanner.eat_keyword("BASE") {
            scanner.skip_trivia();
            scanner.read_iri_ref()?;
        } else {
            return Ok(());
        }
    }
}

/// Determines the query form from the first keyword after the prologue.
pub fn detect_form(text: &str) -> Result<QueryForm, QueryParseError> {
    let mut scanner = Scanner::new(text);
    skip_prologue(&mut scanner)?;
    scanner.skip_trivia();
    let forms = [
        ("ASK", QueryForm::Ask),
        ("DESCRIBE", QueryForm::Describe),
        ("SELECT", QueryForm::Select),
        ("CONSTRUCT", QueryForm::Graph),
        ("INSERT", QueryForm::Update),
        ("DELETE", QueryForm::Update),
        ("WITH", QueryForm::Update),
    ];
    for (keyword, form) in forms {
        if scanner.eat_keyword(keyword) {
            return Ok(form);
        }
    }
    Err(QueryParseError::malformed(format!(
        "unrecognized query form near {:?}",
        snippet(scanner.rest())
    )))
}

fn extract_parts(form: QueryForm, text: &str) -> Result<QueryParts, QueryParseError> {
    match form {
        QueryForm::Update => update::extract_update_parts(text),
        _ => extract_read_parts(form, text),
    }
}

/// Shared extraction for the read forms (ASK, DESCRIBE, SELECT, CONSTRUCT).
fn extract_read_parts(form: QueryForm, text: &str) -> Result<QueryParts, QueryParseError> {
    let prefixes = extract::prefixes::extract_prefixes(text)?;
    let (mut graphs, named_graphs) = extract::graphs::extract_from_clauses(text)?;

    let mut scanner = Scanner::new(text);
    skip_prologue(&mut scanner)?;
    scanner.skip_trivia();

    let mut result_variables = Vec::new();
    let mut template_block = None;
    if form == QueryForm::Ask {
        expect_keyword(&mut scanner, "ASK")?;
    } else if form == QueryForm::Select {
        expect_keyword(&mut scanner, "SELECT")?;
        scanner.skip_trivia();
        if !scanner.eat_keyword("DISTINCT") {
            scanner.eat_keyword("REDUCED");
        }
        result_variables = read_projection(&mut scanner)?;
    } else if form == QueryForm::Describe {
        expect_keyword(&mut scanner, "DESCRIBE")?;
        result_variables = read_projection(&mut scanner)?;
    } else {
        expect_keyword(&mut scanner, "CONSTRUCT")?;
        scanner.skip_trivia();
        if scanner.peek() == Some(b'{') {
            template_block = Some(scanner.read_braced_block()?);
        }
    }

    let where_block = locate_body(&mut scanner)?;

    let mut blocks = Vec::new();
    blocks.extend(template_block);
    blocks.extend(where_block);
    let extracted = extract::process_blocks(&blocks, &prefixes)?;
    graphs.extend(extracted.graphs);

    let namespaces = extract::namespaces::extract_namespaces(&extracted.scanned, &prefixes);
    let variables = extract::variables::collect_variables(
        &result_variables,
        &extracted.triples,
        &extracted.filters,
    );
    let sub_type = (form == QueryForm::Describe && where_block.is_some())
        .then_some(QuerySubType::DescribeWhere);

    Ok(QueryParts {
        prefixes: non_empty(prefixes),
        namespaces: non_empty(namespaces),
        graphs: non_empty(graphs),
        named_graphs: non_empty(named_graphs),
        triple_patterns: non_empty(extracted.triples),
        filter_patterns: non_empty(extracted.filters),
        variables: non_empty(variables),
        result_variables: non_empty(result_variables),
        sub_type,
        ..QueryParts::default()
    })
}

/// Reads the projection list after `SELECT` or `DESCRIBE`: variables are
/// collected, a `*` wildcard and explicit IRIs are consumed but yield no
/// result variables.
fn read_projection(scanner: &mut Scanner<'_>) -> Result<Vec<String>, QueryParseError> {
    let mut variables = Vec::new();
    loop {
        scanner.skip_trivia();
        match scanner.peek() {
            Some(b'?' | b'$') => variables.push(scanner.read_variable()?.to_owned()),
            Some(b'*') => {
                scanner.bump();
            }
            Some(b'<') => {
                scanner.read_iri_ref()?;
            }
            _ => return Ok(variables),
        }
    }
}

/// Walks past any graph clauses to the pattern body: either `WHERE { ... }`
/// or a bare `{ ... }`. Queries without a body (e.g. `DESCRIBE <iri>`)
/// yield `None`.
fn locate_body<'a>(scanner: &mut Scanner<'a>) -> Result<Option<&'a str>, QueryParseError> {
    loop {
        scanner.skip_trivia();
        if scanner.is_at_end() {
            return Ok(None);
        }
        if scanner.eat_keyword("WHERE") {
            scanner.skip_trivia();
            return scanner.read_braced_block().map(Some);
        }
        if scanner.peek() == Some(b'{') {
            return scanner.read_braced_block().map(Some);
        }
        scanner.skip_atom()?;
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;

    #[test]
    fn form_detection() -> Result<(), QueryParseError> {
        assert_eq!(detect_form("ASK { ?s ?p ?o }")?, QueryForm::Ask);
        assert_eq!(
            detect_form("PREFIX foaf: <http://xmlns.com/foaf/0.1/> DESCRIBE ?x WHERE { ?x foaf:name \"Alice\" }")?,
            QueryForm::Describe
        );
        assert_eq!(detect_form("select ?x where { ?x ?y ?z }")?, QueryForm::Select);
        assert_eq!(
            detect_form("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }")?,
            QueryForm::Graph
        );
        assert_eq!(detect_form("INSERT DATA { <http://s> <http://p> 1 }")?, QueryForm::Update);
        assert_eq!(
            detect_form("WITH <http://g/> DELETE { ?s ?p ?o } WHERE { ?s ?p ?o }")?,
            QueryForm::Update
        );
        Ok(())
    }

    #[test]
    fn unknown_form_fails() {
        assert!(matches!(
            detect_form("FOOBAR ?x WHERE { ?x ?y ?z }"),
            Err(QueryParseError::MalformedQuery(_))
        ));
    }

    #[test]
    fn exactly_one_predicate_is_true() {
        let queries = [
            Query::empty(QueryForm::Ask),
            Query::empty(QueryForm::Describe),
            Query::empty(QueryForm::Select),
            Query::empty(QueryForm::Graph),
            Query::empty(QueryForm::Update),
        ];
        for query in &queries {
            let truths = [
                query.is_ask_query(),
                query.is_describe_query(),
                query.is_graph_query(),
                query.is_select_query(),
                query.is_update_query(),
            ];
            assert_eq!(truths.iter().filter(|answer| **answer).count(), 1);
        }
    }

    #[test]
    fn parts_are_memoized() -> Result<(), QueryParseError> {
        let query = Query::parse("SELECT ?x WHERE { ?x ?y ?z }")?;
        let first = query.query_parts()?.clone();
        let second = query.query_parts()?;
        assert_eq!(&first, second);
        Ok(())
    }

    #[test]
    fn init_replaces_text_and_parts() -> Result<(), QueryParseError> {
        let mut query = Query::parse("SELECT ?x WHERE { ?x ?y ?z }")?;
        assert!(query.query_parts()?.result_variables.is_some());
        query.init("SELECT * WHERE { ?a ?b ?c }");
        assert_eq!(query.as_str(), "SELECT * WHERE { ?a ?b ?c }");
        assert!(query.query_parts()?.result_variables.is_none());
        Ok(())
    }

    #[test]
    fn failed_extraction_caches_nothing() -> Result<(), QueryParseError> {
        let mut query = Query::parse("INSERT DATA { }")?;
        query.query_parts().unwrap_err();
        query.init("INSERT DATA { <http://s> <http://p> \"v\" }");
        assert!(query.query_parts()?.triple_patterns.is_some());
        Ok(())
    }

    #[test]
    fn ask_with_bare_body() -> Result<(), QueryParseError> {
        let query = Query::parse("ASK { ?s ?p ?o }")?;
        let parts = query.query_parts()?;
        assert_eq!(
            parts.variables.as_deref(),
            Some(&["s".to_owned(), "p".to_owned(), "o".to_owned()][..])
        );
        assert!(parts.result_variables.is_none());
        Ok(())
    }

    #[test]
    fn construct_template_and_where_both_contribute() -> Result<(), QueryParseError> {
        let query = Query::parse(
            "CONSTRUCT { ?x <http://out/p> ?name } WHERE { ?x <http://in/name> ?name }",
        )?;
        let parts = query.query_parts()?;
        let triples = parts.triple_patterns.as_ref().map_or(0, Vec::len);
        assert_eq!(triples, 2);
        assert!(parts.sub_type.is_none());
        Ok(())
    }

    #[test]
    fn describe_without_where_has_no_sub_type() -> Result<(), QueryParseError> {
        let query = Query::parse("DESCRIBE <http://resource/1> FROM <http://g/>")?;
        let parts = query.query_parts()?;
        assert!(parts.sub_type.is_none());
        assert_eq!(parts.graphs.as_deref(), Some(&["http://g/".to_owned()][..]));
        Ok(())
    }
}
