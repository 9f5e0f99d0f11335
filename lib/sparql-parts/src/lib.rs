//! Structural analysis of SPARQL 1.1 query text.
//!
//! Classifies a query's top-level form (`ASK`, `DESCRIBE`, `SELECT`,
//! `CONSTRUCT`, or one of five update sub-forms) and extracts a normalized,
//! typed breakdown of its clauses — prefixes, derived namespaces, referenced
//! graphs, triple patterns, filter expressions and variables — so that
//! downstream execution or routing components never re-parse raw SPARQL.
//!
//! This is not a full SPARQL 1.1 parser: `OPTIONAL`, `UNION`, property
//! paths, sub-selects and aggregates are outside the supported subset.
//!
//! ```
//! use sparql_parts::Query;
//!
//! let query = Query::parse(
//!     "PREFIX foaf: <http://xmlns.com/foaf/0.1/> \
//!      SELECT ?name WHERE { ?person foaf:name ?name }",
//! )?;
//! assert!(query.is_select_query());
//!
//! let parts = query.query_parts()?;
//! assert_eq!(parts.result_variables, Some(vec!["name".to_owned()]));
//! assert_eq!(parts.prefix_iri("foaf"), Some("http://xmlns.com/foaf/0.1/"));
//! # Ok::<_, sparql_parts::model::QueryParseError>(())
//! ```

mod extract;
mod query;
mod scan;
mod update;

pub use query::{detect_form, Query};

pub mod model {
    pub use sparql_parts_model::*;
}
