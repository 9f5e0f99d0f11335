use thiserror::Error;

/// An error raised while breaking a query string into its structural parts.
///
/// Extraction is all-or-nothing: the first failure aborts the analysis and no
/// partial result is produced. Callers that execute queries are expected to
/// catch these and map them onto their own result wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QueryParseError {
    /// The query text does not follow the supported grammar subset.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
    /// A prefixed name uses a prefix that was never declared.
    #[error("the prefix {0:?} is used but not declared")]
    UnresolvedPrefix(String),
    /// An `INSERT DATA` or `DELETE DATA` block contains no triples.
    #[error("the data block of the update query is empty")]
    EmptyDataBlock,
    /// The update query matches none of the supported update forms.
    #[error("cannot determine the update form: {0}")]
    AmbiguousSubForm(String),
}

impl QueryParseError {
    /// Shorthand for a [`QueryParseError::MalformedQuery`] with the given reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        QueryParseError::MalformedQuery(reason.into())
    }
}
