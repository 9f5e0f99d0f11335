use std::fmt;

/// The kind of value occupying one slot of a triple pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// A query variable (`?x` or `$x`), stored without its sigil.
    Variable,
    /// An IRI, either written as `<...>` or expanded from a prefixed name.
    Uri,
    /// A plain literal, optionally carrying a language tag.
    Literal,
    /// A literal with an explicit or inferred datatype IRI.
    TypedLiteral,
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TermKind::Variable => "var",
            TermKind::Uri => "uri",
            TermKind::Literal => "literal",
            TermKind::TypedLiteral => "typed-literal",
        })
    }
}

/// One slot of a triple pattern: a value together with its classification.
///
/// `datatype` and `language` are mutually exclusive and only ever set on
/// object terms. Subject and predicate slots are restricted to
/// [`TermKind::Variable`] and [`TermKind::Uri`] by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTerm {
    pub value: String,
    pub kind: TermKind,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl PatternTerm {
    pub fn variable(name: impl Into<String>) -> Self {
        PatternTerm {
            value: name.into(),
            kind: TermKind::Variable,
            datatype: None,
            language: None,
        }
    }

    pub fn uri(iri: impl Into<String>) -> Self {
        PatternTerm {
            value: iri.into(),
            kind: TermKind::Uri,
            datatype: None,
            language: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        PatternTerm {
            value: value.into(),
            kind: TermKind::Literal,
            datatype: None,
            language: None,
        }
    }

    pub fn language_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        PatternTerm {
            value: value.into(),
            kind: TermKind::Literal,
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        PatternTerm {
            value: value.into(),
            kind: TermKind::TypedLiteral,
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.kind == TermKind::Variable
    }

    /// Whether this term may occupy a subject or predicate slot.
    pub fn is_resource(&self) -> bool {
        matches!(self.kind, TermKind::Variable | TermKind::Uri)
    }
}
