use std::fmt;

/// A parsed `FILTER` expression.
///
/// The supported surface is a single relational comparison; boolean
/// composition with `&&` / `||` is represented structurally so that richer
/// filters nest without a model change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    Relational {
        operator: RelationalOperator,
        left: FilterOperand,
        right: FilterOperand,
    },
    Boolean {
        operator: BooleanOperator,
        children: Vec<FilterNode>,
    },
}

/// One side of a relational comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOperand {
    pub value: String,
    pub kind: OperandKind,
    /// Inferred datatype IRI, only set for literal operands.
    pub datatype: Option<String>,
}

impl FilterOperand {
    pub fn variable(name: impl Into<String>) -> Self {
        FilterOperand {
            value: name.into(),
            kind: OperandKind::Variable,
            datatype: None,
        }
    }

    pub fn literal(value: impl Into<String>, datatype: Option<String>) -> Self {
        FilterOperand {
            value: value.into(),
            kind: OperandKind::Literal,
            datatype,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Variable,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationalOperator {
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
    NotEqual,
}

impl RelationalOperator {
    /// Maps an operator token to its variant. Longer tokens (`<=`, `>=`,
    /// `!=`) must be matched before their one-character counterparts.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(RelationalOperator::Less),
            ">" => Some(RelationalOperator::Greater),
            "<=" => Some(RelationalOperator::LessOrEqual),
            ">=" => Some(RelationalOperator::GreaterOrEqual),
            "=" => Some(RelationalOperator::Equal),
            "!=" => Some(RelationalOperator::NotEqual),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationalOperator::Less => "<",
            RelationalOperator::Greater => ">",
            RelationalOperator::LessOrEqual => "<=",
            RelationalOperator::GreaterOrEqual => ">=",
            RelationalOperator::Equal => "=",
            RelationalOperator::NotEqual => "!=",
        }
    }
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOperator {
    And,
    Or,
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BooleanOperator::And => "&&",
            BooleanOperator::Or => "||",
        })
    }
}
