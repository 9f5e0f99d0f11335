use std::fmt;

/// The five top-level query forms the analyzer distinguishes.
///
/// `CONSTRUCT` queries are reported as [`QueryForm::Graph`] since their
/// result is a graph rather than a solution sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryForm {
    Ask,
    Describe,
    Select,
    Graph,
    Update,
}

impl fmt::Display for QueryForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryForm::Ask => "ask",
            QueryForm::Describe => "describe",
            QueryForm::Select => "select",
            QueryForm::Graph => "graph",
            QueryForm::Update => "update",
        })
    }
}

/// Structural sub-form of a query, refining [`QueryForm`].
///
/// The five update variants are mutually exclusive and terminal: an update
/// query is classified as exactly one of them. [`QuerySubType::DescribeWhere`]
/// marks a `DESCRIBE` query that carries a `WHERE` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuerySubType {
    InsertData,
    DeleteData,
    InsertInto,
    WithDeleteWhere,
    WithDeleteInsertWhere,
    DescribeWhere,
}

impl QuerySubType {
    /// The tag under which this sub-form is reported, e.g. `withDeleteWhere`.
    pub fn as_str(self) -> &'static str {
        match self {
            QuerySubType::InsertData => "insertData",
            QuerySubType::DeleteData => "deleteData",
            QuerySubType::InsertInto => "insertInto",
            QuerySubType::WithDeleteWhere => "withDeleteWhere",
            QuerySubType::WithDeleteInsertWhere => "withDeleteInsertWhere",
            QuerySubType::DescribeWhere => "describeWhere",
        }
    }
}

impl fmt::Display for QuerySubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
