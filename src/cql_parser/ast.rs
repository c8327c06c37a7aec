use std::fmt;

/// A node of the parsed CQL query tree.
///
/// The variant set is closed on purpose: the SQL generator matches
/// exhaustively, so adding an operator is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CqlNode {
    Comparison(Comparison),
    Boolean {
        op: BooleanOp,
        children: Vec<CqlNode>,
    },
    /// Root-only wrapper produced by a trailing `sortby` clause.
    Sort {
        child: Box<CqlNode>,
        keys: Vec<SortKey>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    And,
    Or,
    Not,
}

impl BooleanOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            BooleanOp::And => "AND",
            BooleanOp::Or => "OR",
            BooleanOp::Not => "NOT",
        }
    }
}

/// `field operator value` leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: FieldRef,
    pub op: ComparisonOp,
    pub value: CqlValue,
}

/// CQL distinguishes `==` (exact match) from `=` (case-insensitive
/// word/substring match); the remaining operators are relational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// `==`
    Exact,
    /// `=`
    Substring,
    /// `<>`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Exact => "==",
            ComparisonOp::Substring => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::Less => "<",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterOrEqual => ">=",
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            ComparisonOp::Less
                | ComparisonOp::LessOrEqual
                | ComparisonOp::Greater
                | ComparisonOp::GreaterOrEqual
        )
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A field reference, optionally qualified with a table name
/// (`tableb.prefix` filters through the foreign key to `tableb`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub qualifier: Option<String>,
    pub name: String,
}

impl FieldRef {
    pub fn local(name: impl Into<String>) -> Self {
        FieldRef {
            qualifier: None,
            name: name.into(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        FieldRef {
            qualifier: Some(qualifier.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A comparison value with quoting and escapes already resolved.
///
/// Wildcards are kept apart from literal text so the generator never has to
/// re-scan raw query text to decide what `*` meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqlValue {
    pub segments: Vec<ValueSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSegment {
    Text(String),
    /// An unescaped `*`: matches any character sequence.
    AnySequence,
}

impl CqlValue {
    pub fn literal(text: impl Into<String>) -> Self {
        CqlValue {
            segments: vec![ValueSegment::Text(text.into())],
        }
    }

    pub fn match_all() -> Self {
        CqlValue {
            segments: vec![ValueSegment::AnySequence],
        }
    }

    /// A bare `*` as the entire value: "any non-null value for this field".
    pub fn is_match_all(&self) -> bool {
        self.segments == [ValueSegment::AnySequence]
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, ValueSegment::AnySequence))
    }

    /// Concatenated literal text; the full value only when no wildcard is
    /// present.
    pub fn literal_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let ValueSegment::Text(t) = segment {
                out.push_str(t);
            }
        }
        out
    }
}

/// One `sortby` key with its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: FieldRef,
    pub descending: bool,
}
