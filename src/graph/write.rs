//! Store-neutral write statements
//!
//! Importers describe what to write with these values; each [`GraphSink`]
//! decides how to execute them. This keeps the field mapping in one place no
//! matter which store is behind the sink.
//!
//! [`GraphSink`]: super::GraphSink

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::schema::{Label, RelType};

/// Property map of a node or relationship.
pub type Properties = BTreeMap<String, Value>;

/// How a [`NodeMatch`] compares the property.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOp {
    Equals(Value),
    /// String property starts with the prefix (Cypher `STARTS WITH`)
    StartsWith(String),
}

/// Selects existing nodes by label and one property.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMatch {
    pub label: Label,
    pub property: &'static str,
    pub op: MatchOp,
}

impl NodeMatch {
    pub fn equals(label: Label, property: &'static str, value: impl Into<Value>) -> Self {
        Self {
            label,
            property,
            op: MatchOp::Equals(value.into()),
        }
    }

    pub fn starts_with(label: Label, property: &'static str, prefix: impl Into<String>) -> Self {
        Self {
            label,
            property,
            op: MatchOp::StartsWith(prefix.into()),
        }
    }

    /// Whether a node with this label and properties is selected.
    pub fn matches(&self, label: Label, properties: &Properties) -> bool {
        if label != self.label {
            return false;
        }
        let Some(actual) = properties.get(self.property) else {
            return false;
        };
        match &self.op {
            MatchOp::Equals(expected) => actual == expected,
            MatchOp::StartsWith(prefix) => actual
                .as_str()
                .is_some_and(|s| s.starts_with(prefix.as_str())),
        }
    }
}

impl fmt::Display for NodeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            MatchOp::Equals(v) => write!(f, "(:{} {{{}: {}}})", self.label, self.property, v),
            MatchOp::StartsWith(p) => write!(
                f,
                "(:{} {{{} STARTS WITH {:?}}})",
                self.label, self.property, p
            ),
        }
    }
}

/// Whether a relationship write may legitimately create nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Both endpoints must exist; creating zero relationships is an error.
    AtLeastOne,
    /// Zero matches is a normal outcome.
    Any,
}

/// One write against the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// `CREATE (n:Label {...})`
    CreateNode {
        label: Label,
        properties: Properties,
    },
    /// `MATCH (a), (b) WHERE ... CREATE (a)-[r:REL {...}]->(b)` for every
    /// matching pair.
    Relate {
        from: NodeMatch,
        to: NodeMatch,
        rel: RelType,
        properties: Properties,
        expect: Expect,
    },
}

impl Write {
    pub fn create(label: Label) -> Self {
        Write::CreateNode {
            label,
            properties: Properties::new(),
        }
    }

    pub fn relate(from: NodeMatch, rel: RelType, to: NodeMatch) -> Self {
        Write::Relate {
            from,
            to,
            rel,
            properties: Properties::new(),
            expect: Expect::AtLeastOne,
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties_mut().insert(key.to_string(), value.into());
        self
    }

    /// Allow the relationship to match nothing.
    pub fn optional(mut self) -> Self {
        if let Write::Relate { expect, .. } = &mut self {
            *expect = Expect::Any;
        }
        self
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Write::CreateNode { properties, .. } | Write::Relate { properties, .. } => properties,
        }
    }

    fn properties_mut(&mut self) -> &mut Properties {
        match self {
            Write::CreateNode { properties, .. } | Write::Relate { properties, .. } => properties,
        }
    }
}
