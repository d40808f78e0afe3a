//! Typed builders for the graph-scoped queries issued by pipeline steps

use crate::sparql::arg::{self, ArgError};
use oxrdf::{Literal, NamedNode};
use std::fmt;

/// A term position inside a triple pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternTerm {
    /// A query variable, rendered as `?name`
    Var(String),
    /// A validated IRI
    Iri(NamedNode),
    /// An escaped literal
    Literal(Literal),
}

impl PatternTerm {
    pub fn var(name: &str) -> Self {
        PatternTerm::Var(name.to_string())
    }

    pub fn iri(value: &str) -> Result<Self, ArgError> {
        Ok(PatternTerm::Iri(arg::named_node(value)?))
    }
}

impl From<NamedNode> for PatternTerm {
    fn from(node: NamedNode) -> Self {
        PatternTerm::Iri(node)
    }
}

impl From<Literal> for PatternTerm {
    fn from(literal: Literal) -> Self {
        PatternTerm::Literal(literal)
    }
}

impl fmt::Display for PatternTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternTerm::Var(name) => write!(f, "?{}", name),
            PatternTerm::Iri(node) => write!(f, "{}", node),
            PatternTerm::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

/// A `subject predicate object` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// An element of a `WHERE { ... }` group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupElement {
    Triple(TriplePattern),
    /// `FILTER (?var NOT IN (...))`, omitted for an empty list
    FilterNotIn { var: String, values: Vec<NamedNode> },
    /// `FILTER NOT EXISTS { ... }`
    FilterNotExists(Vec<TriplePattern>),
    /// `{ SELECT DISTINCT ?var WHERE { ... } }`
    SubSelect { var: String, pattern: Vec<GroupElement> },
    /// `BIND (IRI(STR(?source)) AS ?target)` followed by a check that the
    /// lexical form was an IRI
    BindIri { source: String, target: String },
}

impl From<TriplePattern> for GroupElement {
    fn from(triple: TriplePattern) -> Self {
        GroupElement::Triple(triple)
    }
}

impl GroupElement {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            GroupElement::Triple(triple) => writeln!(f, "{}{}", pad, triple),
            // Nothing is in an empty list, so the filter would pass every row
            GroupElement::FilterNotIn { values, .. } if values.is_empty() => Ok(()),
            GroupElement::FilterNotIn { var, values } => {
                let list = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(f, "{}FILTER (?{} NOT IN ({}))", pad, var, list)
            }
            GroupElement::FilterNotExists(triples) => {
                writeln!(f, "{}FILTER NOT EXISTS {{", pad)?;
                for triple in triples {
                    writeln!(f, "{}  {}", pad, triple)?;
                }
                writeln!(f, "{}}}", pad)
            }
            GroupElement::BindIri { source, target } => {
                writeln!(f, "{}BIND (IRI(STR(?{})) AS ?{})", pad, source, target)?;
                writeln!(f, "{}FILTER (BOUND(?{}))", pad, target)
            }
            GroupElement::SubSelect { var, pattern } => {
                writeln!(f, "{}{{", pad)?;
                writeln!(f, "{}  SELECT DISTINCT ?{}", pad, var)?;
                writeln!(f, "{}  WHERE {{", pad)?;
                for element in pattern {
                    element.write_indented(f, depth + 2)?;
                }
                writeln!(f, "{}  }}", pad)?;
                writeln!(f, "{}}}", pad)
            }
        }
    }
}

fn write_block(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    elements: &[GroupElement],
) -> fmt::Result {
    writeln!(f, "{} {{", keyword)?;
    for element in elements {
        element.write_indented(f, 1)?;
    }
    writeln!(f, "}}")
}

/// A `WITH <graph> DELETE { ... } INSERT { ... } WHERE { ... }` update
///
/// Everything is scoped to one named graph, so the templates and the
/// pattern are plain triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphUpdate {
    graph: NamedNode,
    delete: Vec<TriplePattern>,
    insert: Vec<TriplePattern>,
    pattern: Vec<GroupElement>,
}

impl GraphUpdate {
    pub fn with_graph(graph: NamedNode) -> Self {
        Self {
            graph,
            delete: Vec::new(),
            insert: Vec::new(),
            pattern: Vec::new(),
        }
    }

    pub fn delete(mut self, triple: TriplePattern) -> Self {
        self.delete.push(triple);
        self
    }

    pub fn insert(mut self, triple: TriplePattern) -> Self {
        self.insert.push(triple);
        self
    }

    pub fn where_element(mut self, element: impl Into<GroupElement>) -> Self {
        self.pattern.push(element.into());
        self
    }

    pub fn graph(&self) -> &NamedNode {
        &self.graph
    }
}

impl fmt::Display for GraphUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "WITH {}", self.graph)?;
        // An update needs at least one template
        if !self.delete.is_empty() || self.insert.is_empty() {
            let delete: Vec<GroupElement> =
                self.delete.iter().cloned().map(GroupElement::Triple).collect();
            write_block(f, "DELETE", &delete)?;
        }
        if !self.insert.is_empty() {
            let insert: Vec<GroupElement> =
                self.insert.iter().cloned().map(GroupElement::Triple).collect();
            write_block(f, "INSERT", &insert)?;
        }
        write_block(f, "WHERE", &self.pattern)
    }
}

/// A `SELECT DISTINCT ?var FROM <graph> WHERE { ... }` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSelect {
    graph: NamedNode,
    var: String,
    pattern: Vec<GroupElement>,
}

impl SubjectSelect {
    pub fn new(graph: NamedNode, var: &str) -> Self {
        Self {
            graph,
            var: var.to_string(),
            pattern: Vec::new(),
        }
    }

    pub fn where_element(mut self, element: impl Into<GroupElement>) -> Self {
        self.pattern.push(element.into());
        self
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl fmt::Display for SubjectSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SELECT DISTINCT ?{}", self.var)?;
        writeln!(f, "FROM {}", self.graph)?;
        write_block(f, "WHERE", &self.pattern)
    }
}
