use crate::algebra::{Expression, Operation, QuadPattern};
use rdf_federation_model::{NamedNodePattern, Term, TermPattern, TriplePattern, Variable};

/// Datatypes whose values are equal if and only if their lexical forms are equal.
const CANONICAL_LEXICAL_DATATYPES: [&str; 11] = [
    "http://www.w3.org/2001/XMLSchema#string",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString",
    "http://www.w3.org/2001/XMLSchema#normalizedString",
    "http://www.w3.org/2001/XMLSchema#anyURI",
    "http://www.w3.org/2001/XMLSchema#base64Binary",
    "http://www.w3.org/2001/XMLSchema#language",
    "http://www.w3.org/2001/XMLSchema#Name",
    "http://www.w3.org/2001/XMLSchema#NCName",
    "http://www.w3.org/2001/XMLSchema#NMTOKEN",
    "http://www.w3.org/2001/XMLSchema#token",
    "http://www.w3.org/2001/XMLSchema#hexBinary",
];

/// Returns the variable and the constant of a `?var = constant` filter if the constant can be
/// substituted into a pattern.
///
/// Literals of numeric or temporal datatypes are not substituted, as `=` compares their values
/// and not their lexical forms.
pub(crate) fn pushable_equality(expression: &Expression) -> Option<(&Variable, &Term)> {
    let (variable, term) = expression.as_variable_equality()?;
    has_syntactic_equality(term).then_some((variable, term))
}

fn has_syntactic_equality(term: &Term) -> bool {
    match term {
        Term::NamedNode(_) | Term::BlankNode(_) => true,
        Term::Literal(literal) => CANONICAL_LEXICAL_DATATYPES.contains(&literal.datatype().as_str()),
        Term::Triple(_) => false,
    }
}

/// Replaces every occurrence of `variable` in a pattern or path with `term`. The source
/// annotation of the leaf is retained.
///
/// Returns [None] if `leaf` is neither a pattern nor a path, or if `variable` occurs in a
/// position that can only hold an IRI and `term` is not an IRI.
pub(crate) fn substitute_into_leaf(
    leaf: &Operation,
    variable: &Variable,
    term: &Term,
) -> Option<Operation> {
    match leaf {
        Operation::Pattern { pattern, source } => Some(Operation::Pattern {
            pattern: QuadPattern {
                subject: substitute_term_pattern(&pattern.subject, variable, term)?,
                predicate: substitute_named_node_pattern(&pattern.predicate, variable, term)?,
                object: substitute_term_pattern(&pattern.object, variable, term)?,
                graph: substitute_graph(pattern.graph.as_ref(), variable, term)?,
            },
            source: source.clone(),
        }),
        Operation::Path {
            subject,
            path,
            object,
            graph,
            source,
        } => Some(Operation::Path {
            subject: substitute_term_pattern(subject, variable, term)?,
            path: path.clone(),
            object: substitute_term_pattern(object, variable, term)?,
            graph: substitute_graph(graph.as_ref(), variable, term)?,
            source: source.clone(),
        }),
        _ => None,
    }
}

fn substitute_term_pattern(
    pattern: &TermPattern,
    variable: &Variable,
    term: &Term,
) -> Option<TermPattern> {
    Some(match pattern {
        TermPattern::Variable(v) if v == variable => term_to_pattern(term)?,
        TermPattern::Triple(triple) => TermPattern::Triple(Box::new(TriplePattern {
            subject: substitute_term_pattern(&triple.subject, variable, term)?,
            predicate: substitute_named_node_pattern(&triple.predicate, variable, term)?,
            object: substitute_term_pattern(&triple.object, variable, term)?,
        })),
        pattern => pattern.clone(),
    })
}

fn substitute_named_node_pattern(
    pattern: &NamedNodePattern,
    variable: &Variable,
    term: &Term,
) -> Option<NamedNodePattern> {
    match (pattern, term) {
        (NamedNodePattern::Variable(v), Term::NamedNode(node)) if v == variable => {
            Some(NamedNodePattern::NamedNode(node.clone()))
        }
        (NamedNodePattern::Variable(v), _) if v == variable => None,
        (pattern, _) => Some(pattern.clone()),
    }
}

fn substitute_graph(
    graph: Option<&NamedNodePattern>,
    variable: &Variable,
    term: &Term,
) -> Option<Option<NamedNodePattern>> {
    match graph {
        Some(graph) => substitute_named_node_pattern(graph, variable, term).map(Some),
        None => Some(None),
    }
}

fn term_to_pattern(term: &Term) -> Option<TermPattern> {
    match term {
        Term::NamedNode(node) => Some(TermPattern::NamedNode(node.clone())),
        Term::BlankNode(node) => Some(TermPattern::BlankNode(node.clone())),
        Term::Literal(literal) => Some(TermPattern::Literal(literal.clone())),
        Term::Triple(_) => None,
    }
}
