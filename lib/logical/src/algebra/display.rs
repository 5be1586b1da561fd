use crate::algebra::Operation;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Renders the operation as an indented tree with one operation per line.
impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl Operation {
    fn fmt_indented(&self, f: &mut Formatter<'_>, indent: usize) -> std::fmt::Result {
        if indent > 0 {
            writeln!(f)?;
        }
        write!(f, "{:indent$}", "", indent = indent * 2)?;
        self.fmt_node(f)?;
        for child in self.children() {
            child.fmt_indented(f, indent + 1)?;
        }
        Ok(())
    }

    fn fmt_node(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Pattern { pattern, source } => {
                write!(f, "Pattern: {pattern}")?;
                if let Some(source) = source {
                    write!(f, " {source}")?;
                }
                Ok(())
            }
            Operation::Path {
                subject,
                path,
                object,
                graph,
                source,
            } => {
                write!(f, "Path: {subject} {path} {object}")?;
                if let Some(graph) = graph {
                    write!(f, " {graph}")?;
                }
                if let Some(source) = source {
                    write!(f, " {source}")?;
                }
                Ok(())
            }
            Operation::Bgp { patterns } => {
                write!(f, "Bgp: [{}]", patterns.iter().join(", "))
            }
            Operation::Join { .. } => f.write_str("Join"),
            Operation::LeftJoin { expression, .. } => match expression {
                Some(expression) => write!(f, "LeftJoin: {expression}"),
                None => f.write_str("LeftJoin"),
            },
            Operation::Union { .. } => f.write_str("Union"),
            Operation::Minus { .. } => f.write_str("Minus"),
            Operation::Filter { expression, .. } => write!(f, "Filter: {expression}"),
            Operation::Extend {
                variable,
                expression,
                ..
            } => write!(f, "Extend: {variable} := {expression}"),
            Operation::Project { variables, .. } => {
                write!(f, "Project: {}", variables.iter().join(", "))
            }
            Operation::Values {
                variables,
                bindings,
            } => {
                write!(f, "Values: {}", variables.iter().join(", "))?;
                for row in bindings {
                    let row = row.iter().map(|term| match term {
                        Some(term) => term.to_string(),
                        None => String::from("UNDEF"),
                    });
                    write!(f, " ({})", row.format(" "))?;
                }
                Ok(())
            }
            Operation::Group {
                variables,
                aggregates,
                ..
            } => {
                write!(f, "Group: [{}]", variables.iter().join(", "))?;
                if !aggregates.is_empty() {
                    let aggregates = aggregates
                        .iter()
                        .map(|(variable, expression)| format!("{variable} := {expression}"));
                    write!(f, " [{}]", aggregates.format(", "))?;
                }
                Ok(())
            }
            Operation::OrderBy { expressions, .. } => {
                write!(f, "OrderBy: {}", expressions.iter().join(", "))
            }
            Operation::Slice { start, length, .. } => match length {
                Some(length) => write!(f, "Slice: start={start}, length={length}"),
                None => write!(f, "Slice: start={start}"),
            },
            Operation::Distinct { .. } => f.write_str("Distinct"),
            Operation::Reduced { .. } => f.write_str("Reduced"),
            Operation::Graph { name, .. } => write!(f, "Graph: {name}"),
            Operation::From { default, named, .. } => write!(
                f,
                "From: default=[{}], named=[{}]",
                default.iter().join(", "),
                named.iter().join(", ")
            ),
            Operation::Service { name, silent, .. } => {
                write!(f, "Service: {name}")?;
                if *silent {
                    f.write_str(" SILENT")?;
                }
                Ok(())
            }
            Operation::Ask { .. } => f.write_str("Ask"),
            Operation::Construct { template, .. } => {
                write!(f, "Construct: [{}]", template.iter().join(", "))
            }
            Operation::Describe { terms, .. } => {
                write!(f, "Describe: {}", terms.iter().join(", "))
            }
            Operation::DeleteInsert { delete, insert, .. } => write!(
                f,
                "DeleteInsert: delete=[{}], insert=[{}]",
                delete.iter().join(", "),
                insert.iter().join(", ")
            ),
            Operation::Load {
                source,
                destination,
                ..
            } => match destination {
                Some(destination) => write!(f, "Load: {source} INTO {destination}"),
                None => write!(f, "Load: {source}"),
            },
            Operation::Clear { target, .. } => write!(f, "Clear: {target}"),
            Operation::Create { graph, .. } => write!(f, "Create: {graph}"),
            Operation::Drop { target, .. } => write!(f, "Drop: {target}"),
            Operation::Add { from, to, .. } => write!(f, "Add: {from} TO {to}"),
            Operation::Move { from, to, .. } => write!(f, "Move: {from} TO {to}"),
            Operation::Copy { from, to, .. } => write!(f, "Copy: {from} TO {to}"),
            Operation::CompositeUpdate { .. } => f.write_str("CompositeUpdate"),
            Operation::Nop => f.write_str("Nop"),
        }
    }
}
