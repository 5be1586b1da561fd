use crate::algebra::Operation;
use itertools::Itertools;
use rdf_federation_model::vocab::xsd;
use rdf_federation_model::{Function, Literal, NamedNode, Term, Variable};
use std::fmt::{Display, Formatter};

/// The operators of an [Expression::Operator].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
    Equal,
    SameTerm,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    In,
    Add,
    Subtract,
    Multiply,
    Divide,
    UnaryPlus,
    UnaryMinus,
    If,
    Coalesce,
    Bound,
    /// A built-in function call.
    Function(Function),
}

impl Operator {
    fn infix_symbol(&self) -> Option<&'static str> {
        Some(match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Equal => "=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            _ => return None,
        })
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(symbol) = self.infix_symbol() {
            return f.write_str(symbol);
        }

        match self {
            Operator::Not => f.write_str("!"),
            Operator::SameTerm => f.write_str("sameTerm"),
            Operator::In => f.write_str("IN"),
            Operator::UnaryPlus => f.write_str("+"),
            Operator::UnaryMinus => f.write_str("-"),
            Operator::If => f.write_str("IF"),
            Operator::Coalesce => f.write_str("COALESCE"),
            Operator::Bound => f.write_str("BOUND"),
            Operator::Function(function) => write!(f, "{function}"),
            _ => Ok(()),
        }
    }
}

/// The aggregate function of an [Expression::Aggregate].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Sample,
    GroupConcat { separator: Option<String> },
    Custom(NamedNode),
}

impl Display for AggregateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateKind::Count => f.write_str("COUNT"),
            AggregateKind::Sum => f.write_str("SUM"),
            AggregateKind::Avg => f.write_str("AVG"),
            AggregateKind::Min => f.write_str("MIN"),
            AggregateKind::Max => f.write_str("MAX"),
            AggregateKind::Sample => f.write_str("SAMPLE"),
            AggregateKind::GroupConcat { .. } => f.write_str("GROUP_CONCAT"),
            AggregateKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// An expression of the query algebra.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    Term(Term),
    Variable(Variable),
    /// A call of an extension function identified by its IRI.
    NamedFunction {
        name: NamedNode,
        args: Vec<Expression>,
    },
    Operator {
        operator: Operator,
        args: Vec<Expression>,
    },
    /// `EXISTS` or, if `negated`, `NOT EXISTS`.
    Exists {
        operation: Box<Operation>,
        negated: bool,
    },
    /// An aggregate. A missing `expression` counts all solutions (`COUNT(*)`).
    Aggregate {
        kind: AggregateKind,
        distinct: bool,
        expression: Option<Box<Expression>>,
    },
    Wildcard,
}

impl Expression {
    pub fn variable(variable: Variable) -> Self {
        Self::Variable(variable)
    }

    pub fn term(term: impl Into<Term>) -> Self {
        Self::Term(term.into())
    }

    pub fn operator(operator: Operator, args: Vec<Expression>) -> Self {
        Self::Operator { operator, args }
    }

    pub fn and(lhs: Expression, rhs: Expression) -> Self {
        Self::operator(Operator::And, vec![lhs, rhs])
    }

    pub fn equal(lhs: Expression, rhs: Expression) -> Self {
        Self::operator(Operator::Equal, vec![lhs, rhs])
    }

    pub fn named_function(name: NamedNode, args: Vec<Expression>) -> Self {
        Self::NamedFunction { name, args }
    }

    /// Returns whether the expression is the boolean literal `false`.
    pub fn is_false(&self) -> bool {
        match self {
            Expression::Term(Term::Literal(literal)) => is_false_literal(literal),
            _ => false,
        }
    }

    /// Returns whether the expression is an existence test.
    pub fn is_exists(&self) -> bool {
        matches!(self, Expression::Exists { .. })
    }

    /// If the expression is a `?var = constant` or `constant = ?var` equality, returns the
    /// variable and the constant.
    pub fn as_variable_equality(&self) -> Option<(&Variable, &Term)> {
        let Expression::Operator {
            operator: Operator::Equal,
            args,
        } = self
        else {
            return None;
        };

        match args.as_slice() {
            [Expression::Variable(variable), Expression::Term(term)]
            | [Expression::Term(term), Expression::Variable(variable)] => Some((variable, term)),
            _ => None,
        }
    }

    /// If the expression is a conjunction, returns both operands.
    pub fn as_conjunction(&self) -> Option<(&Expression, &Expression)> {
        match self {
            Expression::Operator {
                operator: Operator::And,
                args,
            } => match args.as_slice() {
                [lhs, rhs] => Some((lhs, rhs)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the IRIs of all extension functions called in this expression.
    ///
    /// Expressions nested in existence tests are not considered.
    pub fn named_functions(&self) -> Vec<&NamedNode> {
        let mut result = Vec::new();
        self.collect_named_functions(&mut result);
        result
    }

    fn collect_named_functions<'a>(&'a self, result: &mut Vec<&'a NamedNode>) {
        match self {
            Expression::NamedFunction { name, args } => {
                if !result.contains(&name) {
                    result.push(name);
                }
                for arg in args {
                    arg.collect_named_functions(result);
                }
            }
            Expression::Operator { args, .. } => {
                for arg in args {
                    arg.collect_named_functions(result);
                }
            }
            Expression::Aggregate {
                expression: Some(expression),
                ..
            } => expression.collect_named_functions(result),
            Expression::Term(_)
            | Expression::Variable(_)
            | Expression::Exists { .. }
            | Expression::Aggregate { .. }
            | Expression::Wildcard => {}
        }
    }
}

fn is_false_literal(literal: &Literal) -> bool {
    literal.datatype() == xsd::BOOLEAN && matches!(literal.value(), "false" | "0")
}

impl From<Variable> for Expression {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Term(term) => write!(f, "{term}"),
            Expression::Variable(variable) => write!(f, "{variable}"),
            Expression::NamedFunction { name, args } => {
                write!(f, "{name}({})", args.iter().join(", "))
            }
            Expression::Operator { operator, args } => match (operator.infix_symbol(), args.as_slice()) {
                (Some(symbol), [lhs, rhs]) => write!(f, "({lhs} {symbol} {rhs})"),
                (None, [arg]) if matches!(operator, Operator::Not | Operator::UnaryPlus | Operator::UnaryMinus) => {
                    write!(f, "{operator}{arg}")
                }
                (None, [needle, haystack @ ..]) if *operator == Operator::In => {
                    write!(f, "({needle} IN ({}))", haystack.iter().join(", "))
                }
                _ => write!(f, "{operator}({})", args.iter().join(", ")),
            },
            Expression::Exists { operation, negated } => {
                let keyword = if *negated { "NOT EXISTS" } else { "EXISTS" };
                write!(f, "{keyword}({})", operation.kind())
            }
            Expression::Aggregate {
                kind,
                distinct,
                expression,
            } => {
                let distinct = if *distinct { "DISTINCT " } else { "" };
                match expression {
                    Some(expression) => write!(f, "{kind}({distinct}{expression})"),
                    None => write!(f, "{kind}({distinct}*)"),
                }
            }
            Expression::Wildcard => f.write_str("*"),
        }
    }
}
