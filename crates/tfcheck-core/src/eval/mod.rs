//! Static expression evaluation
//!
//! Resolves literal values and `var.*` references found in attribute tokens
//! without interpreting the language: no functions, operators, conditionals
//! or references to other resources.
//!
//! # C4 Architecture Annotations
//! @c4-component Expression Evaluator
//! @c4-container tfcheck Core
//! @c4-description Resolves interpolations through declared variables
//! @c4-technology Rust (hcl-edit)
//! @c4-responsibility Follow variable reference chains and detect cycles
//! @c4-responsibility Give every resolved list element a usable position

pub mod variables;

use std::ops::Range;

use hcl_edit::expr::{Expression, Traversal, TraversalOperator};
use hcl_edit::parser;
use hcl_edit::template::Element;
use hcl_edit::Span;

use crate::errors::UnresolvableReference;
use crate::schema::{Attribute, Token, TokenKind, Value};
pub use variables::{Variable, VariableTable};

const VAR_ROOT: &str = "var";

pub struct Evaluator<'a> {
    variables: &'a VariableTable,
}

impl<'a> Evaluator<'a> {
    pub fn new(variables: &'a VariableTable) -> Self {
        Self { variables }
    }

    pub fn variables(&self) -> &VariableTable {
        self.variables
    }

    /// Resolve a token to a string.
    ///
    /// Literal tokens return their value (strings unquoted). Templates and
    /// bare `var.*` references are resolved through the variable table.
    pub fn resolve_scalar(&self, token: &Token) -> Result<String, UnresolvableReference> {
        self.scalar_from_token(token, &mut Vec::new())
    }

    /// Resolve a token referencing a list into one token per element.
    ///
    /// Resolved elements carry no position of their own that is meaningful at
    /// the use site, so every returned token takes the position of `token`.
    pub fn resolve_list(&self, token: &Token) -> Result<Vec<Token>, UnresolvableReference> {
        let elements = self.list_from_token(token, &mut Vec::new())?;
        Ok(elements.into_iter().map(|element| element.at(&token.pos)).collect())
    }

    /// Element tokens of a list attribute.
    ///
    /// A literal list keeps each element's own position. A single reference
    /// is resolved with [`Evaluator::resolve_list`].
    pub fn resolve_list_attribute(
        &self,
        attribute: &Attribute,
    ) -> Result<Vec<Token>, UnresolvableReference> {
        let occurrence = attribute.first();
        match &occurrence.value {
            Value::Scalar(token) => self.resolve_list(token),
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::Scalar(token) => Ok(token.clone()),
                    other => Err(UnresolvableReference::NotAString {
                        expr: format!("list element at {}", occurrence.pos),
                        found: other.type_name(),
                    }),
                })
                .collect(),
            Value::Map(_) => Err(UnresolvableReference::NotAList {
                expr: format!("attribute at {}", occurrence.pos),
                found: "map",
            }),
        }
    }

    fn scalar_from_token(
        &self,
        token: &Token,
        stack: &mut Vec<String>,
    ) -> Result<String, UnresolvableReference> {
        let expr = parse(&token.text)?;
        self.scalar_from_expr(&expr, &token.text, stack)
    }

    fn scalar_from_expr(
        &self,
        expr: &Expression,
        text: &str,
        stack: &mut Vec<String>,
    ) -> Result<String, UnresolvableReference> {
        match expr {
            Expression::String(s) => Ok(s.value().to_string()),
            Expression::Number(_) => Ok(source_text(expr, text)),
            Expression::Bool(b) => Ok(b.value().to_string()),
            Expression::Parenthesis(p) => self.scalar_from_expr(p.inner(), text, stack),
            Expression::StringTemplate(template) => self.scalar_from_template(template.iter(), text, stack),
            Expression::HeredocTemplate(heredoc) => {
                let value = self.scalar_from_template(heredoc.template.iter(), text, stack)?;
                Ok(trim_final_newline(&value).to_string())
            }
            Expression::Traversal(traversal) => {
                let (name, value) = self.lookup(traversal, text)?;
                match value {
                    Value::Scalar(token) => {
                        self.follow(name, stack, |stack| self.scalar_from_token(token, stack))
                    }
                    other => Err(UnresolvableReference::NotAString {
                        expr: source_text(expr, text),
                        found: other.type_name(),
                    }),
                }
            }
            Expression::Variable(_) => Err(unsupported(text, "bare identifiers are not values")),
            Expression::Null(_) => Err(unsupported(text, "null has no string value")),
            Expression::Array(_) => Err(UnresolvableReference::NotAString {
                expr: text.to_string(),
                found: "list",
            }),
            Expression::Object(_) => Err(UnresolvableReference::NotAString {
                expr: text.to_string(),
                found: "map",
            }),
            Expression::Conditional(_)
            | Expression::FuncCall(_)
            | Expression::UnaryOp(_)
            | Expression::BinaryOp(_)
            | Expression::ForExpr(_) => Err(unsupported(text, "only literals and variables are evaluated")),
        }
    }

    fn scalar_from_template<'e>(
        &self,
        elements: impl Iterator<Item = &'e Element>,
        text: &str,
        stack: &mut Vec<String>,
    ) -> Result<String, UnresolvableReference> {
        let mut out = String::new();
        for element in elements {
            match element {
                Element::Literal(literal) => out.push_str(literal.value()),
                Element::Interpolation(interpolation) => {
                    out.push_str(&self.scalar_from_expr(&interpolation.expr, text, stack)?)
                }
                Element::Directive(_) => {
                    return Err(unsupported(text, "template directives are not evaluated"))
                }
            }
        }
        Ok(out)
    }

    fn list_from_token(
        &self,
        token: &Token,
        stack: &mut Vec<String>,
    ) -> Result<Vec<Token>, UnresolvableReference> {
        let expr = parse(&token.text)?;
        self.list_from_expr(&expr, token, stack)
    }

    fn list_from_expr(
        &self,
        expr: &Expression,
        token: &Token,
        stack: &mut Vec<String>,
    ) -> Result<Vec<Token>, UnresolvableReference> {
        let text = token.text.as_str();
        match expr {
            Expression::Array(array) => array
                .iter()
                .map(|element| {
                    Ok(Token::new(TokenKind::of(element), source_text(element, text), token.pos.clone()))
                })
                .collect(),
            Expression::Parenthesis(p) => self.list_from_expr(p.inner(), token, stack),
            Expression::StringTemplate(template) => {
                let mut elements = template.iter();
                match (elements.next(), elements.next()) {
                    (Some(Element::Interpolation(interpolation)), None) => {
                        self.list_from_expr(&interpolation.expr, token, stack)
                    }
                    _ => Err(UnresolvableReference::NotAList {
                        expr: text.to_string(),
                        found: "string",
                    }),
                }
            }
            Expression::Traversal(traversal) => {
                let (name, value) = self.lookup(traversal, text)?;
                match value {
                    Value::List(items) => items
                        .iter()
                        .map(|item| match item {
                            Value::Scalar(element) => Ok(element.clone()),
                            other => Err(UnresolvableReference::NotAString {
                                expr: format!("element of var.{}", name),
                                found: other.type_name(),
                            }),
                        })
                        .collect(),
                    Value::Scalar(inner) => {
                        self.follow(name, stack, |stack| self.list_from_token(inner, stack))
                    }
                    Value::Map(_) => Err(UnresolvableReference::NotAList {
                        expr: source_text(expr, text),
                        found: "map",
                    }),
                }
            }
            Expression::String(_) | Expression::Number(_) | Expression::Bool(_) => {
                Err(UnresolvableReference::NotAList { expr: text.to_string(), found: "scalar" })
            }
            Expression::Object(_) => {
                Err(UnresolvableReference::NotAList { expr: text.to_string(), found: "map" })
            }
            _ => Err(unsupported(text, "only literals and variables are evaluated")),
        }
    }

    /// Recurse into the value of variable `name`, refusing to enter a
    /// variable that is already being resolved.
    fn follow<T>(
        &self,
        name: &str,
        stack: &mut Vec<String>,
        resolve: impl FnOnce(&mut Vec<String>) -> Result<T, UnresolvableReference>,
    ) -> Result<T, UnresolvableReference> {
        if stack.iter().any(|seen| seen == name) {
            let mut cycle = stack.clone();
            cycle.push(name.to_string());
            return Err(UnresolvableReference::CircularReference { cycle });
        }
        stack.push(name.to_string());
        let result = resolve(stack);
        stack.pop();
        result
    }

    /// Resolve `var.NAME` followed by any index or attribute operators.
    fn lookup<'t>(
        &'t self,
        traversal: &'t Traversal,
        text: &str,
    ) -> Result<(&'t str, &'a Value), UnresolvableReference> {
        let expr_text = || span_text(traversal.span(), text);

        let root = traversal.expr.as_variable().map(|ident| ident.as_str());
        let mut operators = traversal.operators.iter().map(|op| op.value());
        let name = match (root, operators.next()) {
            (Some(VAR_ROOT), Some(TraversalOperator::GetAttr(name))) => name.as_str(),
            _ => return Err(unsupported(&expr_text(), "only var.* references are resolved")),
        };

        let mut value = self.variables.get(name)?;
        for operator in operators {
            value = match (operator, value) {
                (TraversalOperator::GetAttr(key), Value::Map(map)) => {
                    map.get(key.as_str()).ok_or_else(|| UnresolvableReference::MissingKey {
                        expr: expr_text(),
                        key: key.to_string(),
                    })?
                }
                (TraversalOperator::LegacyIndex(index), Value::List(items)) => {
                    index_list(items, *index.value(), &expr_text)?
                }
                (TraversalOperator::Index(Expression::Number(n)), Value::List(items)) => {
                    let index = n.value().as_u64().ok_or_else(|| {
                        unsupported(&expr_text(), "list index must be a non-negative integer")
                    })?;
                    index_list(items, index, &expr_text)?
                }
                (TraversalOperator::Index(Expression::String(key)), Value::Map(map)) => {
                    map.get(key.value().as_str()).ok_or_else(|| UnresolvableReference::MissingKey {
                        expr: expr_text(),
                        key: key.value().to_string(),
                    })?
                }
                _ => return Err(unsupported(&expr_text(), "unsupported index into variable")),
            };
        }
        Ok((name, value))
    }
}

fn index_list<'v>(
    items: &'v [Value],
    index: u64,
    expr_text: &dyn Fn() -> String,
) -> Result<&'v Value, UnresolvableReference> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .ok_or_else(|| UnresolvableReference::IndexOutOfRange {
            expr: expr_text(),
            index,
            len: items.len(),
        })
}

fn parse(text: &str) -> Result<Expression, UnresolvableReference> {
    parser::parse_expr(text).map_err(|e| UnresolvableReference::Syntax {
        text: text.to_string(),
        message: e.message().to_string(),
    })
}

/// Text of `expr` within `text`, falling back to the whole text
fn source_text(expr: &Expression, text: &str) -> String {
    span_text(expr.span(), text)
}

fn span_text(span: Option<Range<usize>>, text: &str) -> String {
    span.and_then(|span| text.get(span)).unwrap_or(text).trim().to_string()
}

/// Heredoc bodies end with the newline before the closing delimiter
fn trim_final_newline(value: &str) -> &str {
    value.strip_suffix("\r\n").or_else(|| value.strip_suffix('\n')).unwrap_or(value)
}

fn unsupported(text: &str, reason: &'static str) -> UnresolvableReference {
    UnresolvableReference::Unsupported { expr: text.to_string(), reason }
}
