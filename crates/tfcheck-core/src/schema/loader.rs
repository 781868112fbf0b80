//! Per-file extraction of resource and variable declarations.

use hcl_edit::expr::{Expression, ObjectKey};
use hcl_edit::parser;
use hcl_edit::structure::{Block, BlockLabel, Body, Structure};
use hcl_edit::Span;
use indexmap::IndexMap;

use crate::errors::ParseError;
use crate::eval::variables::Variable;

use super::resource::Resource;
use super::token::{SourceMapper, Token, TokenKind};
use super::value::Value;

const RESOURCE: &str = "resource";
const VARIABLE: &str = "variable";
const DEFAULT: &str = "default";

/// Declarations found in one source file, in source order
#[derive(Debug, Default)]
pub(crate) struct ParsedFile {
    pub name: String,
    pub resources: Vec<Resource>,
    pub variables: Vec<Variable>,
}

pub(crate) fn parse_file(name: &str, source: &str) -> Result<ParsedFile, ParseError> {
    let body = parser::parse_body(source).map_err(|e| ParseError::from_hcl(name, &e))?;
    let mapper = SourceMapper::new(name, source);
    let mut parsed = ParsedFile { name: name.to_string(), ..Default::default() };

    for block in body.iter().filter_map(Structure::as_block) {
        match block.ident.as_str() {
            RESOURCE => {
                let resource = extract_resource(block, &mapper)?;
                if parsed.resources.iter().any(|r| r.key() == resource.key()) {
                    return Err(ParseError::new(
                        name,
                        resource.pos.line,
                        resource.pos.column,
                        format!(
                            "duplicate resource \"{}\" \"{}\"",
                            resource.resource_type, resource.id
                        ),
                    ));
                }
                parsed.resources.push(resource);
            }
            VARIABLE => parsed.variables.push(extract_variable(block, &mapper)?),
            _ => {}
        }
    }

    Ok(parsed)
}

/// Attribute assignments of a variable definitions file (`*.tfvars`)
pub(crate) fn parse_assignments(
    name: &str,
    source: &str,
) -> Result<Vec<(String, Value)>, ParseError> {
    let body = parser::parse_body(source).map_err(|e| ParseError::from_hcl(name, &e))?;
    let mapper = SourceMapper::new(name, source);

    body.iter()
        .map(|structure| match structure {
            Structure::Attribute(attr) => {
                Ok((attr.key.to_string(), expression_to_value(&attr.value, &mapper)?))
            }
            Structure::Block(block) => {
                let pos = mapper.span_to_pos(block.span().as_ref());
                Err(ParseError::new(
                    name,
                    pos.line,
                    pos.column,
                    format!("unexpected block \"{}\" in variable definitions", block.ident.as_str()),
                ))
            }
        })
        .collect()
}

fn extract_resource(block: &Block, mapper: &SourceMapper) -> Result<Resource, ParseError> {
    let pos = mapper.span_to_pos(block.span().as_ref());
    let (resource_type, id) = match block.labels.as_slice() {
        [resource_type, id] => (label_text(resource_type), label_text(id)),
        labels => {
            return Err(ParseError::new(
                mapper.filename(),
                pos.line,
                pos.column,
                format!("resource block requires 2 labels, found {}", labels.len()),
            ))
        }
    };

    let mut resource = Resource::new(mapper.filename(), resource_type, id, pos);
    for structure in block.body.iter() {
        match structure {
            Structure::Attribute(attr) => {
                let pos = mapper.span_to_pos(attr.value.span().as_ref());
                let value = expression_to_value(&attr.value, mapper)?;
                resource.add_occurrence(attr.key.to_string(), pos, value);
            }
            Structure::Block(nested) => {
                let pos = mapper.span_to_pos(nested.span().as_ref());
                let value = Value::Map(body_to_map(&nested.body, mapper)?);
                resource.add_occurrence(nested.ident.to_string(), pos, value);
            }
        }
    }
    Ok(resource)
}

fn extract_variable(block: &Block, mapper: &SourceMapper) -> Result<Variable, ParseError> {
    let pos = mapper.span_to_pos(block.span().as_ref());
    let name = match block.labels.as_slice() {
        [name] => label_text(name),
        labels => {
            return Err(ParseError::new(
                mapper.filename(),
                pos.line,
                pos.column,
                format!("variable block requires 1 label, found {}", labels.len()),
            ))
        }
    };

    let default = block
        .body
        .get_attribute(DEFAULT)
        .map(|attr| expression_to_value(&attr.value, mapper))
        .transpose()?;

    Ok(Variable { name, pos, default })
}

fn label_text(label: &BlockLabel) -> String {
    match label {
        BlockLabel::String(s) => s.value().to_string(),
        BlockLabel::Ident(ident) => ident.as_str().to_string(),
    }
}

fn body_to_map(body: &Body, mapper: &SourceMapper) -> Result<IndexMap<String, Value>, ParseError> {
    let mut map = IndexMap::new();
    for structure in body.iter() {
        match structure {
            Structure::Attribute(attr) => {
                map.insert(attr.key.to_string(), expression_to_value(&attr.value, mapper)?);
            }
            Structure::Block(block) => {
                let value = Value::Map(body_to_map(&block.body, mapper)?);
                Value::push_entry(&mut map, block.ident.to_string(), value);
            }
        }
    }
    Ok(map)
}

pub(crate) fn expression_to_value(
    expr: &Expression,
    mapper: &SourceMapper,
) -> Result<Value, ParseError> {
    match expr {
        Expression::Array(array) => array
            .iter()
            .map(|element| expression_to_value(element, mapper))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expression::Object(object) => {
            let mut map = IndexMap::new();
            for (key, value) in object.iter() {
                map.insert(object_key(key, mapper), expression_to_value(value.expr(), mapper)?);
            }
            Ok(Value::Map(map))
        }
        _ => expression_to_token(expr, mapper).map(Value::Scalar),
    }
}

fn expression_to_token(expr: &Expression, mapper: &SourceMapper) -> Result<Token, ParseError> {
    let span = expr.span();
    let text = span.as_ref().and_then(|span| mapper.slice(span)).ok_or_else(|| {
        ParseError::new(mapper.filename(), 0, 0, "parser returned an expression without position")
    })?;
    Ok(Token::new(TokenKind::of(expr), text.trim(), mapper.span_to_pos(span.as_ref())))
}

fn object_key(key: &ObjectKey, mapper: &SourceMapper) -> String {
    match key {
        ObjectKey::Ident(ident) => ident.to_string(),
        ObjectKey::Expression(Expression::String(s)) => s.value().to_string(),
        ObjectKey::Expression(expr) => expr
            .span()
            .and_then(|span| mapper.slice(&span))
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
    }
}
