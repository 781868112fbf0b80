//! Declared input variables and their assigned values

use indexmap::IndexMap;
use log::warn;

use crate::errors::{ParseError, UnresolvableReference};
use crate::schema::loader::parse_assignments;
use crate::schema::{Pos, Token, Value};

/// A `variable "<name>" { default = ... }` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub pos: Pos,
    pub default: Option<Value>,
}

/// Lookup table used by the evaluator.
///
/// Values are taken, by decreasing priority, from command-line assignments,
/// variable definition files (later files win) and declared defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    declared: IndexMap<String, Variable>,
    from_files: IndexMap<String, Value>,
    from_cli: IndexMap<String, Value>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. A later declaration of the same name replaces
    /// the earlier one.
    pub fn declare(&mut self, variable: Variable) {
        self.declared.insert(variable.name.clone(), variable);
    }

    pub fn declaration(&self, name: &str) -> Option<&Variable> {
        self.declared.get(name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Variable> {
        self.declared.values()
    }

    /// Load assignments from the contents of a variable definitions file.
    pub fn load_var_file(&mut self, file: &str, source: &str) -> Result<(), ParseError> {
        for (name, value) in parse_assignments(file, source)? {
            if !self.declared.contains_key(&name) {
                warn!("{}: value assigned to undeclared variable '{}'", file, name);
            }
            self.from_files.insert(name, value);
        }
        Ok(())
    }

    /// Assign a string value given on the command line (`name=value`).
    pub fn assign(&mut self, name: impl Into<String>, value: &str) {
        let name = name.into();
        if !self.declared.contains_key(&name) {
            warn!("value assigned to undeclared variable '{}'", name);
        }
        self.from_cli.insert(name, Value::Scalar(Token::string_literal(value)));
    }

    /// Current value of a declared variable
    pub fn get(&self, name: &str) -> Result<&Value, UnresolvableReference> {
        let variable = self
            .declared
            .get(name)
            .ok_or_else(|| UnresolvableReference::UndeclaredVariable(name.to_string()))?;

        self.from_cli
            .get(name)
            .or_else(|| self.from_files.get(name))
            .or(variable.default.as_ref())
            .ok_or_else(|| UnresolvableReference::NoValue(name.to_string()))
    }
}
