use indexmap::IndexMap;
use serde_derive::Serialize;

use super::token::{Pos, Token};
use super::value::{Attribute, Value};

/// A declared infrastructure object: `resource "<type>" "<id>" { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// File declaring the resource (the base file when merged)
    pub file: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    /// Start of the `resource` block
    pub pos: Pos,
    pub attrs: IndexMap<String, Attribute>,
}

impl Resource {
    pub fn new(
        file: impl Into<String>,
        resource_type: impl Into<String>,
        id: impl Into<String>,
        pos: Pos,
    ) -> Self {
        Self {
            file: file.into(),
            resource_type: resource_type.into(),
            id: id.into(),
            pos,
            attrs: IndexMap::new(),
        }
    }

    /// Identity key within a template
    pub fn key(&self) -> (&str, &str) {
        (&self.resource_type, &self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    /// Token of a scalar attribute (first occurrence)
    pub fn get_token(&self, name: &str) -> Option<&Token> {
        self.attribute(name).and_then(|attr| attr.first().value.as_scalar())
    }

    /// Element tokens of a literal list attribute (first occurrence).
    ///
    /// Returns `None` unless the attribute is a list of scalars.
    pub fn get_list_tokens(&self, name: &str) -> Option<Vec<&Token>> {
        self.attribute(name)
            .and_then(|attr| attr.first().value.as_list())
            .and_then(|items| items.iter().map(Value::as_scalar).collect())
    }

    pub fn get_map(&self, name: &str) -> Option<&IndexMap<String, Value>> {
        self.attribute(name).and_then(|attr| attr.first().value.as_map())
    }

    pub(crate) fn add_occurrence(&mut self, name: String, pos: Pos, value: Value) {
        match self.attrs.get_mut(&name) {
            Some(attribute) => attribute.push(pos, value),
            None => {
                self.attrs.insert(name, Attribute::new(pos, value));
            }
        }
    }

    /// Replace each attribute `other` declares, wholesale; keep the rest.
    pub(crate) fn override_with(&mut self, other: Resource) {
        for (name, attribute) in other.attrs {
            // `insert` keeps the slot of an existing key and appends new ones
            self.attrs.insert(name, attribute);
        }
    }
}

/// One base file and the resources it ends up holding after overrides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub file: String,
    pub resources: Vec<Resource>,
}

impl Template {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into(), resources: Vec::new() }
    }

    pub fn find(&self, resource_type: &str, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.key() == (resource_type, id))
    }

    pub(crate) fn find_mut(&mut self, resource_type: &str, id: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.key() == (resource_type, id))
    }

    /// Resources of a given type, in template order
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |r| r.resource_type == resource_type)
    }
}
