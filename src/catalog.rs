//! Catalog product model and translatable-field selection

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Attributes translated by default
pub const DEFAULT_TRANSLATABLE_ATTRIBUTES: &[&str] = &[
    "AMZColor",
    "AMZDescription",
    "AMZTitle",
    "FeatureBullet1",
    "FeatureBullet2",
    "FeatureBullet3",
    "FeatureBullet4",
    "FeatureBullet5",
];

pub const DEFAULT_TITLE_ATTRIBUTE: &str = "AMZTitle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    #[serde(default)]
    pub brand: String,
    /// Parent records group variants (sizes, colors) of one listing
    #[serde(default)]
    pub is_parent: bool,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Product {
    pub fn new(sku: &str, brand: &str, is_parent: bool) -> Self {
        Self {
            sku: sku.to_string(),
            brand: brand.to_string(),
            is_parent,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// One translatable piece of a field
///
/// Most fields are a single part. A variant's title carries its size after
/// the last `-` ("Boxer Brief-Small"); head and size are translated apart and
/// re-joined with `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldParts<'a> {
    pub head: &'a str,
    pub size: Option<&'a str>,
}

impl<'a> FieldParts<'a> {
    pub fn parts(&self) -> impl Iterator<Item = &'a str> {
        std::iter::once(self.head).chain(self.size)
    }

    /// Join translated head and size back together
    pub fn join(head: String, size: Option<String>) -> String {
        match size {
            Some(size) => format!("{}-{}", head, size),
            None => head,
        }
    }
}

/// Allow-list of attribute names eligible for translation
#[derive(Debug, Clone)]
pub struct FieldSelector {
    allowed: HashSet<String>,
    title_attribute: String,
}

impl FieldSelector {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            title_attribute: DEFAULT_TITLE_ATTRIBUTE.to_string(),
        }
    }

    pub fn with_title_attribute(mut self, name: &str) -> Self {
        self.title_attribute = name.to_string();
        self
    }

    pub fn is_translatable(&self, name: &str) -> bool {
        self.allowed.contains(name)
    }

    /// Indices of the product's translatable attributes, in attribute order
    pub fn select(&self, product: &Product) -> Vec<usize> {
        product
            .attributes
            .iter()
            .enumerate()
            .filter(|(_, attr)| self.is_translatable(&attr.name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Split an attribute value into independently translated parts
    pub fn parts<'a>(&self, product: &Product, attribute: &'a Attribute) -> FieldParts<'a> {
        let text = attribute.value.as_str();
        if product.is_parent || attribute.name != self.title_attribute {
            return FieldParts {
                head: text,
                size: None,
            };
        }
        match text.rfind('-') {
            Some(idx) if idx + 1 < text.len() => FieldParts {
                head: &text[..idx],
                size: Some(&text[idx + 1..]),
            },
            _ => FieldParts {
                head: text,
                size: None,
            },
        }
    }
}

impl Default for FieldSelector {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSLATABLE_ATTRIBUTES.iter().copied())
    }
}
