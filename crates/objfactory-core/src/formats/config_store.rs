//! # Config Store
//!
//! A [`SpecificationStore`] read from a TOML document.
//!
//! Every top-level table is one specification, named `key` or `key:identifier`:
//!
//! ```toml
//! ["geometry.Point:origin"]
//! type = "geometry.Point"
//! params = [ { type = "int", value = 0 }, { type = "int", value = 0 } ]
//!
//! ["geometry.Segment"]
//! type = "geometry.Segment"
//! params = [ { name = "geometry.Point:origin" }, { name = "geometry.Point:origin" } ]
//!
//! [grid]
//! array_type = "int"
//! dimension = 2
//! values = "{{1, 2}, {3, 4}}"
//! ```
//!
//! References are resolved when the document is loaded, so lookups never
//! fail halfway through a graph. The loaded specifications share structure:
//! a table referenced twice appears as the same `Arc` in both places.

use super::array_literal::{self, Literal};
use crate::primitives::{CHAR, ID_DELIMITER, NULL_ITEM, STRING_FULL, is_simple_type, is_string_type};
use crate::specification::{BuildSpecification, Parameter, SpecKind, shape_of};
use crate::store::{LookupError, SpecificationStore, StoreError, reference_name};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// RAW LAYOUT
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    #[serde(rename = "type")]
    type_name: Option<String>,
    location: Option<String>,
    params: Option<Vec<RawParam>>,
    array_type: Option<String>,
    dimension: Option<i64>,
    values: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParam {
    #[serde(rename = "type")]
    type_name: Option<String>,
    value: Option<RawScalar>,
    name: Option<String>,
}

/// A parameter value as TOML allows it to be written.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(i) => i.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

// =============================================================================
// DRAFTS (UNRESOLVED)
// =============================================================================

type EntryName = (String, Option<String>);

/// A parameter whose references are not resolved yet.
#[derive(Debug)]
enum DraftParam {
    Spec(BuildSpecification),
    Reference(String),
    Row(Vec<DraftParam>),
}

#[derive(Debug)]
struct Draft {
    kind: SpecKind,
    type_name: String,
    location: Option<String>,
    dimension: usize,
    identifier: Option<String>,
    params: Vec<DraftParam>,
}

// =============================================================================
// CONFIG STORE
// =============================================================================

/// Specifications loaded from a TOML document.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    specs: BTreeMap<EntryName, Arc<BuildSpecification>>,
}

impl ConfigStore {
    /// Load a store from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let store = Self::from_toml_str(&text).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "rejected specification file");
        })?;
        tracing::debug!(path = %path.display(), specifications = store.len(), "loaded specification file");
        Ok(store)
    }

    /// Load a store from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, StoreError> {
        let raw: BTreeMap<String, RawEntry> =
            toml::from_str(text).map_err(|e| StoreError::Configuration(e.to_string()))?;

        let mut drafts = BTreeMap::new();
        for (name, entry) in raw {
            let entry_name = split_name(&name)?;
            let draft = draft_entry(&name, entry_name.1.clone(), entry)?;
            drafts.insert(entry_name, draft);
        }

        let mut resolver = Resolver {
            drafts: &drafts,
            visiting: BTreeSet::new(),
            resolved: BTreeMap::new(),
        };
        for name in drafts.keys() {
            resolver.resolve(name)?;
        }

        Ok(Self {
            specs: resolver.resolved,
        })
    }

    /// Number of loaded specifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Loaded (key, identifier) pairs in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.specs
            .keys()
            .map(|(key, id)| (key.as_str(), id.as_deref()))
    }
}

impl SpecificationStore for ConfigStore {
    fn get(
        &self,
        key: &str,
        identifier: Option<&str>,
    ) -> Result<Arc<BuildSpecification>, LookupError> {
        self.specs
            .get(&(key.to_string(), identifier.map(str::to_string)))
            .cloned()
            .ok_or_else(|| LookupError::unknown(key, identifier))
    }
}

/// Split `key:identifier` at the first delimiter.
fn split_name(name: &str) -> Result<EntryName, StoreError> {
    let (key, identifier) = match name.split_once(ID_DELIMITER) {
        Some((key, id)) => (key, Some(id)),
        None => (name, None),
    };
    if key.trim().is_empty() || identifier.is_some_and(|id| id.trim().is_empty()) {
        return Err(StoreError::Configuration(format!(
            "'{name}' is not a valid specification name"
        )));
    }
    Ok((key.to_string(), identifier.map(str::to_string)))
}

// =============================================================================
// DRAFTING
// =============================================================================

fn draft_entry(
    name: &str,
    identifier: Option<String>,
    entry: RawEntry,
) -> Result<Draft, StoreError> {
    match entry {
        RawEntry {
            type_name: Some(type_name),
            location,
            params,
            array_type: None,
            dimension: None,
            values: None,
        } => {
            let params = params
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(i, p)| draft_param(name, i, p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Draft {
                kind: SpecKind::Complex,
                type_name,
                location,
                dimension: 1,
                identifier,
                params,
            })
        }
        RawEntry {
            type_name: None,
            location,
            params: None,
            array_type: Some(array_type),
            dimension: Some(dimension),
            values: Some(values),
        } => draft_array(name, identifier, location, &array_type, dimension, &values),
        _ => Err(StoreError::Configuration(format!(
            "some properties are missing or invalid for '{name}', the specification kind can not be recognized"
        ))),
    }
}

fn draft_param(name: &str, index: usize, param: RawParam) -> Result<DraftParam, StoreError> {
    match param {
        RawParam {
            type_name: None,
            value: None,
            name: Some(reference),
        } => Ok(DraftParam::Reference(reference)),
        RawParam {
            type_name: Some(type_name),
            value,
            name: None,
        } => Ok(DraftParam::Spec(match value {
            // string values are kept verbatim, so they must be written as TOML strings
            Some(value) if is_string_type(&type_name) && !matches!(value, RawScalar::Text(_)) => {
                return Err(StoreError::Configuration(format!(
                    "parameter {} of '{name}' is a string and needs a quoted value",
                    index + 1
                )));
            }
            Some(value) => BuildSpecification::simple(type_name, value.into_text()),
            None => BuildSpecification::null(type_name),
        })),
        _ => Err(StoreError::Configuration(format!(
            "parameter {} of '{name}' must have either a name or a type",
            index + 1
        ))),
    }
}

fn draft_array(
    name: &str,
    identifier: Option<String>,
    location: Option<String>,
    array_type: &str,
    dimension: i64,
    values: &str,
) -> Result<Draft, StoreError> {
    let dimension = usize::try_from(dimension)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| {
            StoreError::Configuration(format!("'{name}' has an invalid dimension {dimension}"))
        })?;

    let literal = array_literal::parse(values)?;
    if !literal.is_empty_row() && literal.depth() != dimension {
        return Err(StoreError::Configuration(format!(
            "'{name}' declares dimension {dimension} but its values nest {} deep",
            literal.depth()
        )));
    }

    let element = if is_string_type(array_type) {
        STRING_FULL
    } else {
        array_type
    };
    let params = match literal {
        Literal::Row(children) => children
            .into_iter()
            .map(|child| draft_item(name, element, child))
            .collect::<Result<Vec<_>, _>>()?,
        Literal::Item(_) => Vec::new(),
    };

    Ok(Draft {
        kind: SpecKind::Array,
        type_name: element.to_string(),
        location,
        dimension,
        identifier,
        params,
    })
}

/// Turn one literal node into a parameter of an array of `element`.
fn draft_item(name: &str, element: &str, node: Literal) -> Result<DraftParam, StoreError> {
    let item = match node {
        Literal::Row(children) => {
            return children
                .into_iter()
                .map(|child| draft_item(name, element, child))
                .collect::<Result<Vec<_>, _>>()
                .map(DraftParam::Row);
        }
        Literal::Item(item) => item,
    };

    let simple = is_simple_type(element);
    let textual = is_string_type(element) || element == CHAR;

    if item == NULL_ITEM {
        if simple && !is_string_type(element) {
            return Err(StoreError::Configuration(format!(
                "'{name}' puts null into an array of {element}"
            )));
        }
        return Ok(DraftParam::Spec(BuildSpecification::null(element)));
    }

    if !simple || (textual && !array_literal::is_quoted(&item)) {
        return Ok(DraftParam::Reference(item));
    }

    let text = if textual {
        array_literal::unquote(&item)
    } else {
        &item
    };
    Ok(DraftParam::Spec(BuildSpecification::simple(element, text)))
}

// =============================================================================
// RESOLUTION
// =============================================================================

struct Resolver<'a> {
    drafts: &'a BTreeMap<EntryName, Draft>,
    visiting: BTreeSet<EntryName>,
    resolved: BTreeMap<EntryName, Arc<BuildSpecification>>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &EntryName) -> Result<Arc<BuildSpecification>, StoreError> {
        if let Some(spec) = self.resolved.get(name) {
            return Ok(Arc::clone(spec));
        }
        let display = reference_name(&name.0, name.1.as_deref());
        if self.visiting.contains(name) {
            return Err(StoreError::IllegalReference(format!(
                "the specifications contain a loop through '{display}'"
            )));
        }
        let draft = self.drafts.get(name).ok_or_else(|| {
            StoreError::IllegalReference(format!("the name '{display}' can not be resolved"))
        })?;

        self.visiting.insert(name.clone());
        let params = self.resolve_params(&draft.params)?;
        self.visiting.remove(name);

        let mut spec = match draft.kind {
            SpecKind::Array => {
                shape_of(&params).map_err(|_| {
                    StoreError::Configuration(format!("the array '{display}' is not valid"))
                })?;
                BuildSpecification::array(draft.type_name.clone(), draft.dimension, params)
            }
            _ => BuildSpecification::complex(draft.type_name.clone(), params),
        };
        if let Some(location) = &draft.location {
            spec = spec.with_code_location(location.clone());
        }
        if let Some(identifier) = &draft.identifier {
            spec = spec.with_identifier(identifier.clone());
        }

        let spec = Arc::new(spec);
        self.resolved.insert(name.clone(), Arc::clone(&spec));
        Ok(spec)
    }

    fn resolve_params(&mut self, params: &[DraftParam]) -> Result<Vec<Parameter>, StoreError> {
        params
            .iter()
            .map(|param| match param {
                DraftParam::Spec(spec) => Ok(Parameter::spec(spec.clone())),
                DraftParam::Row(children) => self.resolve_params(children).map(Parameter::Nested),
                DraftParam::Reference(reference) => {
                    let name = split_name(reference).map_err(|_| {
                        StoreError::IllegalReference(format!(
                            "the name '{reference}' can not be resolved"
                        ))
                    })?;
                    self.resolve(&name).map(Parameter::Spec)
                }
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
