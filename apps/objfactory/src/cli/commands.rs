//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::CliError;
use crate::render::{spec_to_json, value_to_json, value_to_text};
use objfactory_core::{
    ClassDef, ConfigStore, ConstructionError, FactoryError, ObjectFactory, SimpleValueParser,
    SpecificationStore, Strategy, TypeDescriptor, TypeResolver, Value,
    primitives::{ID_DELIMITER, NULL_ITEM, is_simple_type},
    store::reference_name,
};
use std::io::Write;
use std::sync::Arc;

fn print_json(out: &mut dyn Write, output: &serde_json::Value) -> Result<(), CliError> {
    writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(output).unwrap_or_default()
    )?;
    Ok(())
}

fn split_reference(text: &str) -> (&str, Option<&str>) {
    match text.split_once(ID_DELIMITER) {
        Some((key, id)) => (key, Some(id)),
        None => (text, None),
    }
}

// =============================================================================
// CREATE COMMAND
// =============================================================================

/// Arguments of `create`.
#[derive(Debug, Clone, Copy)]
pub struct CreateRequest<'a> {
    pub key: &'a str,
    pub id: Option<&'a str>,
    pub args: &'a [String],
    pub typed: bool,
    pub location: Option<&'a str>,
}

/// Parse one `TYPE=VALUE` initializer argument.
///
/// Simple types parse VALUE as a literal. For any other type VALUE is either
/// `null` or a stored reference (`key` or `key:id`) built with the factory's
/// current strategy.
pub fn parse_arg<S: SpecificationStore>(
    factory: &ObjectFactory<S>,
    raw: &str,
) -> Result<(Value, TypeDescriptor), CliError> {
    let (type_name, text) = raw
        .split_once('=')
        .ok_or_else(|| CliError::Usage(format!("'{raw}' is not TYPE=VALUE")))?;
    let type_name = type_name.trim();

    let ty = TypeResolver::new(Arc::clone(factory.registry()))
        .resolve(type_name, None)
        .map_err(FactoryError::from)?;

    let value = if is_simple_type(type_name) {
        SimpleValueParser::parse(type_name, text).map_err(FactoryError::from)?
    } else if text == NULL_ITEM {
        Value::Null
    } else {
        let (key, id) = split_reference(text);
        factory.create_full(key, id, None, None, None, factory.strategy())?
    };
    Ok((value, ty))
}

/// Build an object and print it.
pub fn cmd_create<S: SpecificationStore>(
    factory: &ObjectFactory<S>,
    out: &mut dyn Write,
    json_mode: bool,
    request: &CreateRequest<'_>,
) -> Result<(), CliError> {
    let mut values = Vec::with_capacity(request.args.len());
    let mut types = Vec::with_capacity(request.args.len());
    for raw in request.args {
        let (value, ty) = parse_arg(factory, raw)?;
        values.push(value);
        types.push(ty);
    }
    let (args, arg_types) = if values.is_empty() {
        (None, None)
    } else {
        (Some(values.as_slice()), Some(types.as_slice()))
    };

    let strategy = factory.strategy();
    let value = if request.typed {
        let context = request
            .location
            .map(|location| factory.bundles().load(location, factory.registry()))
            .transpose()
            .map_err(FactoryError::from)?;
        let ty = TypeResolver::new(Arc::clone(factory.registry()))
            .resolve(request.key, context.as_ref())
            .map_err(FactoryError::from)?;
        factory.create_type_full_at(&ty, request.id, request.location, args, arg_types, strategy)?
    } else {
        factory.create_full_at(
            request.key,
            request.id,
            request.location,
            args,
            arg_types,
            strategy,
        )?
    };

    tracing::debug!(key = request.key, %strategy, "object created");

    if json_mode {
        let output = serde_json::json!({
            "key": request.key,
            "identifier": request.id,
            "strategy": strategy,
            "type": value.runtime_type().name(),
            "value": value_to_json(&value),
        });
        return print_json(out, &output);
    }

    writeln!(out, "{}", value_to_text(&value))?;
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Print the specification stored under a key.
pub fn cmd_show<S: SpecificationStore>(
    factory: &ObjectFactory<S>,
    out: &mut dyn Write,
    json_mode: bool,
    key: &str,
    id: Option<&str>,
) -> Result<(), CliError> {
    let spec = factory
        .store()
        .get(key, id)
        .map_err(|e| FactoryError::from(ConstructionError::Lookup(e)))?;
    let rendered = spec_to_json(&spec);

    if !json_mode {
        writeln!(
            out,
            "{} ({} {})",
            reference_name(key, id),
            spec.kind(),
            spec.type_name()
        )?;
    }
    print_json(out, &rendered)
}

// =============================================================================
// KEYS COMMAND
// =============================================================================

/// List the stored specifications.
pub fn cmd_keys(
    factory: &ObjectFactory<ConfigStore>,
    out: &mut dyn Write,
    json_mode: bool,
) -> Result<(), CliError> {
    let store = factory.store();

    if json_mode {
        let keys: Vec<_> = store
            .keys()
            .map(|(key, id)| serde_json::json!({ "key": key, "identifier": id }))
            .collect();
        return print_json(out, &serde_json::json!({ "count": keys.len(), "keys": keys }));
    }

    if store.is_empty() {
        writeln!(out, "No specifications loaded.")?;
        return Ok(());
    }
    for (key, id) in store.keys() {
        writeln!(out, "{}", reference_name(key, id))?;
    }
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Build every stored specification. Fails if any of them does not build.
pub fn cmd_check(
    factory: &ObjectFactory<ConfigStore>,
    out: &mut dyn Write,
    json_mode: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let mut checked = 0usize;
    let mut failures = Vec::new();

    for (key, id) in factory.store().keys() {
        checked += 1;
        let name = reference_name(key, id);
        match factory.create_full(key, id, None, None, None, Strategy::SpecificationOnly) {
            Ok(_) => {
                if !json_mode && !quiet {
                    writeln!(out, "ok      {name}")?;
                }
            }
            Err(e) => {
                tracing::warn!(specification = %name, error = %e, "specification does not build");
                if !json_mode {
                    writeln!(out, "FAILED  {name}: {e}")?;
                }
                failures.push((name, e.to_string()));
            }
        }
    }

    if json_mode {
        let failed: Vec<_> = failures
            .iter()
            .map(|(name, error)| serde_json::json!({ "specification": name, "error": error }))
            .collect();
        print_json(
            out,
            &serde_json::json!({ "checked": checked, "failed": failed }),
        )?;
    } else if !quiet {
        writeln!(out)?;
        writeln!(out, "{} checked, {} failed", checked, failures.len())?;
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::CheckFailed(failures.len()))
    }
}

// =============================================================================
// TYPES COMMAND
// =============================================================================

fn signatures(class: &ClassDef) -> Vec<Vec<String>> {
    class
        .initializers()
        .iter()
        .map(|init| init.params().iter().map(TypeDescriptor::name).collect())
        .collect()
}

/// List the registered classes and the code bundles.
pub fn cmd_types<S: SpecificationStore>(
    factory: &ObjectFactory<S>,
    out: &mut dyn Write,
    json_mode: bool,
) -> Result<(), CliError> {
    let registry = factory.registry();
    let classes: Vec<Arc<ClassDef>> = registry
        .class_names()
        .filter_map(|name| registry.class(name))
        .collect();

    let mut bundles = Vec::new();
    for location in factory.bundles().locations() {
        let context = factory
            .bundles()
            .load(location, registry)
            .map_err(FactoryError::from)?;
        let names: Vec<String> = context
            .registry()
            .class_names()
            .map(str::to_string)
            .collect();
        bundles.push((location.to_string(), names));
    }

    if json_mode {
        let classes: Vec<_> = classes
            .iter()
            .map(|c| serde_json::json!({ "name": c.name(), "initializers": signatures(c) }))
            .collect();
        let bundles: Vec<_> = bundles
            .iter()
            .map(|(location, names)| serde_json::json!({ "location": location, "classes": names }))
            .collect();
        return print_json(
            out,
            &serde_json::json!({ "classes": classes, "bundles": bundles }),
        );
    }

    writeln!(out, "Classes")?;
    writeln!(out, "=======")?;
    for class in &classes {
        for params in signatures(class) {
            writeln!(out, "{}({})", class.name(), params.join(", "))?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Bundles")?;
    writeln!(out, "=======")?;
    for (location, names) in &bundles {
        writeln!(out, "{}: {}", location, names.join(", "))?;
    }
    Ok(())
}
