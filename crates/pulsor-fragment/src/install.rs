//! Registering the loaders as pulsers.
//!
//! Both pulsers are async, take the name as their first argument and resolve
//! to the markup as a string, or `null` when there is nothing usable. They
//! never fail: problems are logged and turn into `null`.

use crate::extract::{extract_fragment, extract_template, is_full_document, template_file_name};
use crate::source::{validate_name, FragmentSource};
use pulsor_core::{BoxError, PulseFn, Pulser, PulserOptions, PulsorError, Registry};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Alias of the fragment loader.
pub const FETCH_FRAGMENT: &str = "fetch:fragment";

/// Alias of the template loader.
pub const FETCH_TEMPLATE: &str = "fetch:template";

#[derive(Debug, Clone, Copy)]
enum Kind {
    Fragment,
    Template,
}

/// Register the `fetch:fragment` pulser.
///
/// Fragment `name` is read from `<name>.html`.
///
/// # Errors
///
/// Returns an error if the alias is already registered.
pub fn install_fetch_fragment(
    registry: &Registry,
    source: Arc<dyn FragmentSource>,
) -> Result<Pulser, PulsorError> {
    install(registry, source, Kind::Fragment)
}

/// Register the `fetch:template` pulser.
///
/// Template `name` is read from `template.<name>.html`.
///
/// # Errors
///
/// Returns an error if the alias is already registered.
pub fn install_fetch_template(
    registry: &Registry,
    source: Arc<dyn FragmentSource>,
) -> Result<Pulser, PulsorError> {
    install(registry, source, Kind::Template)
}

fn install(
    registry: &Registry,
    source: Arc<dyn FragmentSource>,
    kind: Kind,
) -> Result<Pulser, PulsorError> {
    let (alias, fn_name) = match kind {
        Kind::Fragment => (FETCH_FRAGMENT, "fetch_fragment"),
        Kind::Template => (FETCH_TEMPLATE, "fetch_template"),
    };

    let function = PulseFn::from_async(move |args: Vec<Value>| {
        let source = Arc::clone(&source);
        async move { Ok::<_, BoxError>(load(source.as_ref(), kind, &args).await) }
    })
    .named(fn_name);

    let pulser = registry.create_pulser(alias, Some(function), PulserOptions::new())?;
    debug!(alias = %alias, "Installed loader");
    Ok(pulser)
}

async fn load(source: &dyn FragmentSource, kind: Kind, args: &[Value]) -> Value {
    let Some(name) = args.first().and_then(Value::as_str) else {
        warn!(kind = ?kind, "Loader called without a name");
        return Value::Null;
    };

    if let Err(e) = validate_name(name) {
        error!(kind = ?kind, name = %name, error = %e, "Rejected name");
        return Value::Null;
    }

    let file = match kind {
        Kind::Fragment => format!("{name}.html"),
        Kind::Template => template_file_name(name),
    };

    let text = match source.fetch(&file).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!(kind = ?kind, file = %file, source = source.name(), "Not found");
            return Value::Null;
        }
        Err(e) => {
            error!(kind = ?kind, file = %file, error = %e, "Error fetching");
            return Value::Null;
        }
    };

    let extracted = match kind {
        Kind::Fragment => {
            if is_full_document(&text) {
                warn!(file = %file, "Fragment not found or returned a full HTML document");
            }
            extract_fragment(&text)
        }
        Kind::Template => {
            let body = extract_template(&text);
            if body.is_none() {
                warn!(file = %file, "Template not found or returned empty content");
            }
            body
        }
    };

    extracted
        .map(|markup| Value::String(markup.to_string()))
        .unwrap_or(Value::Null)
}
