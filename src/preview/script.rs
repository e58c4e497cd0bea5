//! Evaluates a compiled component in the embedded script engine and returns
//! its rendered element tree.

use super::element::ElementNode;
use super::scope::{AmbientRegistry, RUNTIME_PRELUDE};
use boa_engine::{Context, Source};
use thiserror::Error;

const MISSING_COMPONENT_SENTINEL: &str = "__nexus_missing_component";
const LOOP_ITERATION_LIMIT: u64 = 1_000_000;
const RECURSION_LIMIT: usize = 512;

#[derive(Debug, Error)]
pub enum MountError {
    /// The unit threw or failed to parse while running.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
    /// Neither `App` nor `Component` is a function after evaluation.
    #[error("no `App` or `Component` function is defined")]
    MissingComponent,
    /// The engine produced something that is not an element tree.
    #[error("invalid element tree: {0}")]
    InvalidTree(String),
}

/// Wraps `compiled` in a factory whose only parameter is the ambient scope.
pub fn build_script(compiled: &str, registry: &AmbientRegistry) -> String {
    format!(
        r#"{prelude}
var __scope = {scope};
var __factory = function (scope) {{
  {locals}
  {{
{compiled}
    return typeof App !== 'undefined' ? App : (typeof Component !== 'undefined' ? Component : null);
  }}
}};
var __root = __factory(__scope);
if (typeof __root !== 'function') {{
  throw new Error("{sentinel}");
}}
JSON.stringify(__nexus.render(__root));
"#,
        prelude = RUNTIME_PRELUDE,
        scope = registry.scope_literal(),
        locals = registry.destructuring("scope"),
        compiled = compiled,
        sentinel = MISSING_COMPONENT_SENTINEL,
    )
}

/// Runs `compiled` against `registry` and renders the resolved component.
pub fn evaluate_component(
    compiled: &str,
    registry: &AmbientRegistry,
) -> Result<ElementNode, MountError> {
    let script = build_script(compiled, registry);

    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(LOOP_ITERATION_LIMIT);
    context.runtime_limits_mut().set_recursion_limit(RECURSION_LIMIT);

    let value = context
        .eval(Source::from_bytes(&script))
        .map_err(|e| classify_js_error(e.to_string()))?;
    let json = value
        .to_string(&mut context)
        .map(|s| s.to_std_string_escaped())
        .map_err(|e| MountError::Evaluation(e.to_string()))?;

    serde_json::from_str(&json).map_err(|e| MountError::InvalidTree(e.to_string()))
}

fn classify_js_error(message: String) -> MountError {
    if message.contains(MISSING_COMPONENT_SENTINEL) {
        MountError::MissingComponent
    } else {
        MountError::Evaluation(message)
    }
}
