//! albstack-synth — render a topology for the provisioning engine.
//!
//! The builder in `albstack-core` produces a plain description. This crate
//! plays the provider SDK's part at synth time:
//!
//! ```text
//! Topology ── validate() ──▶ render() ──▶ Template ──▶ JSON + SHA-256
//! ```
//!
//! Nothing here talks to a cloud API. Diffing, applying and rolling back
//! are the engine's job once it receives the template.

pub mod error;
pub mod template;
pub mod validate;

pub use error::{SynthError, SynthResult, Violation};
pub use template::{render, Output, Parameter, Resource, Template};
pub use validate::validate;

use tracing::{debug, warn};

use albstack_core::Topology;

/// Validate `topology` and render it.
pub fn synthesize(topology: &Topology) -> SynthResult<Template> {
    validate(topology)?;

    for stmt in &topology.identity.statements {
        if stmt.is_over_broad() {
            warn!(
                role = %topology.identity.name,
                actions = ?stmt.actions,
                resources = ?stmt.resources,
                "execution role grants wildcard permissions"
            );
        }
    }

    let template = render(topology);
    debug!(
        stack = %topology.request.stack_name,
        resources = template.resources.len(),
        "template synthesized"
    );
    Ok(template)
}
