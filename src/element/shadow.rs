//! Content root resolution for light and isolated rendering.

use tracing::warn;

use crate::dom::{Document, NodeId, ShadowError};

use super::component::RenderMode;

/// Where an element renders, and whether that place is a shadow root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRoot {
    pub node: NodeId,
    pub isolated: bool,
}

/// Resolve the content root for `host`.
///
/// Isolated mode attaches a shadow root (or reuses one already attached).
/// When the environment cannot provide one the host itself is used and a
/// warning is logged; rendering still works, only scoping is lost.
pub fn resolve(document: &Document, host: NodeId, mode: RenderMode, type_name: &str) -> ContentRoot {
    let light = ContentRoot {
        node: host,
        isolated: false,
    };
    if mode == RenderMode::Light {
        return light;
    }

    match document.attach_shadow(host) {
        Ok(node) => ContentRoot {
            node,
            isolated: true,
        },
        Err(ShadowError::AlreadyAttached) => match document.shadow_root(host) {
            Some(node) => ContentRoot {
                node,
                isolated: true,
            },
            None => light,
        },
        Err(err) => {
            warn!(component = type_name, %err, "shadow root unavailable, rendering into host");
            light
        }
    }
}
