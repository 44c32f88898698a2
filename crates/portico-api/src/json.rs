//! Reference-cycle-aware JSON serialization policy.
//!
//! Service-layer object graphs participate through [`Shared`], an
//! `Arc`-backed handle whose `Serialize` impl consults the policy active on
//! the current thread. While a [`JsonPolicy::render`] call is in progress, a
//! back-reference to a node already on the serialization stack is emitted as
//! `null` (or fails the render, depending on the configured handling).
//! Re-visits that are not cycles — the same node reachable along two
//! branches — serialize normally.

use std::cell::RefCell;
use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// How back-references discovered during a render are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceHandling {
    /// Fail the render when a cycle is found.
    Fail,
    /// Emit `null` for the cyclic back-reference and keep going.
    IgnoreCycles,
}

/// JSON rendering policy applied to service-layer responses.
#[derive(Debug, Clone, Copy)]
pub struct JsonPolicy {
    handling: ReferenceHandling,
}

/// Errors raised while rendering a value through the policy.
#[derive(Debug, Error)]
pub enum JsonPolicyError {
    /// Serialisation failed; cycle faults under
    /// [`ReferenceHandling::Fail`] surface here.
    #[error("json render failed")]
    Render {
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

impl JsonPolicy {
    /// Build a policy with the supplied reference handling.
    #[must_use]
    pub const fn new(handling: ReferenceHandling) -> Self {
        Self { handling }
    }

    /// Policy that omits cyclic back-references instead of failing.
    #[must_use]
    pub const fn ignore_cycles() -> Self {
        Self::new(ReferenceHandling::IgnoreCycles)
    }

    /// The configured reference handling.
    #[must_use]
    pub const fn reference_handling(&self) -> ReferenceHandling {
        self.handling
    }

    /// Render a value to a JSON tree with cycle tracking active.
    ///
    /// The render is synchronous; the tracking context lives on the current
    /// thread for exactly the duration of this call.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation fails, including cycle faults
    /// under [`ReferenceHandling::Fail`].
    pub fn render<T: Serialize>(&self, value: &T) -> Result<Value, JsonPolicyError> {
        let _guard = ContextGuard::install(self.handling);
        serde_json::to_value(value).map_err(|source| JsonPolicyError::Render { source })
    }
}

/// `Arc`-backed handle participating in cycle tracking.
///
/// Outside a [`JsonPolicy::render`] call the handle serializes transparently
/// as its contents; cyclic graphs must therefore always be rendered through
/// a policy.
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<T>);

impl<T> Shared<T> {
    /// Allocate a new shared node.
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> From<Arc<T>> for Shared<T> {
    fn from(value: Arc<T>) -> Self {
        Self(value)
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Serialize> Serialize for Shared<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = Arc::as_ptr(&self.0) as usize;
        match enter(key) {
            Visit::Untracked => (*self.0).serialize(serializer),
            Visit::Cycle(ReferenceHandling::IgnoreCycles) => serializer.serialize_none(),
            Visit::Cycle(ReferenceHandling::Fail) => Err(S::Error::custom(
                "reference cycle detected in object graph",
            )),
            Visit::Entered => {
                let result = (*self.0).serialize(serializer);
                leave(key);
                result
            }
        }
    }
}

enum Visit {
    /// No render in progress on this thread.
    Untracked,
    /// Node pushed onto the active serialization stack.
    Entered,
    /// Node is already an ancestor on the stack.
    Cycle(ReferenceHandling),
}

struct RenderContext {
    handling: ReferenceHandling,
    active: HashSet<usize>,
}

thread_local! {
    static RENDER_CONTEXT: RefCell<Option<RenderContext>> = const { RefCell::new(None) };
}

fn enter(key: usize) -> Visit {
    RENDER_CONTEXT.with(|cell| {
        let mut slot = cell.borrow_mut();
        match slot.as_mut() {
            None => Visit::Untracked,
            Some(context) => {
                if context.active.insert(key) {
                    Visit::Entered
                } else {
                    Visit::Cycle(context.handling)
                }
            }
        }
    })
}

fn leave(key: usize) {
    RENDER_CONTEXT.with(|cell| {
        if let Some(context) = cell.borrow_mut().as_mut() {
            context.active.remove(&key);
        }
    });
}

/// Installs the tracking context and restores the previous one on drop so
/// nested renders on the same thread stay isolated.
struct ContextGuard {
    previous: Option<RenderContext>,
}

impl ContextGuard {
    fn install(handling: ReferenceHandling) -> Self {
        let previous = RENDER_CONTEXT.with(|cell| {
            cell.borrow_mut().replace(RenderContext {
                handling,
                active: HashSet::new(),
            })
        });
        Self { previous }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        RENDER_CONTEXT.with(|cell| {
            *cell.borrow_mut() = self.previous.take();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Serialize)]
    struct Node {
        name: &'static str,
        next: RefCell<Option<Shared<Node>>>,
    }

    fn node(name: &'static str) -> Shared<Node> {
        Shared::new(Node {
            name,
            next: RefCell::new(None),
        })
    }

    #[test]
    fn cyclic_back_reference_renders_as_null() -> Result<(), JsonPolicyError> {
        let a = node("a");
        let b = node("b");
        *b.next.borrow_mut() = Some(a.clone());
        *a.next.borrow_mut() = Some(b.clone());

        let policy = JsonPolicy::ignore_cycles();
        let value = policy.render(&b)?;
        assert_eq!(
            value,
            json!({"name": "b", "next": {"name": "a", "next": null}})
        );
        Ok(())
    }

    #[test]
    fn fail_handling_rejects_cycles() {
        let a = node("a");
        *a.next.borrow_mut() = Some(a.clone());

        let policy = JsonPolicy::new(ReferenceHandling::Fail);
        let result = policy.render(&a);
        assert!(matches!(result, Err(JsonPolicyError::Render { .. })));
    }

    #[test]
    fn diamond_reuse_is_not_a_cycle() -> Result<(), JsonPolicyError> {
        let tail = node("tail");

        #[derive(Serialize)]
        struct Fork {
            left: Shared<Node>,
            right: Shared<Node>,
        }

        let fork = Fork {
            left: tail.clone(),
            right: tail,
        };
        let value = JsonPolicy::ignore_cycles().render(&fork)?;
        assert_eq!(value["left"]["name"], "tail");
        assert_eq!(value["right"]["name"], "tail");
        Ok(())
    }

    #[test]
    fn acyclic_values_render_unchanged() -> Result<(), JsonPolicyError> {
        let policy = JsonPolicy::ignore_cycles();
        let value = policy.render(&vec![1, 2, 3])?;
        assert_eq!(value, json!([1, 2, 3]));
        assert_eq!(
            policy.reference_handling(),
            ReferenceHandling::IgnoreCycles
        );
        Ok(())
    }

    #[test]
    fn tracking_context_clears_after_render() -> Result<(), JsonPolicyError> {
        let a = node("a");
        *a.next.borrow_mut() = Some(a.clone());

        let policy = JsonPolicy::ignore_cycles();
        let first = policy.render(&a)?;
        let second = policy.render(&a)?;
        assert_eq!(first, second);
        Ok(())
    }
}
