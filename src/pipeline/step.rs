use crate::result::Result;
use smol_str::SmolStr;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Future returned by a step action, borrowing the run context.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a>>;

type Action<'a, C> = Box<dyn FnOnce(&'a C) -> StepFuture<'a> + 'a>;

/** A named unit of pipeline work
 *
 * The action is a plain closure receiving the run context; whatever it
 * returns as `Err` counts as the step failing.
 *
 * Actions must report failure by returning `Err`, never by panicking: a
 * panic is not caught by the runner, and release builds abort on panic, so
 * the run would end without an ERROR entry or exit code 1.
 *
 * # Example
 * ```ignore
 * let step = Step::new("verify output", |ctx| Box::pin(verify_output(ctx)));
 * ```
 */
pub struct Step<'a, C: 'a> {
    name: SmolStr,
    action: Action<'a, C>,
}

impl<'a, C: 'a> Step<'a, C> {
    pub fn new<F>(name: impl Into<SmolStr>, action: F) -> Self
    where
        F: FnOnce(&'a C) -> StepFuture<'a> + 'a,
    {
        let name = name.into();
        debug_assert!(!name.is_empty(), "step name must not be empty");

        Self {
            name,
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    pub(crate) fn run(self, ctx: &'a C) -> StepFuture<'a> {
        (self.action)(ctx)
    }
}

impl<'a, C: 'a> fmt::Debug for Step<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}
