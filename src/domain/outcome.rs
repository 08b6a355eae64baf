//! Success/failure hooks around a single mutation.

pub trait Outcome {
    fn succeeded(&self) -> bool;
}

impl<T, E> Outcome for Result<T, E> {
    fn succeeded(&self) -> bool {
        self.is_ok()
    }
}

type StartHook<'a, R> = Box<dyn FnOnce() -> R + 'a>;
type EndHook<'a, R> = Box<dyn FnOnce(R) + 'a>;
type ResultHook<'a, O> = Box<dyn FnOnce(&O) + 'a>;

/// Hooks run around one action.
///
/// `run` calls the action exactly once. The start hook runs before it and the
/// end hook (given the start hook's value) after it; then exactly one of the
/// success and error hooks sees the outcome. The outcome is returned as is and
/// panics inside the action are not caught.
pub struct ActionHooks<'a, O, R = ()> {
    on_start: Option<StartHook<'a, R>>,
    on_end: Option<EndHook<'a, R>>,
    on_success: Option<ResultHook<'a, O>>,
    on_error: Option<ResultHook<'a, O>>,
}

impl<'a, O: Outcome> ActionHooks<'a, O, ()> {
    pub fn new() -> Self {
        Self {
            on_start: None,
            on_end: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<'a, O: Outcome> Default for ActionHooks<'a, O, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, O: Outcome, R> ActionHooks<'a, O, R> {
    pub fn bracket<S>(
        self,
        on_start: impl FnOnce() -> S + 'a,
        on_end: impl FnOnce(S) + 'a,
    ) -> ActionHooks<'a, O, S> {
        ActionHooks {
            on_start: Some(Box::new(on_start)),
            on_end: Some(Box::new(on_end)),
            on_success: self.on_success,
            on_error: self.on_error,
        }
    }

    pub fn on_success(mut self, hook: impl FnOnce(&O) + 'a) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl FnOnce(&O) + 'a) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn run(self, action: impl FnOnce() -> O) -> O {
        let reference = self.on_start.map(|start| start());
        let outcome = action();

        if let (Some(reference), Some(end)) = (reference, self.on_end) {
            end(reference);
        }

        let hook = if outcome.succeeded() {
            self.on_success
        } else {
            self.on_error
        };
        if let Some(hook) = hook {
            hook(&outcome);
        }

        outcome
    }
}
