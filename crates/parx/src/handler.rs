use eyre::EyreHandler;
use itertools::Itertools;
use parx_config::{Config, ExtractConfigError};
use parx_deploy::{BatchError, CycleError, StepError, error::dedup_chain};
use std::{error::Error, fmt};

/// The `eyre` handler of the parx binary.
///
/// Prints the deduplicated error chain, followed by a hint when the error is one the user can
/// act on, e.g. a deployment that halted and can be resumed.
pub struct Handler {
    debug_handler: Option<Box<dyn EyreHandler>>,
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler {
    pub fn new() -> Self {
        Self { debug_handler: None }
    }

    /// Delegates `Debug` output to `debug_handler`, if any.
    pub fn debug_handler(mut self, debug_handler: Option<Box<dyn EyreHandler>>) -> Self {
        self.debug_handler = debug_handler;
        self
    }
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Display;
        dedup_chain(error).into_iter().format("; ").fmt(f)
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(debug_handler) = &self.debug_handler {
            return debug_handler.debug(error, f);
        }

        if f.alternate() {
            return fmt::Debug::fmt(error, f);
        }

        let errors = dedup_chain(error);
        let Some((error_msg, sources)) = errors.split_first() else { return Ok(()) };
        write!(f, "{error_msg}")?;

        if !sources.is_empty() {
            write!(f, "\n\nContext:")?;
            for source in sources {
                write!(f, "\n- {source}")?;
            }
        }

        if let Some(hint) = hint(error) {
            write!(f, "\n\nHint: {hint}")?;
        }

        Ok(())
    }

    fn track_caller(&mut self, location: &'static std::panic::Location<'static>) {
        if let Some(debug_handler) = &mut self.debug_handler {
            debug_handler.track_caller(location);
        }
    }
}

/// Returns advice for the first error of the chain parx knows how to recover from.
fn hint(error: &(dyn Error + 'static)) -> Option<String> {
    std::iter::successors(Some(error), |&err| err.source()).find_map(|err| {
        if let Some(step) = err.downcast_ref::<StepError>() {
            let entry = step.entry();
            let hint = match step {
                StepError::Deploy { .. } => format!(
                    "contracts deployed before {entry} are recorded, fix the cause and run \
                     `parx deploy --resume` to continue from it"
                ),
                StepError::UnresolvedDependency { dependency, .. } => {
                    format!("add a `[[contracts]]` entry for {dependency}")
                }
                StepError::DuplicateName { .. } => {
                    format!("give one of the {entry} entries a distinct `name`")
                }
                StepError::ArgumentArity { .. } | StepError::ArgumentType { .. } => format!(
                    "fix the constructor arguments of {entry} and run `parx deploy --resume`"
                ),
            };
            return Some(hint);
        }
        let cycle = "contracts can't depend on each other in a loop, remove one of the \
                     `{{Name}}` references";
        if err.is::<CycleError>() {
            return Some(cycle.to_string());
        }
        match err.downcast_ref::<BatchError>() {
            Some(BatchError::Cycle(_)) => return Some(cycle.to_string()),
            Some(BatchError::UnknownDependency { dependency, .. }) => {
                return Some(format!(
                    "add a `[[contracts]]` entry for {dependency} or set `name = \"{dependency}\"` \
                     on an existing one"
                ));
            }
            Some(BatchError::DuplicateName(name)) => {
                return Some(format!("give one of the {name} entries a distinct `name`"));
            }
            _ => {}
        }
        if err.is::<ExtractConfigError>() {
            return Some(format!(
                "check {} and the PARX_* environment variables",
                Config::FILE_NAME
            ));
        }
        None
    })
}

/// Installs the parx [`eyre`] and [`panic`](mod@std::panic) hooks as the global ones.
///
/// `PARX_DEBUG` in the environment swaps in the verbose `color-eyre` report. Panics always use
/// it.
pub fn install() {
    let panic_section = "This is a bug. Consider reporting it at https://github.com/parx-rs/parx";
    let (panic_hook, debug_hook) =
        color_eyre::config::HookBuilder::default().panic_section(panic_section).into_hooks();
    panic_hook.install();
    let debug_hook = debug_hook.into_eyre_hook();
    let debug = std::env::var_os("PARX_DEBUG").is_some();
    if let Err(e) = eyre::set_hook(Box::new(move |e| {
        Box::new(Handler::new().debug_handler(debug.then(|| debug_hook(e))))
    })) {
        debug!("failed to install eyre error hook: {e}");
    }
}
