//! Ordered teardown and shutdown error aggregation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Boxed error carried by teardown units and aggregate causes.
pub type BoxError = Box<dyn Error + Send + Sync>;

struct TeardownUnit {
    label: &'static str,
    run: Box<dyn FnOnce(Duration) -> Result<(), BoxError> + Send>,
}

/// Ordered registry of teardown callbacks.
///
/// Units run in registration order. Draining the registry invokes every unit
/// exactly once even when earlier units fail, and leaves the registry empty;
/// a second drain performs no work and returns `Ok(())`.
#[derive(Default)]
pub struct TeardownRegistry {
    units: Vec<TeardownUnit>,
}

impl TeardownRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a teardown unit.
    ///
    /// The label identifies the unit in logs and aggregate causes. The unit
    /// receives the shared flush budget and is responsible for honoring it;
    /// the registry does not impose a per-unit timeout on top.
    pub fn register<F>(&mut self, label: &'static str, run: F)
    where
        F: FnOnce(Duration) -> Result<(), BoxError> + Send + 'static,
    {
        self.units.push(TeardownUnit {
            label,
            run: Box::new(run),
        });
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the registry holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Invoke every registered unit in insertion order and clear the registry.
    ///
    /// A failing unit does not stop the ones after it; every failure is
    /// folded into one [`AggregateError`].
    pub fn shutdown(&mut self, budget: Duration) -> Result<(), AggregateError> {
        let mut errors = AggregateError::new();
        for unit in self.units.drain(..) {
            tracing::debug!(unit = unit.label, "running teardown");
            if let Err(e) = (unit.run)(budget) {
                tracing::warn!(unit = unit.label, error = %e, "teardown failed");
                errors.push(unit.label, e);
            }
        }
        errors.into_result()
    }
}

/// One failure inside an [`AggregateError`], tagged with the step it came
/// from.
#[derive(Debug)]
pub struct Cause {
    label: &'static str,
    source: BoxError,
}

impl Cause {
    /// The step this failure came from.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.source)
    }
}

impl Error for Cause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

/// Composite of zero or more labeled failures.
///
/// The empty aggregate is the join identity; [`AggregateError::into_result`]
/// maps it to `Ok(())`. Joining appends causes, so diagnostic order follows
/// the order in which steps failed.
#[derive(Debug, Default)]
pub struct AggregateError {
    causes: Vec<Cause>,
}

impl AggregateError {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn push(&mut self, label: &'static str, source: impl Into<BoxError>) {
        self.causes.push(Cause {
            label,
            source: source.into(),
        });
    }

    /// Append every cause of `other`, preserving order.
    pub fn join(&mut self, other: AggregateError) {
        self.causes.extend(other.causes);
    }

    /// Fold a step result into the aggregate.
    pub fn join_result<E: Into<BoxError>>(&mut self, label: &'static str, result: Result<(), E>) {
        if let Err(e) = result {
            self.push(label, e);
        }
    }

    /// Whether any failure has been recorded.
    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.causes.len()
    }

    /// The recorded failures, each one inspectable.
    pub fn causes(&self) -> impl Iterator<Item = &Cause> {
        self.causes.iter()
    }

    /// `Ok(())` when empty, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), AggregateError> {
        if self.causes.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.causes.as_slice() {
            [] => write!(f, "no errors"),
            [one] => write!(f, "{one}"),
            many => {
                write!(f, "{} errors: ", many.len())?;
                for (i, cause) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{cause}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for AggregateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.causes.first().map(|c| c as &(dyn Error + 'static))
    }
}
