use super::Runtime;
use crate::diagnostics::{DiagnosticSink, LogSink};

use std::rc::Rc;

/// Builder for configuring and creating a runtime.
///
/// `RuntimeBuilder` allows customizing runtime parameters before
/// constructing the runtime:
/// - the diagnostic sink receiving unhandled rejections, retry failures and
///   cancellations (defaults to [`LogSink`]),
/// - the runtime name recorded on its tracing span.
///
/// # Examples
///
/// ```rust,ignore
/// let sink = Rc::new(MemorySink::new());
/// let runtime = RuntimeBuilder::new()
///     .name("checkout")
///     .diagnostic_sink(sink.clone())
///     .build();
/// ```
pub struct RuntimeBuilder {
    /// Name of the runtime.
    name: String,

    /// Receiver of runtime diagnostics.
    sink: Rc<dyn DiagnosticSink>,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    pub fn new() -> Self {
        Self {
            name: String::from("pledge"),
            sink: Rc::new(LogSink),
        }
    }

    /// Sets the name recorded on the runtime's tracing span.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Installs the sink that receives runtime diagnostics.
    ///
    /// Pass an `Rc` to keep a handle on the sink, for example a
    /// [`MemorySink`](crate::diagnostics::MemorySink) inspected by a test.
    pub fn diagnostic_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Rc::new(sink);
        self
    }

    /// Builds the runtime with the configured options.
    pub fn build(self) -> Runtime {
        Runtime::new(self.name, self.sink)
    }
}

impl Default for RuntimeBuilder {
    /// Creates a default `RuntimeBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
