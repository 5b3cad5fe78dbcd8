//! Tracing hooks for the mosaic stages.
//!
//! With the `tracing` feature each stage (capture, estimation, merge,
//! compositing) runs inside an info-level span and reports its counts as a
//! `stage` event. Without the feature the hooks expand to nothing, but the
//! field expressions are still evaluated so call sites read the same either
//! way.

/// Opens the span for one mosaic stage.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($stage:literal $(, $($field:tt)*)?) => {
        tracing::info_span!($stage $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($stage:literal $(, $key:ident = $value:expr)* $(,)?) => {{
        let _ = ($($value,)*);
        $crate::trace::StageSpan
    }};
}

/// Reports the counts a stage produced, e.g. pairs extracted or pixels blended.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($stage:literal, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(stage = $stage, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($stage:literal, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Span guard handed out when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub(crate) struct StageSpan;

#[cfg(not(feature = "tracing"))]
impl StageSpan {
    #[inline]
    pub(crate) fn entered(self) -> Self {
        self
    }
}
