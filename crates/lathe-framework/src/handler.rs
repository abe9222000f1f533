use crate::context::HandlerContext;
use crate::error::HandlerError;
use crate::phase::Phase;
use crate::values::AnnotationValues;

/// Extension point for annotation-driven transformations.
pub trait AnnotationHandler: Send + Sync {
    /// Fully qualified names of the annotations this handler processes.
    /// Occurrences match on the qualified name or on the simple name.
    fn annotation_names(&self) -> &'static [&'static str];

    /// The phase in which the handler runs.
    fn phase(&self) -> Phase;

    fn handle(
        &self,
        ctx: &mut HandlerContext<'_>,
        values: &AnnotationValues,
    ) -> Result<(), HandlerError>;
}
