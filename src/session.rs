//! Engine state and the preview/commit protocol.
//!
//! [`EngineState`] holds the loaded original and the current processed
//! image. Operations always read the original. A [`PreviewSession`] owns
//! the transient candidate while a parameter is being adjusted: every
//! [`update`](PreviewSession::update) re-runs the operation on the original,
//! so the candidate depends only on the latest parameter. The session ends
//! with [`commit`](PreviewSession::commit) (candidate becomes processed) or
//! [`discard`](PreviewSession::discard) (processed reset to the original).
//!
//! ```text
//! Idle --preview()--> Previewing --update()*--> Previewing
//!                          |--commit()--> Committed --> Idle
//!                          '--discard()-> Reverted  --> Idle
//! ```
//!
//! A failed evaluation never touches the processed image.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EngineError, EngineResult};
use crate::filters::boolean::{boolean_combine, BooleanOp};
use crate::image::ImageMatrix;
use crate::operation::Operation;

/// How a preview session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The candidate replaced the processed image.
    Committed,
    /// The processed image was reset to the original.
    Reverted,
}

/// Original and processed images of the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    original: Option<ImageMatrix>,
    processed: Option<ImageMatrix>,
}

fn no_image() -> EngineError {
    EngineError::domain("no image loaded")
}

impl EngineState {
    /// Empty state with no image loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new original; the processed image starts as a copy.
    pub fn load(&mut self, image: ImageMatrix) {
        debug!(
            height = image.height(),
            width = image.width(),
            channels = image.channels(),
            "image loaded"
        );
        self.processed = Some(image.clone());
        self.original = Some(image);
    }

    pub fn original(&self) -> Option<&ImageMatrix> {
        self.original.as_ref()
    }

    pub fn processed(&self) -> Option<&ImageMatrix> {
        self.processed.as_ref()
    }

    fn require_original(&self) -> EngineResult<&ImageMatrix> {
        self.original.as_ref().ok_or_else(no_image)
    }

    /// Run a one-shot operation on the original and store the result.
    pub fn apply<F>(&mut self, op: F) -> EngineResult<()>
    where
        F: FnOnce(&ImageMatrix) -> EngineResult<ImageMatrix>,
    {
        let result = op(self.require_original()?)?;
        self.processed = Some(result);
        Ok(())
    }

    /// Run a catalog operation with a fixed value.
    pub fn apply_operation(&mut self, op: Operation, value: f64) -> EngineResult<()> {
        debug!(operation = op.name(), value, "apply");
        self.apply(|img| op.apply(img, value))
    }

    /// Combine the original with a second image.
    ///
    /// The second image is resampled to the original's size if needed.
    /// `None` (no second image supplied) abandons the operation.
    ///
    /// # Returns
    /// `true` if the processed image was replaced
    pub fn combine(&mut self, second: Option<&ImageMatrix>, op: BooleanOp) -> EngineResult<bool> {
        let original = self.require_original()?;
        let Some(second) = second else {
            debug!(?op, "combine abandoned, no second image");
            return Ok(false);
        };
        let result = boolean_combine(original, second, op, true)?;
        self.processed = Some(result);
        Ok(true)
    }

    /// Open a preview session for `op`, starting at parameter `initial`.
    ///
    /// Nothing is evaluated until the first [`PreviewSession::update`].
    pub fn preview<F>(&mut self, initial: f64, op: F) -> EngineResult<PreviewSession<'_, F>>
    where
        F: Fn(&ImageMatrix, f64) -> EngineResult<ImageMatrix>,
    {
        self.require_original()?;
        debug!(initial, "preview opened");
        Ok(PreviewSession {
            state: self,
            op,
            param: initial,
            candidate: None,
            evaluations: 0,
        })
    }

    /// Open a preview session for a catalog operation at its default value.
    pub fn preview_operation(
        &mut self,
        op: Operation,
    ) -> EngineResult<PreviewSession<'_, impl Fn(&ImageMatrix, f64) -> EngineResult<ImageMatrix>>> {
        let initial = op.range().map_or(0.0, |r| r.default);
        debug!(operation = op.name(), "preview operation");
        self.preview(initial, move |img: &ImageMatrix, value: f64| op.apply(img, value))
    }
}

/// Live preview of one operation.
///
/// Borrows the engine state mutably, so no other operation can run while
/// the session is open. Dropping the session without committing or
/// discarding leaves the processed image as it was.
pub struct PreviewSession<'a, F> {
    state: &'a mut EngineState,
    op: F,
    param: f64,
    candidate: Option<ImageMatrix>,
    evaluations: usize,
}

impl<'a, F> PreviewSession<'a, F>
where
    F: Fn(&ImageMatrix, f64) -> EngineResult<ImageMatrix>,
{
    fn evaluate(&self, param: f64) -> EngineResult<ImageMatrix> {
        (self.op)(self.state.require_original()?, param)
    }

    /// Re-evaluate against the original with a new parameter.
    ///
    /// On error the previous candidate and parameter are kept.
    pub fn update(&mut self, param: f64) -> EngineResult<&ImageMatrix> {
        let candidate = self.evaluate(param)?;
        self.evaluations += 1;
        self.param = param;
        trace!(param, evaluations = self.evaluations, "preview updated");
        Ok(&*self.candidate.insert(candidate))
    }

    /// Most recent candidate, if any evaluation succeeded.
    pub fn candidate(&self) -> Option<&ImageMatrix> {
        self.candidate.as_ref()
    }

    /// Parameter of the current candidate (or the initial value).
    pub fn param(&self) -> f64 {
        self.param
    }

    /// Number of successful evaluations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Promote the candidate to the processed image.
    ///
    /// With no candidate yet, the current parameter is evaluated first. If
    /// that fails the error is returned and the processed image is
    /// untouched.
    pub fn commit(self) -> EngineResult<SessionOutcome> {
        let candidate = match self.candidate {
            Some(c) => c,
            None => (self.op)(self.state.require_original()?, self.param)?,
        };
        debug!(param = self.param, evaluations = self.evaluations, "preview committed");
        self.state.processed = Some(candidate);
        Ok(SessionOutcome::Committed)
    }

    /// Drop the candidate and reset the processed image to the original.
    pub fn discard(self) -> SessionOutcome {
        debug!(evaluations = self.evaluations, "preview discarded");
        self.state.processed = self.state.original.clone();
        SessionOutcome::Reverted
    }
}
