//! ImageLab Rust Engine
//!
//! Raster image-transform engine for an interactive image-processing
//! application: pointwise and photometric operations, spatial filters,
//! frequency-domain filters, noise synthesis and segmentation, wrapped by
//! a preview/commit session.
//!
//! ## Image Format
//! Images are [`ImageMatrix`] buffers of 8-bit samples in
//! `(height, width, channels)` order:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//!
//! Arithmetic runs on an `f32` working copy on the 0-255 scale and is
//! clipped and truncated once on the way back.
//!
//! ## Operation Architecture
//! Every operation is a pure function of the original image and its
//! parameters. [`session::EngineState`] keeps the original and processed
//! images; [`session::PreviewSession`] re-evaluates an operation as a
//! parameter changes and commits or discards the result.
//!
//! ## Logging
//! The engine emits `tracing` events and never installs a subscriber.

pub mod error;
pub mod image;
pub mod params;

pub mod filters;
pub mod frequency;
pub mod segmentation;

pub mod operation;
pub mod session;

pub use error::{EngineError, EngineResult};
pub use image::ImageMatrix;
pub use operation::Operation;
pub use params::ParamRange;
pub use session::{EngineState, PreviewSession, SessionOutcome};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::error::EngineError;
    use crate::filters::boolean::{self, BooleanOp};
    use crate::filters::geometry::{self, FlipAxis, ResampleFilter};
    use crate::frequency::{self, MaskKind};
    use crate::image::ImageMatrix;
    use crate::operation::Operation;
    use crate::segmentation;

    impl From<EngineError> for PyErr {
        fn from(err: EngineError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    fn to_image(image: PyReadonlyArray3<'_, u8>) -> PyResult<ImageMatrix> {
        Ok(ImageMatrix::from_array(image.as_array().to_owned())?)
    }

    fn to_py<'py>(py: Python<'py>, image: ImageMatrix) -> Bound<'py, PyArray3<u8>> {
        image.into_array().into_pyarray(py)
    }

    fn lookup(name: &str) -> PyResult<Operation> {
        Operation::from_name(name)
            .ok_or_else(|| PyValueError::new_err(format!("unknown operation: {name}")))
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// List operations as `(name, (min, max, default, step) or None)`.
    #[pyfunction]
    pub fn operations() -> Vec<(String, Option<(f64, f64, f64, f64)>)> {
        Operation::ALL
            .iter()
            .map(|op| {
                let range = op.range().map(|r| (r.min, r.max, r.default, r.step));
                (op.name().to_string(), range)
            })
            .collect()
    }

    /// Apply a catalog operation by menu name.
    ///
    /// Noise operations draw from `seed` when given, otherwise from the
    /// thread-local generator.
    #[pyfunction]
    #[pyo3(signature = (image, name, value=None, seed=None))]
    pub fn apply_operation<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        name: &str,
        value: Option<f64>,
        seed: Option<u64>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let op = lookup(name)?;
        let img = to_image(image)?;
        let value = value.unwrap_or_else(|| op.range().map_or(0.0, |r| r.default));
        let result = match seed {
            Some(seed) => op.apply_with_rng(&img, value, &mut StdRng::seed_from_u64(seed))?,
            None => op.apply(&img, value)?,
        };
        Ok(to_py(py, result))
    }

    // ========================================================================
    // Two-image and coordinate operations
    // ========================================================================

    /// Bitwise "and" / "or" / "xor" of two images, resampling the second.
    #[pyfunction]
    pub fn boolean_combine<'py>(
        py: Python<'py>,
        first: PyReadonlyArray3<'py, u8>,
        second: PyReadonlyArray3<'py, u8>,
        op: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let op = match op {
            "and" => BooleanOp::And,
            "or" => BooleanOp::Or,
            "xor" => BooleanOp::Xor,
            other => return Err(PyValueError::new_err(format!("unknown boolean op: {other}"))),
        };
        let result = boolean::boolean_combine(&to_image(first)?, &to_image(second)?, op, true)?;
        Ok(to_py(py, result))
    }

    /// Region growing from `(seed_x, seed_y)`, or the centre when omitted.
    #[pyfunction]
    #[pyo3(signature = (image, threshold, seed_x=None, seed_y=None))]
    pub fn region_growing<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: f64,
        seed_x: Option<usize>,
        seed_y: Option<usize>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let seed = seed_x.zip(seed_y);
        let result = segmentation::region_growing(&to_image(image)?, seed, threshold)?;
        Ok(to_py(py, result))
    }

    /// Watershed label map (-1 on boundaries).
    #[pyfunction]
    pub fn watershed_markers<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<i32>>> {
        let markers = segmentation::watershed_markers(&to_image(image)?);
        Ok(markers.into_pyarray(py))
    }

    #[pyfunction]
    pub fn crop<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = geometry::crop(&to_image(image)?, x1, y1, x2, y2)?;
        Ok(to_py(py, result))
    }

    /// Translate by both offsets at once.
    #[pyfunction]
    pub fn translate<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        tx: f64,
        ty: f64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = geometry::translate(&to_image(image)?, tx, ty)?;
        Ok(to_py(py, result))
    }

    /// Flip "horizontal" or "vertical".
    #[pyfunction]
    pub fn flip<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        axis: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let axis = match axis {
            "horizontal" => FlipAxis::Horizontal,
            "vertical" => FlipAxis::Vertical,
            other => return Err(PyValueError::new_err(format!("unknown axis: {other}"))),
        };
        Ok(to_py(py, geometry::flip(&to_image(image)?, axis)))
    }

    /// Resize with "nearest", "bilinear" or "lanczos3".
    #[pyfunction]
    #[pyo3(signature = (image, height, width, filter="bilinear"))]
    pub fn resize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        height: usize,
        width: usize,
        filter: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let filter = match filter {
            "nearest" => ResampleFilter::Nearest,
            "bilinear" => ResampleFilter::Bilinear,
            "lanczos3" => ResampleFilter::Lanczos3,
            other => return Err(PyValueError::new_err(format!("unknown filter: {other}"))),
        };
        let result = geometry::resize(&to_image(image)?, height, width, filter)?;
        Ok(to_py(py, result))
    }

    /// Frequency filter with an unrestricted cutoff.
    #[pyfunction]
    pub fn frequency_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kind: &str,
        cutoff: f64,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let kind = match kind {
            "ilpf" => MaskKind::IdealLowpass,
            "ihpf" => MaskKind::IdealHighpass,
            "blpf" => MaskKind::ButterworthLowpass,
            "bhpf" => MaskKind::ButterworthHighpass,
            other => return Err(PyValueError::new_err(format!("unknown mask: {other}"))),
        };
        let result = frequency::frequency_filter(&to_image(image)?, kind, cutoff)?;
        Ok(to_py(py, result))
    }

    /// Python module definition
    #[pymodule]
    pub fn imagelab_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Catalog
        m.add_function(wrap_pyfunction!(operations, m)?)?;
        m.add_function(wrap_pyfunction!(apply_operation, m)?)?;

        // Two-image and coordinate operations
        m.add_function(wrap_pyfunction!(boolean_combine, m)?)?;
        m.add_function(wrap_pyfunction!(region_growing, m)?)?;
        m.add_function(wrap_pyfunction!(watershed_markers, m)?)?;
        m.add_function(wrap_pyfunction!(crop, m)?)?;
        m.add_function(wrap_pyfunction!(translate, m)?)?;
        m.add_function(wrap_pyfunction!(flip, m)?)?;
        m.add_function(wrap_pyfunction!(resize, m)?)?;
        m.add_function(wrap_pyfunction!(frequency_filter, m)?)?;

        Ok(())
    }
}
