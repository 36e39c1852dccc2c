//! OpenVINO model loading
//!
//! Models are compiled once at startup and shared read-only across
//! requests; an inference request is created per call.

use std::sync::Arc;

use anyhow::{Context, Result};
use openvino::{CompiledModel, Core, ElementType, Shape, Tensor};
use tracing::info;

/// Wrapper for OpenVINO CompiledModel that implements Send + Sync
#[derive(Clone)]
pub struct SafeCompiledModel(pub Arc<CompiledModel>);
unsafe impl Send for SafeCompiledModel {}
unsafe impl Sync for SafeCompiledModel {}

impl SafeCompiledModel {
    /// Create an inference request
    /// OpenVINO CompiledModel methods are thread-safe in C++, but Rust bindings
    /// require &mut self. We bypass this restriction safely.
    pub fn create_infer_request(&self) -> Result<openvino::InferRequest> {
        unsafe {
            let ptr = Arc::as_ptr(&self.0) as *mut CompiledModel;
            (*ptr).create_infer_request().map_err(|e| e.into())
        }
    }
}

/// Compiles models on a configured device. Used only during startup;
/// the compiled handles outlive it.
pub struct ModelCompiler {
    core: Core,
    device: String,
}

impl ModelCompiler {
    pub fn new(device: &str) -> Result<Self> {
        let core = Core::new().context("Failed to initialize OpenVINO core")?;
        Ok(Self {
            core,
            device: device.to_string(),
        })
    }

    pub fn compile(&mut self, path: &std::path::Path) -> Result<SafeCompiledModel> {
        let start = std::time::Instant::now();
        let path_str = path
            .to_str()
            .with_context(|| format!("Non-UTF8 model path: {}", path.display()))?;

        let model = self
            .core
            .read_model_from_file(path_str, "")
            .with_context(|| format!("Failed to read model from {}", path.display()))?;
        let compiled = self
            .core
            .compile_model(&model, self.device.as_str().into())
            .with_context(|| format!("Failed to compile model {}", path.display()))?;

        info!("Compiled model {} in {:?}", path.display(), start.elapsed());
        Ok(SafeCompiledModel(Arc::new(compiled)))
    }
}

/// Build an f32 input tensor of the given shape from a flat slice.
pub fn make_input_tensor(dims: &[i64], data: &[f32]) -> Result<Tensor> {
    let shape = Shape::new(dims)?;
    let mut tensor = Tensor::new(ElementType::F32, &shape)?;

    let expected: i64 = dims.iter().product();
    anyhow::ensure!(
        expected as usize == data.len(),
        "Tensor shape {:?} does not match data length {}",
        dims,
        data.len()
    );

    unsafe {
        let dst = tensor.get_raw_data_mut()?.as_mut_ptr() as *mut f32;
        std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
    }

    Ok(tensor)
}

/// Read tensor data as f32 vector
pub fn read_tensor_f32(tensor: &Tensor) -> Result<Vec<f32>> {
    let shape = tensor.get_shape()?;
    let dims: Vec<i64> = shape.get_dimensions().to_vec();
    let total_elements: i64 = dims.iter().product();

    let data: Vec<f32> = unsafe {
        let ptr = tensor.get_raw_data()?.as_ptr() as *const f32;
        std::slice::from_raw_parts(ptr, total_elements as usize).to_vec()
    };

    Ok(data)
}
