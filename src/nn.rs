//! Neural network inference via [tract].
//!
//! [tract]: https://github.com/sonos/tract

use std::{
    fmt,
    ops::Index,
    path::Path,
};

use anyhow::{anyhow, bail, ensure};
use tract_onnx::prelude::*;

use crate::{image::Image, rect::Rect, resolution::Resolution};

type Model = TypedRunnableModel<TypedModel>;

/// A neural network loaded from an ONNX file.
pub struct NeuralNetwork {
    model: Model,
}

impl NeuralNetwork {
    /// Loads and optimizes a network from an `.onnx` file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        ensure!(
            path.extension().map_or(false, |ext| ext == "onnx"),
            "neural network file must have `.onnx` extension (got `{}`)",
            path.display(),
        );

        let model = tract_onnx::onnx()
            .model_for_path(path)?
            .into_optimized()?
            .into_runnable()?;
        Ok(Self { model })
    }
}

impl fmt::Debug for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NeuralNetwork")
    }
}

/// Data layout of a CNN input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnnInputShape {
    /// Batch, channels, height, width.
    NCHW,
    /// Batch, height, width, channels.
    NHWC,
}

/// A convolutional network taking a fixed-resolution RGB image as input.
///
/// Pixel values are fed to the network in the range `0.0..=1.0`, which is
/// what the MediaPipe hand models expect.
pub struct Cnn {
    nn: NeuralNetwork,
    shape: CnnInputShape,
    input_res: Resolution,
}

impl Cnn {
    /// Wraps a [`NeuralNetwork`], validating that its input has the expected
    /// layout and a concrete resolution.
    pub fn new(nn: NeuralNetwork, shape: CnnInputShape) -> anyhow::Result<Self> {
        let fact = nn.model.model().input_fact(0)?;
        let dims = fact
            .shape
            .as_concrete()
            .ok_or_else(|| anyhow!("network input has non-concrete shape {:?}", fact.shape))?;
        let (w, h) = match (shape, dims) {
            (CnnInputShape::NCHW, [1, 3, h, w]) => (*w, *h),
            (CnnInputShape::NHWC, [1, h, w, 3]) => (*w, *h),
            _ => bail!("unsupported {shape:?} network input shape {dims:?}"),
        };

        Ok(Self {
            nn,
            shape,
            input_res: Resolution::new(w as u32, h as u32),
        })
    }

    /// The resolution the input image view is resampled to.
    #[inline]
    pub fn input_resolution(&self) -> Resolution {
        self.input_res
    }

    /// Runs the network on the contents of `rect` within `image`.
    ///
    /// The rectangle is sampled with nearest-neighbor filtering. Areas
    /// outside of the image read as black, so `rect` may exceed the image
    /// bounds (this commonly happens for tracking windows near the border).
    pub fn estimate(&self, image: &Image, rect: Rect) -> anyhow::Result<Outputs> {
        let (in_w, in_h) = (
            self.input_res.width() as usize,
            self.input_res.height() as usize,
        );
        let sample = |x: usize, y: usize, c: usize| -> f32 {
            let src_x = rect.x() + (x as f32 + 0.5) / in_w as f32 * rect.width();
            let src_y = rect.y() + (y as f32 + 0.5) / in_h as f32 * rect.height();
            let color = image.get(src_x.floor() as i32, src_y.floor() as i32);
            f32::from(color.0[c]) / 255.0
        };
        let tensor: Tensor = match self.shape {
            CnnInputShape::NCHW => {
                tract_ndarray::Array4::from_shape_fn((1, 3, in_h, in_w), |(_, c, y, x)| {
                    sample(x, y, c)
                })
                .into()
            }
            CnnInputShape::NHWC => {
                tract_ndarray::Array4::from_shape_fn((1, in_h, in_w, 3), |(_, y, x, c)| {
                    sample(x, y, c)
                })
                .into()
            }
        };

        let tensors = self.nn.model.run(tvec!(tensor.into()))?;
        let mut outputs = Vec::with_capacity(tensors.len());
        for tensor in &tensors {
            outputs.push(Output {
                shape: tensor.shape().to_vec(),
                data: tensor.as_slice::<f32>()?.to_vec(),
            });
        }
        Ok(Outputs { outputs })
    }
}

/// The list of output tensors produced by a network.
#[derive(Debug)]
pub struct Outputs {
    outputs: Vec<Output>,
}

impl Outputs {
    #[inline]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }
}

impl Index<usize> for Outputs {
    type Output = Output;

    fn index(&self, index: usize) -> &Output {
        &self.outputs[index]
    }
}

/// An `f32` output tensor.
#[derive(Debug)]
pub struct Output {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Output {
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The tensor data, flattened in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
