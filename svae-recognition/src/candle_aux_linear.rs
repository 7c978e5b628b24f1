use candle_core::{DType, Device, Result, Tensor};
use candle_nn::{Init, Linear};

///////////////////////////////////////////
// Linear module with N(0, scale^2) init //
///////////////////////////////////////////

/// Linear layer whose weight and bias both start at `N(0, scale^2)`
///
/// * `{prefix}.weight` - out_dim x in_dim
/// * `{prefix}.bias` - out_dim
pub fn gaussian_linear(
    in_dim: usize,
    out_dim: usize,
    scale: f64,
    vb: candle_nn::VarBuilder,
) -> Result<Linear> {
    let init = Init::Randn {
        mean: 0.,
        stdev: scale,
    };
    let ws = vb.get_with_hints((out_dim, in_dim), "weight", init)?;
    let bs = vb.get_with_hints(out_dim, "bias", init)?;
    Ok(Linear::new(ws, Some(bs)))
}

/// `rows x cols` matrix with ones on the main diagonal
pub fn rectangular_identity(
    rows: usize,
    cols: usize,
    dtype: DType,
    device: &Device,
) -> Result<Tensor> {
    let mut data = vec![0f32; rows * cols];
    for i in 0..rows.min(cols) {
        data[i * cols + i] = 1.;
    }
    Tensor::from_vec(data, (rows, cols), device)?.to_dtype(dtype)
}
