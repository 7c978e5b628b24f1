use crate::candle_aux_layers::StackLayers;
use crate::candle_aux_linear::gaussian_linear;
use crate::candle_model_traits::*;
use crate::candle_potentials::RecognitionPotentials;
use candle_core::{Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use log::{debug, info};

pub const DEFAULT_MLP_TANH_SCALE: f64 = 10.;
pub const DEFAULT_MLP_INIT_SCALE: f64 = 1e-2;

/// Multilayer recognition network
///
/// `out = tanh(... tanh(x W1 + b1) ...)`
/// `h = out Wh + bh`
/// `neg_half_j = -exp(s * tanh((out WJ + bJ) / s)) / 2`
pub struct MlpRecognition {
    n_obs: usize,
    n_latent: usize,
    tanh_scale: f64,
    fc: StackLayers<Linear>,
    h_out: Linear,
    log_j_out: Linear,
}

impl RecognitionModuleT for MlpRecognition {
    fn recognize(&self, x_tp: &Tensor) -> Result<RecognitionPotentials> {
        let (x_mp, leading) = flatten_leading(x_tp, self.n_obs)?;
        debug!("mlp recognition: {:?} -> {:?}", x_tp.shape(), leading);

        let fc_ml = self.fc.forward(&x_mp)?;

        let log_j_mn = self.soft_clamp(&self.log_j_out.forward(&fc_ml)?)?;
        let neg_half_j_mn = (log_j_mn.exp()? * -0.5)?;
        let h_mn = self.h_out.forward(&fc_ml)?;
        let log_z_m = Tensor::zeros(leading.clone(), x_tp.dtype(), x_tp.device())?;

        RecognitionPotentials::new(
            neg_half_j_mn.reshape(with_last(&leading, self.n_latent))?,
            h_mn.reshape(with_last(&leading, self.n_latent))?,
            log_z_m,
        )
    }

    fn dim_obs(&self) -> usize {
        self.n_obs
    }

    fn dim_latent(&self) -> usize {
        self.n_latent
    }
}

fn with_last(leading: &[usize], last: usize) -> Vec<usize> {
    let mut ret = leading.to_vec();
    ret.push(last);
    ret
}

impl MlpRecognition {
    /// `s * tanh(x / s)` keeps log precision within `(-s, s)`
    fn soft_clamp(&self, x: &Tensor) -> Result<Tensor> {
        let s = self.tanh_scale;
        x.affine(1. / s, 0.)?.tanh()?.affine(s, 0.)
    }

    /// Will create a new MLP recognition module
    /// with these variables:
    ///
    /// * `fc.{}.weight`, `fc.{}.bias` where {} is the layer index
    /// * `h.weight`, `h.bias`
    /// * `log_j.weight`, `log_j.bias`
    ///
    /// all drawn from `N(0, init_scale^2)`
    ///
    /// # Arguments
    /// * `n_latent` - latent dimension (n)
    /// * `n_obs` - data dimension (p)
    /// * `layers` - tanh hidden layers, each with the dim
    /// * `init_scale` - standard deviation of the initial values
    /// * `tanh_scale` - bound on the log precision
    /// * `vs` - variable builder
    pub fn new(
        n_latent: usize,
        n_obs: usize,
        layers: &[usize],
        init_scale: f64,
        tanh_scale: f64,
        vs: VarBuilder,
    ) -> Result<Self> {
        info!(
            "initializing mlp recognition: (n, p) == ({}, {}), hidden {:?}",
            n_latent, n_obs, layers
        );

        // (1) data -> fc
        let mut fc = StackLayers::<Linear>::new();
        let mut prev_dim = n_obs;
        for (j, &next_dim) in layers.iter().enumerate() {
            let _name = format!("fc.{}", j);
            fc.push_tanh(gaussian_linear(
                prev_dim,
                next_dim,
                init_scale,
                vs.pp(_name),
            )?);
            prev_dim = next_dim;
        }

        // (2) fc -> n
        let h_out = gaussian_linear(prev_dim, n_latent, init_scale, vs.pp("h"))?;
        let log_j_out = gaussian_linear(prev_dim, n_latent, init_scale, vs.pp("log_j"))?;

        Ok(Self {
            n_obs,
            n_latent,
            tanh_scale,
            fc,
            h_out,
            log_j_out,
        })
    }

    /// Assemble from existing layers
    ///
    /// * `hidden` - tanh layers applied in order
    /// * `h_out` - linear term head
    /// * `log_j_out` - log precision head
    pub fn from_layers(
        hidden: Vec<Linear>,
        h_out: Linear,
        log_j_out: Linear,
        tanh_scale: f64,
    ) -> Result<Self> {
        let (n_latent, _) = h_out.weight().dims2()?;
        let n_obs = match hidden.first() {
            Some(first) => first.weight().dims2()?.1,
            None => h_out.weight().dims2()?.1,
        };
        if log_j_out.weight().dims() != h_out.weight().dims() {
            candle_core::bail!(
                "output heads differ: {:?} vs {:?}",
                h_out.weight().shape(),
                log_j_out.weight().shape()
            );
        }

        let mut fc = StackLayers::<Linear>::new();
        for layer in hidden {
            fc.push_tanh(layer);
        }

        Ok(Self {
            n_obs,
            n_latent,
            tanh_scale,
            fc,
            h_out,
            log_j_out,
        })
    }

    pub fn tanh_scale(&self) -> f64 {
        self.tanh_scale
    }

    pub fn num_hidden_layers(&self) -> usize {
        self.fc.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn batched_shapes() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let (n, p, t, k) = (2, 4, 6, 3);
        let model = MlpRecognition::new(n, p, &[8, 5], 1e-2, 10., vb)?;

        assert_eq!(model.num_hidden_layers(), 2);
        assert_eq!(varmap.all_vars().len(), 8);

        let x = Tensor::randn(0f32, 1f32, (t, k, p), &Device::Cpu)?;
        let pot = model.recognize(&x)?;
        assert_eq!(pot.neg_half_j.dims(), &[t, k, n]);
        assert_eq!(pot.h.dims(), &[t, k, n]);
        assert_eq!(pot.log_z.dims(), &[t, k]);
        Ok(())
    }

    #[test]
    fn zero_heads_give_unit_precision() -> Result<()> {
        let dev = Device::Cpu;
        let zero_w = Tensor::zeros((2, 3), DType::F32, &dev)?;
        let zero_b = Tensor::zeros(2, DType::F32, &dev)?;
        let model = MlpRecognition::from_layers(
            vec![],
            Linear::new(zero_w.clone(), Some(zero_b.clone())),
            Linear::new(zero_w, Some(zero_b)),
            DEFAULT_MLP_TANH_SCALE,
        )?;

        let x = Tensor::ones((4, 3), DType::F32, &dev)?;
        let pot = model.recognize(&x)?;
        assert_eq!(pot.neg_half_j.to_vec2::<f32>()?, vec![vec![-0.5f32; 2]; 4]);
        assert_eq!(pot.h.to_vec2::<f32>()?, vec![vec![0f32; 2]; 4]);
        Ok(())
    }
}
