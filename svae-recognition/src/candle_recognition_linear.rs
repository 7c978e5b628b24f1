use crate::candle_aux_linear::rectangular_identity;
use crate::candle_model_traits::*;
use crate::candle_potentials::RecognitionPotentials;
use candle_core::{Result, Tensor};
use candle_nn::{Init, VarBuilder};
use log::info;

/// Linear-Gaussian recognition, the inverse view of a linear emission
///
/// `mu = x C'`, `sigma^2 = d^2`, `J = 1/sigma^2`, `h = J mu`
pub struct LinearRecognition {
    n_obs: usize,
    n_latent: usize,
    emission_np: Tensor,
    offset_np: Option<Tensor>,
    scale_n: Tensor,
}

impl RecognitionModuleT for LinearRecognition {
    fn recognize(&self, x_tp: &Tensor) -> Result<RecognitionPotentials> {
        let (x_mp, leading) = flatten_leading(x_tp, self.n_obs)?;

        let c_np = self.emission()?;
        let mu_mn = x_mp.matmul(&c_np.t()?)?;
        let sigmasq_n = self.scale_n.sqr()?;

        RecognitionPotentials::from_mean_var(&mu_mn, &sigmasq_n)?.reshape_leading(&leading)
    }

    fn dim_obs(&self) -> usize {
        self.n_obs
    }

    fn dim_latent(&self) -> usize {
        self.n_latent
    }
}

impl LinearRecognition {
    /// Random initialization with these variables:
    ///
    /// * `emission` - n x p, `N(0, s^2)`
    /// * `scale` - n, `N(0, s^2)`
    ///
    /// where `s = scale / sqrt(n + p)`
    ///
    /// # Arguments
    /// * `n_latent` - latent dimension (n)
    /// * `n_obs` - data dimension (p)
    /// * `scale` - overall scale of the initial values
    /// * `vb` - variable builder
    pub fn new(n_latent: usize, n_obs: usize, scale: f64, vb: VarBuilder) -> Result<Self> {
        info!(
            "initializing linear recognition: (n, p) == ({}, {})",
            n_latent, n_obs
        );
        let init = Init::Randn {
            mean: 0.,
            stdev: scale / ((n_latent + n_obs) as f64).sqrt(),
        };
        let emission_np = vb.get_with_hints((n_latent, n_obs), "emission", init)?;
        let scale_n = vb.get_with_hints(n_latent, "scale", init)?;

        Ok(Self {
            n_obs,
            n_latent,
            emission_np,
            offset_np: None,
            scale_n,
        })
    }

    /// Start from `C = I` and `d = 1`
    ///
    /// The identity is a fixed offset; the trainable `emission`
    /// variable starts at zero.
    pub fn identity(n_latent: usize, n_obs: usize, vb: VarBuilder) -> Result<Self> {
        info!(
            "initializing identity linear recognition: (n, p) == ({}, {})",
            n_latent, n_obs
        );
        let offset_np = rectangular_identity(n_latent, n_obs, vb.dtype(), vb.device())?;
        let emission_np = vb.get_with_hints((n_latent, n_obs), "emission", Init::Const(0.))?;
        let scale_n = vb.get_with_hints(n_latent, "scale", Init::Const(1.))?;

        Ok(Self {
            n_obs,
            n_latent,
            emission_np,
            offset_np: Some(offset_np),
            scale_n,
        })
    }

    /// Wrap fixed parameters
    ///
    /// * `emission_np` - `C` (n x p)
    /// * `scale_n` - `d` (n)
    pub fn from_tensors(emission_np: Tensor, scale_n: Tensor) -> Result<Self> {
        let (n_latent, n_obs) = emission_np.dims2()?;
        if scale_n.dims() != [n_latent] {
            candle_core::bail!(
                "scale {:?} should have {} elements",
                scale_n.shape(),
                n_latent
            );
        }
        Ok(Self {
            n_obs,
            n_latent,
            emission_np,
            offset_np: None,
            scale_n,
        })
    }

    /// effective emission matrix `C` (n x p)
    pub fn emission(&self) -> Result<Tensor> {
        match &self.offset_np {
            Some(offset) => &self.emission_np + offset,
            None => Ok(self.emission_np.clone()),
        }
    }

    pub fn scale(&self) -> &Tensor {
        &self.scale_n
    }
}
