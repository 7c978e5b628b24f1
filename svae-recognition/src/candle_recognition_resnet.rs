use crate::candle_model_traits::*;
use crate::candle_potentials::RecognitionPotentials;
use crate::candle_recognition_linear::LinearRecognition;
use crate::candle_recognition_mlp::{MlpRecognition, DEFAULT_MLP_INIT_SCALE};
use candle_core::{Result, Tensor};
use candle_nn::VarBuilder;
use log::info;

pub const DEFAULT_RESNET_TANH_SCALE: f64 = 2.;

/// Residual recognition: linear potentials plus an MLP correction
///
/// `psi(x) = psi_linear(x) + psi_mlp(x)`
pub struct ResNetRecognition {
    linear: LinearRecognition,
    mlp: MlpRecognition,
}

impl RecognitionModuleT for ResNetRecognition {
    fn recognize(&self, x_tp: &Tensor) -> Result<RecognitionPotentials> {
        let linear = self.linear.recognize(x_tp)?;
        let residual = self.mlp.recognize(x_tp)?;
        linear.add(&residual)
    }

    fn dim_obs(&self) -> usize {
        self.linear.dim_obs()
    }

    fn dim_latent(&self) -> usize {
        self.linear.dim_latent()
    }
}

impl ResNetRecognition {
    /// Will create a residual recognition module
    /// with these variables:
    ///
    /// * `linear.emission`, `linear.scale`
    /// * `mlp.*` as in [`MlpRecognition::new`]
    ///
    /// # Arguments
    /// * `n_latent` - latent dimension (n)
    /// * `n_obs` - data dimension (p)
    /// * `layers` - tanh hidden layers of the MLP part
    /// * `identity` - start the linear part at `C = I`, `d = 1`
    /// * `vs` - variable builder
    pub fn new(
        n_latent: usize,
        n_obs: usize,
        layers: &[usize],
        identity: bool,
        vs: VarBuilder,
    ) -> Result<Self> {
        Self::with_scales(
            n_latent,
            n_obs,
            layers,
            identity,
            1.,
            DEFAULT_MLP_INIT_SCALE,
            DEFAULT_RESNET_TANH_SCALE,
            vs,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_scales(
        n_latent: usize,
        n_obs: usize,
        layers: &[usize],
        identity: bool,
        linear_init_scale: f64,
        mlp_init_scale: f64,
        tanh_scale: f64,
        vs: VarBuilder,
    ) -> Result<Self> {
        info!(
            "initializing resnet recognition: (n, p) == ({}, {}), identity: {}",
            n_latent, n_obs, identity
        );

        let linear = if identity {
            LinearRecognition::identity(n_latent, n_obs, vs.pp("linear"))?
        } else {
            LinearRecognition::new(n_latent, n_obs, linear_init_scale, vs.pp("linear"))?
        };

        let mlp = MlpRecognition::new(
            n_latent,
            n_obs,
            layers,
            mlp_init_scale,
            tanh_scale,
            vs.pp("mlp"),
        )?;

        Ok(Self { linear, mlp })
    }

    pub fn from_parts(linear: LinearRecognition, mlp: MlpRecognition) -> Result<Self> {
        if linear.dim_obs() != mlp.dim_obs() || linear.dim_latent() != mlp.dim_latent() {
            candle_core::bail!(
                "linear (n, p) == ({}, {}) but mlp (n, p) == ({}, {})",
                linear.dim_latent(),
                linear.dim_obs(),
                mlp.dim_latent(),
                mlp.dim_obs()
            );
        }
        Ok(Self { linear, mlp })
    }

    pub fn linear(&self) -> &LinearRecognition {
        &self.linear
    }

    pub fn mlp(&self) -> &MlpRecognition {
        &self.mlp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn resnet_sums_parts() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F64, &Device::Cpu);
        let model = ResNetRecognition::new(3, 3, &[4], true, vb)?;
        assert_eq!(model.mlp().tanh_scale(), DEFAULT_RESNET_TANH_SCALE);

        let x = Tensor::randn(0f64, 1f64, (5, 3), &Device::Cpu)?;
        let pot = model.recognize(&x)?;
        let lin = model.linear().recognize(&x)?;
        let mlp = model.mlp().recognize(&x)?;

        let diff = (pot.h - (lin.h + mlp.h)?)?.abs()?.max_all()?;
        assert!(diff.to_scalar::<f64>()? < 1e-12);
        let diff = (pot.neg_half_j - (lin.neg_half_j + mlp.neg_half_j)?)?
            .abs()?
            .max_all()?;
        assert!(diff.to_scalar::<f64>()? < 1e-12);
        Ok(())
    }

    #[test]
    fn mismatched_parts_are_rejected() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let linear = LinearRecognition::identity(2, 3, vb.pp("a"))?;
        let mlp = MlpRecognition::new(2, 4, &[], 1e-2, 2., vb.pp("b"))?;
        assert!(ResNetRecognition::from_parts(linear, mlp).is_err());
        Ok(())
    }
}
