use crate::candle_model_traits::RecognitionModuleT;
use crate::candle_recognition_linear::LinearRecognition;
use crate::candle_recognition_mlp::*;
use crate::candle_recognition_resnet::*;
use candle_nn::VarBuilder;
use log::info;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionKind {
    Linear,
    Mlp,
    ResNet,
}

impl fmt::Display for RecognitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecognitionKind::Linear => "linear",
            RecognitionKind::Mlp => "mlp",
            RecognitionKind::ResNet => "resnet",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RecognitionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(RecognitionKind::Linear),
            "mlp" => Ok(RecognitionKind::Mlp),
            "resnet" => Ok(RecognitionKind::ResNet),
            _ => Err(anyhow::anyhow!("unknown recognition kind: {}", s)),
        }
    }
}

/// Configuration of a recognition network
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    pub kind: RecognitionKind,
    /// tanh hidden layers (MLP and residual)
    pub hidden_layers: Vec<usize>,
    pub linear_init_scale: f64,
    pub mlp_init_scale: f64,
    pub mlp_tanh_scale: f64,
    pub resnet_tanh_scale: f64,
    /// start the linear part of a residual network at the identity
    pub identity_init: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            kind: RecognitionKind::Mlp,
            hidden_layers: vec![],
            linear_init_scale: 1.,
            mlp_init_scale: DEFAULT_MLP_INIT_SCALE,
            mlp_tanh_scale: DEFAULT_MLP_TANH_SCALE,
            resnet_tanh_scale: DEFAULT_RESNET_TANH_SCALE,
            identity_init: true,
        }
    }
}

impl RecognitionConfig {
    pub fn new(kind: RecognitionKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_hidden_layers(mut self, layers: &[usize]) -> Self {
        self.hidden_layers = layers.to_vec();
        self
    }

    pub fn with_identity_init(mut self, identity: bool) -> Self {
        self.identity_init = identity;
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.hidden_layers.iter().all(|&d| d > 0),
            "hidden layer widths must be positive: {:?}",
            self.hidden_layers
        );
        anyhow::ensure!(
            self.mlp_tanh_scale > 0. && self.resnet_tanh_scale > 0.,
            "tanh scales must be positive"
        );
        anyhow::ensure!(
            self.linear_init_scale > 0. && self.mlp_init_scale > 0.,
            "init scales must be positive"
        );
        Ok(())
    }
}

/// Build a recognition network of the configured kind
///
/// # Arguments
/// * `n_latent` - latent dimension (n)
/// * `n_obs` - data dimension (p)
/// * `config` - recognition configuration
/// * `vs` - variable builder
pub fn build_recognition(
    n_latent: usize,
    n_obs: usize,
    config: &RecognitionConfig,
    vs: VarBuilder,
) -> anyhow::Result<Box<dyn RecognitionModuleT>> {
    config.validate()?;
    anyhow::ensure!(
        n_latent > 0 && n_obs > 0,
        "dimensions must be positive: (n, p) == ({}, {})",
        n_latent,
        n_obs
    );

    info!("building {} recognition", config.kind);

    let ret: Box<dyn RecognitionModuleT> = match config.kind {
        RecognitionKind::Linear => Box::new(LinearRecognition::new(
            n_latent,
            n_obs,
            config.linear_init_scale,
            vs,
        )?),
        RecognitionKind::Mlp => Box::new(MlpRecognition::new(
            n_latent,
            n_obs,
            &config.hidden_layers,
            config.mlp_init_scale,
            config.mlp_tanh_scale,
            vs,
        )?),
        RecognitionKind::ResNet => Box::new(ResNetRecognition::with_scales(
            n_latent,
            n_obs,
            &config.hidden_layers,
            config.identity_init,
            config.linear_init_scale,
            config.mlp_init_scale,
            config.resnet_tanh_scale,
            vs,
        )?),
    };
    Ok(ret)
}
