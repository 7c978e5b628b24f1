//! Recognition networks for structured variational autoencoders.
//!
//! A recognition network maps an observed sequence `x` (T x p) to Gaussian
//! natural-parameter potentials over the latent states (T x n), which serve
//! as the data term of amortized inference in a linear dynamical system.
//!
//! Size conventions:
//! * `T` - length of the data sequence
//! * `n` - latent dimension
//! * `p` - data dimension
//! * `K` - number of Monte Carlo samples
//!
//! so `x` is (T x p) and latent potentials are (T x n) or (T x K x n).
//!
//! # Example
//!
//! ```ignore
//! use candle_core::{DType, Device, Tensor};
//! use candle_nn::{VarBuilder, VarMap};
//! use svae_recognition::*;
//!
//! let varmap = VarMap::new();
//! let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
//! let config = RecognitionConfig::new(RecognitionKind::ResNet).with_hidden_layers(&[16]);
//! let recog = build_recognition(n, p, &config, vb)?;
//!
//! let pot = recog.recognize(&x_tp)?;
//! // hand (pot.neg_half_j, pot.h, pot.log_z) to LDS message passing
//! ```

pub mod candle_aux_layers;
pub mod candle_aux_linear;
pub mod candle_model_traits;
pub mod candle_potentials;
pub mod candle_recognition_config;
pub mod candle_recognition_linear;
pub mod candle_recognition_mlp;
pub mod candle_recognition_resnet;
pub mod candle_recognition_sideinfo;

pub use candle_model_traits::{RecognitionModuleT, SideInfoRecognitionT};
pub use candle_potentials::RecognitionPotentials;
pub use candle_recognition_config::{build_recognition, RecognitionConfig, RecognitionKind};
pub use candle_recognition_linear::LinearRecognition;
pub use candle_recognition_mlp::MlpRecognition;
pub use candle_recognition_resnet::ResNetRecognition;
pub use candle_recognition_sideinfo::{
    mlp_recognition_with_labels, split_trailing_labels, SideInfoRecognition,
};

pub use candle_core;
pub use candle_nn;
