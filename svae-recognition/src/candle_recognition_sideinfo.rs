use crate::candle_model_traits::*;
use crate::candle_potentials::RecognitionPotentials;
use crate::candle_recognition_mlp::MlpRecognition;
use candle_core::{DType, Result, Tensor};
use std::marker::PhantomData;

/// Splits augmented data into (data, side information)
pub type LabelSplitFn = fn(&Tensor) -> Result<(Tensor, Tensor)>;

/// Recognition over data that carries side information
///
/// `(x, aux) = split(xtilde)`, then `(recognize(x), aux)`
pub struct SideInfoRecognition<R, S, A> {
    recognition: R,
    split: S,
    _aux: PhantomData<fn() -> A>,
}

impl<R, S, A> SideInfoRecognitionT for SideInfoRecognition<R, S, A>
where
    R: RecognitionModuleT,
    S: Fn(&Tensor) -> Result<(Tensor, A)>,
{
    type Aux = A;

    fn recognize_with_aux(&self, xtilde: &Tensor) -> Result<(RecognitionPotentials, A)> {
        let (x, aux) = (self.split)(xtilde)?;
        let potentials = self.recognition.recognize(&x)?;
        Ok((potentials, aux))
    }
}

impl<R, S, A> SideInfoRecognition<R, S, A>
where
    R: RecognitionModuleT,
    S: Fn(&Tensor) -> Result<(Tensor, A)>,
{
    pub fn new(recognition: R, split: S) -> Self {
        Self {
            recognition,
            split,
            _aux: PhantomData,
        }
    }

    pub fn inner(&self) -> &R {
        &self.recognition
    }

    /// latent dimension of the wrapped recognition
    pub fn dim_latent(&self) -> usize {
        self.recognition.dim_latent()
    }
}

/// The last column holds integer labels; everything before it is data
///
/// # Returns `(x, labels)`
/// * `x` - (..., p)
/// * `labels` - (...) as `i64`, truncated toward zero (sign kept)
pub fn split_trailing_labels(xtilde: &Tensor) -> Result<(Tensor, Tensor)> {
    let rank = xtilde.rank();
    let d = match xtilde.dims().last() {
        Some(&d) if d >= 2 => d,
        _ => candle_core::bail!(
            "need data columns and a label column, but got {:?}",
            xtilde.shape()
        ),
    };
    let x = xtilde.narrow(rank - 1, 0, d - 1)?;
    let labels = xtilde
        .narrow(rank - 1, d - 1, 1)?
        .squeeze(rank - 1)?
        .to_dtype(DType::I64)?;
    Ok((x, labels))
}

/// MLP recognition over data with a trailing label column
pub fn mlp_recognition_with_labels(
    mlp: MlpRecognition,
) -> SideInfoRecognition<MlpRecognition, LabelSplitFn, Tensor> {
    SideInfoRecognition::new(mlp, split_trailing_labels as LabelSplitFn)
}
