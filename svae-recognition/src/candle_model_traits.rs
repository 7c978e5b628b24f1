use crate::candle_potentials::RecognitionPotentials;
use candle_core::{Result, Tensor};

pub trait RecognitionModuleT {
    /// A recognition network that maps data to Gaussian potentials
    /// over the latent states at each time point
    ///
    /// # Arguments
    /// * `x_tp` - observed data (T x p), or batched (T x K x p)
    ///
    /// # Returns `RecognitionPotentials`
    /// * `neg_half_j` - quadratic term (T x n) or (T x K x n)
    /// * `h` - linear term (T x n) or (T x K x n)
    /// * `log_z` - log-normalizer (T) or (T x K)
    fn recognize(&self, x_tp: &Tensor) -> Result<RecognitionPotentials>;

    fn dim_obs(&self) -> usize;

    fn dim_latent(&self) -> usize;
}

impl<R> RecognitionModuleT for Box<R>
where
    R: RecognitionModuleT + ?Sized,
{
    fn recognize(&self, x_tp: &Tensor) -> Result<RecognitionPotentials> {
        self.as_ref().recognize(x_tp)
    }

    fn dim_obs(&self) -> usize {
        self.as_ref().dim_obs()
    }

    fn dim_latent(&self) -> usize {
        self.as_ref().dim_latent()
    }
}

pub trait SideInfoRecognitionT {
    type Aux;

    /// Split side information off the augmented data and recognize the rest
    ///
    /// # Arguments
    /// * `xtilde` - data augmented with auxiliary columns
    ///
    /// # Returns `(potentials, aux)`
    fn recognize_with_aux(&self, xtilde: &Tensor) -> Result<(RecognitionPotentials, Self::Aux)>;
}

/// Flatten `(..., p)` into `(m, p)`, checking the last dimension
///
/// # Returns `(x_mp, leading_dims)`
pub(crate) fn flatten_leading(x: &Tensor, dim_obs: usize) -> Result<(Tensor, Vec<usize>)> {
    let dims = x.dims();
    match dims.last() {
        None => candle_core::bail!("recognition needs at least one data dimension"),
        Some(&p) if p != dim_obs => {
            candle_core::bail!("expected {} data columns, but got {:?}", dim_obs, x.shape())
        }
        Some(_) => {}
    }
    let leading = dims[..dims.len() - 1].to_vec();
    let m = leading.iter().product::<usize>();
    Ok((x.reshape((m, dim_obs))?, leading))
}
