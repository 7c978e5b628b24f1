use candle_core::{Result, Tensor};

/// Gaussian natural-parameter potentials over a latent sequence
///
/// One un-normalized factor per timestep (and per sample, if batched):
///
/// `psi(z) = <neg_half_j, z^2> + <h, z> - log_z`
///
/// * `neg_half_j` - quadratic term `-J/2` with diagonal precision `J` (... x n)
/// * `h` - linear term `J * mu` (... x n)
/// * `log_z` - log-normalizer (...)
#[derive(Clone, Debug)]
pub struct RecognitionPotentials {
    pub neg_half_j: Tensor,
    pub h: Tensor,
    pub log_z: Tensor,
}

impl RecognitionPotentials {
    pub fn new(neg_half_j: Tensor, h: Tensor, log_z: Tensor) -> Result<Self> {
        if neg_half_j.dims() != h.dims() {
            candle_core::bail!(
                "quadratic {:?} and linear {:?} terms must share a shape",
                neg_half_j.shape(),
                h.shape()
            );
        }
        if neg_half_j.rank() == 0 {
            candle_core::bail!("potentials need at least a latent dimension");
        }
        let leading = &neg_half_j.dims()[..neg_half_j.rank() - 1];
        if log_z.dims() != leading {
            candle_core::bail!(
                "log-normalizer {:?} should have shape {:?}",
                log_z.shape(),
                leading
            );
        }
        Ok(Self {
            neg_half_j,
            h,
            log_z,
        })
    }

    /// Natural parameters of independent Gaussians `N(mean, var)`
    ///
    /// `J = 1/var`, `h = J * mean`, and `log_z = 0`
    ///
    /// * `mean_tn` - mean (... x n)
    /// * `var_tn` - variance, broadcastable to `mean_tn`
    pub fn from_mean_var(mean_tn: &Tensor, var_tn: &Tensor) -> Result<Self> {
        let j_tn = var_tn.broadcast_as(mean_tn.shape())?.recip()?;
        let h_tn = (&j_tn * mean_tn)?;
        let neg_half_j_tn = (j_tn * -0.5)?;
        let leading = mean_tn.dims()[..mean_tn.rank().saturating_sub(1)].to_vec();
        let log_z_t = Tensor::zeros(leading, mean_tn.dtype(), mean_tn.device())?;
        Self::new(neg_half_j_tn, h_tn, log_z_t)
    }

    pub fn dim_latent(&self) -> usize {
        self.neg_half_j.dims().last().copied().unwrap_or(0)
    }

    /// timesteps and, if batched, samples
    pub fn leading_dims(&self) -> &[usize] {
        self.log_z.dims()
    }

    /// diagonal precision `J = -2 * neg_half_j`
    pub fn precision(&self) -> Result<Tensor> {
        self.neg_half_j.affine(-2., 0.)
    }

    /// `mu = h / J`
    pub fn mean(&self) -> Result<Tensor> {
        self.h.div(&self.precision()?)
    }

    /// `sigma^2 = 1 / J`
    pub fn variance(&self) -> Result<Tensor> {
        self.precision()?.recip()
    }

    /// Multiply two factors, i.e., add their natural parameters
    pub fn add(&self, other: &Self) -> Result<Self> {
        Self::new(
            (&self.neg_half_j + &other.neg_half_j)?,
            (&self.h + &other.h)?,
            (&self.log_z + &other.log_z)?,
        )
    }

    /// Restore leading dimensions after a flattened evaluation
    pub fn reshape_leading(&self, leading: &[usize]) -> Result<Self> {
        let mut shape = leading.to_vec();
        shape.push(self.dim_latent());
        Self::new(
            self.neg_half_j.reshape(shape.clone())?,
            self.h.reshape(shape)?,
            self.log_z.reshape(leading.to_vec())?,
        )
    }

    pub fn into_parts(self) -> (Tensor, Tensor, Tensor) {
        (self.neg_half_j, self.h, self.log_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn mean_var_round_trip() -> Result<()> {
        let dev = Device::Cpu;
        let mean = Tensor::new(&[[1f32, -2.], [0.5, 3.]], &dev)?;
        let var = Tensor::new(&[4f32, 0.25], &dev)?;

        let pot = RecognitionPotentials::from_mean_var(&mean, &var)?;

        assert_eq!(pot.leading_dims(), &[2]);
        assert_eq!(pot.dim_latent(), 2);
        assert_eq!(
            pot.neg_half_j.to_vec2::<f32>()?,
            vec![vec![-0.125, -2.], vec![-0.125, -2.]]
        );
        assert_eq!(pot.h.to_vec2::<f32>()?, vec![vec![0.25, -8.], vec![0.125, 12.]]);
        assert_eq!(pot.mean()?.to_vec2::<f32>()?, mean.to_vec2::<f32>()?);
        assert_eq!(
            pot.variance()?.to_vec2::<f32>()?,
            vec![vec![4., 0.25], vec![4., 0.25]]
        );
        assert_eq!(pot.log_z.to_vec1::<f32>()?, vec![0., 0.]);
        Ok(())
    }

    #[test]
    fn add_is_elementwise() -> Result<()> {
        let dev = Device::Cpu;
        let a = RecognitionPotentials::new(
            Tensor::new(&[[-1f32, -2.]], &dev)?,
            Tensor::new(&[[1f32, 2.]], &dev)?,
            Tensor::new(&[0.5f32], &dev)?,
        )?;
        let b = a.add(&a)?;
        assert_eq!(b.neg_half_j.to_vec2::<f32>()?, vec![vec![-2., -4.]]);
        assert_eq!(b.h.to_vec2::<f32>()?, vec![vec![2., 4.]]);
        assert_eq!(b.log_z.to_vec1::<f32>()?, vec![1.]);
        Ok(())
    }

    #[test]
    fn mismatched_shapes_are_rejected() -> Result<()> {
        let dev = Device::Cpu;
        let j = Tensor::zeros((3, 2), DType::F32, &dev)?;
        let h = Tensor::zeros((3, 4), DType::F32, &dev)?;
        let z = Tensor::zeros(3, DType::F32, &dev)?;
        assert!(RecognitionPotentials::new(j.clone(), h, z).is_err());

        let bad_z = Tensor::zeros(2, DType::F32, &dev)?;
        assert!(RecognitionPotentials::new(j.clone(), j, bad_z).is_err());
        Ok(())
    }

    #[test]
    fn reshape_restores_batch() -> Result<()> {
        let dev = Device::Cpu;
        let mean = Tensor::zeros((6, 3), DType::F32, &dev)?;
        let var = Tensor::ones((6, 3), DType::F32, &dev)?;
        let pot = RecognitionPotentials::from_mean_var(&mean, &var)?.reshape_leading(&[2, 3])?;
        assert_eq!(pot.neg_half_j.dims(), &[2, 3, 3]);
        assert_eq!(pot.h.dims(), &[2, 3, 3]);
        assert_eq!(pot.log_z.dims(), &[2, 3]);
        Ok(())
    }
}
