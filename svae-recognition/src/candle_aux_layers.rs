use candle_core::{Result, Tensor};
use candle_nn::Module;

/// build a stack of `M` layers, each followed by `tanh`
#[derive(Clone, Debug)]
pub struct StackLayers<M>
where
    M: Module,
{
    module_layers: Vec<M>,
}

impl<M> Module for StackLayers<M>
where
    M: Module,
{
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let mut x = input.clone();
        for module in self.module_layers.iter() {
            x = module.forward(&x)?.tanh()?;
        }
        Ok(x)
    }
}

impl<M> StackLayers<M>
where
    M: Module,
{
    pub fn new() -> Self {
        Self {
            module_layers: Vec::new(),
        }
    }

    /// Appends a tanh layer after all the current layers.
    pub fn push_tanh(&mut self, layer: M) {
        self.module_layers.push(layer);
    }

    pub fn len(&self) -> usize {
        self.module_layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.module_layers.is_empty()
    }
}

impl<M> Default for StackLayers<M>
where
    M: Module,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;
    use candle_nn::Linear;

    #[test]
    fn empty_stack_is_identity() -> Result<()> {
        let stack = StackLayers::<Linear>::new();
        let x = Tensor::new(&[[1f32, -2.], [3., 4.]], &Device::Cpu)?;
        let y = stack.forward(&x)?;
        assert!(stack.is_empty());
        assert_eq!(y.to_vec2::<f32>()?, x.to_vec2::<f32>()?);
        Ok(())
    }

    #[test]
    fn tanh_stack_is_bounded() -> Result<()> {
        let dev = Device::Cpu;
        let w = Tensor::new(&[[10f32, 0.], [0., -10.]], &dev)?;
        let b = Tensor::new(&[1f32, 1.], &dev)?;

        let mut stack = StackLayers::<Linear>::new();
        stack.push_tanh(Linear::new(w, Some(b)));
        assert_eq!(stack.len(), 1);

        let x = Tensor::new(&[[5f32, 5.], [-5., -5.]], &dev)?;
        let y = stack.forward(&x)?.flatten_all()?.to_vec1::<f32>()?;
        for v in y {
            assert!(v.abs() <= 1.0);
        }
        Ok(())
    }

    #[test]
    fn tanh_follows_each_layer() -> Result<()> {
        let dev = Device::Cpu;
        let w = Tensor::new(&[[1f64]], &dev)?;

        let mut stack = StackLayers::<Linear>::new();
        stack.push_tanh(Linear::new(w.clone(), None));
        stack.push_tanh(Linear::new(w, None));

        let x = Tensor::new(&[[0.5f64]], &dev)?;
        let y = stack.forward(&x)?.to_vec2::<f64>()?[0][0];
        assert!((y - 0.5f64.tanh().tanh()).abs() < 1e-12);
        Ok(())
    }
}
