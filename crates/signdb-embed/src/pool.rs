use anyhow::{anyhow, ensure, Result};
use candle_core::{DType, Tensor};

/// Mean of the unmasked token states followed by L2 normalization.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]`; returns `[B, H]`.
/// A row with no unmasked token pools to zeros.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _tokens, hidden_dim) =
        hidden.dims3().map_err(|_| anyhow!("hidden shape must be [B,T,H], got {:?}", hidden.dims()))?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;

    let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
    let counts = mask.sum_keepdim(1)?.maximum(1.0)?;
    let mean = summed.broadcast_div(&counts)?;

    let eps = if hidden.dtype() == DType::F16 { 1e-6 } else { 1e-12 };
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, eps)?;
    let pooled = mean.broadcast_div(&norm)?;
    ensure!(pooled.dims() == [batch, hidden_dim], "pooled shape mismatch: {:?}", pooled.dims());
    Ok(pooled)
}
