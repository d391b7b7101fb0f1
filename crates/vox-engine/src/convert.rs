//! Rate conversion at the device edge, for hosts that cannot open a stream
//! at the buffer's own rate. The effects core never resamples this way.

/// Linear interpolation from `from` Hz to `to` Hz. Both rates must be
/// positive.
pub fn resample_linear(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || samples.is_empty() {
        return samples.to_vec();
    }
    let step = from as f64 / to as f64;
    let out_len = (samples.len() as f64 * to as f64 / from as f64).round() as usize;
    let last = samples.len() - 1;
    (0..out_len)
        .map(|j| {
            let pos = j as f64 * step;
            let idx = pos as usize;
            if idx >= last {
                return samples[last];
            }
            let frac = (pos - idx as f64) as f32;
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_rate_is_identity() {
        let s = [0.1, -0.2, 0.3];
        assert_eq!(resample_linear(&s, 22050, 22050), s);
    }

    #[test]
    fn upsampling_interpolates() {
        let out = resample_linear(&[0.0, 1.0], 8000, 16000);
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn downsampling_shortens() {
        let s: Vec<f32> = (0..8).map(|i| i as f32).collect();
        assert_eq!(resample_linear(&s, 48000, 24000), vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn duration_is_kept() {
        let s = vec![0.0; 22050];
        assert_eq!(resample_linear(&s, 22050, 48000).len(), 48000);
        assert!(resample_linear(&[], 22050, 48000).is_empty());
    }
}
