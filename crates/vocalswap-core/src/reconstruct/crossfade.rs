//! Equal-power joins between consecutive voice segments.

use std::f64::consts::FRAC_PI_2;

/// Fade-out and fade-in gains at position `t` in `[0, 1)`.
///
/// Cosine/sine curves keep the summed power constant across the overlap.
/// Only suitable for uncorrelated material; the two voices at a join are.
#[inline]
pub fn equal_power_gains(t: f64) -> (f64, f64) {
    let angle = t * FRAC_PI_2;
    (angle.cos(), angle.sin())
}

/// Blends `outgoing` into the first `overlap` samples of `incoming`.
///
/// `outgoing` is the previous voice carried on past its own segment end: it
/// fades out while `incoming` fades in, and `incoming` keeps its length and
/// its position on the timeline. The overlap is clamped to both lengths; an
/// effective overlap of zero leaves `incoming` untouched.
///
/// # Returns
/// Number of samples actually crossfaded.
pub fn crossfade_into(incoming: &mut [f64], outgoing: &[f64], overlap: usize) -> usize {
    let overlap = overlap.min(incoming.len()).min(outgoing.len());

    for (i, (sample, &previous)) in incoming[..overlap].iter_mut().zip(outgoing).enumerate() {
        let (fade_out, fade_in) = equal_power_gains(i as f64 / overlap as f64);
        *sample = previous * fade_out + *sample * fade_in;
    }

    overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_overlap_leaves_incoming() {
        let mut incoming = vec![3.0, 4.0];
        assert_eq!(crossfade_into(&mut incoming, &[1.0, 1.0], 0), 0);
        assert_eq!(incoming, vec![3.0, 4.0]);
    }

    #[test]
    fn test_no_outgoing_material() {
        let mut incoming = vec![0.5, 0.5];
        assert_eq!(crossfade_into(&mut incoming, &[], 10), 0);
        assert_eq!(incoming, vec![0.5, 0.5]);
    }

    #[test]
    fn test_overlap_fades_from_outgoing() {
        let mut incoming = vec![0.0; 8];
        let used = crossfade_into(&mut incoming, &[1.0; 8], 4);

        assert_eq!(used, 4);
        assert_eq!(incoming.len(), 8);
        // First blended sample is still fully the outgoing voice.
        assert_eq!(incoming[0], 1.0);
        assert!(incoming[1] < 1.0);
        assert!(incoming[3] < incoming[2]);
        assert!(incoming[4..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_overlap_clamped_to_shorter() {
        let mut incoming = vec![0.0; 2];
        assert_eq!(crossfade_into(&mut incoming, &[1.0; 3], 50), 2);

        let mut incoming = vec![0.0; 5];
        assert_eq!(crossfade_into(&mut incoming, &[1.0; 3], 50), 3);
        assert_eq!(incoming[3], 0.0);
    }

    #[test]
    fn test_equal_power_gains() {
        let (out, inc) = equal_power_gains(0.5);
        assert!((out * out + inc * inc - 1.0).abs() < 1e-12);
        assert_eq!(equal_power_gains(0.0), (1.0, 0.0));
    }
}
