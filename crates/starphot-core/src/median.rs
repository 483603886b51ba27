use std::cmp::Ordering;

/// Failure modes of [`median`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum MedianError {
    #[error("cannot take the median of an empty sample set")]
    Empty,
    #[error("non-finite sample at index {index}")]
    NonFinite { index: usize },
}

/// Sort `samples` in place and return their median.
///
/// An even count averages the two central values. Non-finite samples are
/// rejected before sorting so the ordering is always total.
pub fn median(samples: &mut [f64]) -> Result<f64, MedianError> {
    if samples.is_empty() {
        return Err(MedianError::Empty);
    }
    if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
        return Err(MedianError::NonFinite { index });
    }

    samples.sort_unstable_by(compare_finite);

    let n = samples.len();
    let mid = n / 2;
    if n % 2 == 0 {
        Ok((samples[mid - 1] + samples[mid]) / 2.0)
    } else {
        Ok(samples[mid])
    }
}

#[inline]
fn compare_finite(a: &f64, b: &f64) -> Ordering {
    if a > b {
        Ordering::Greater
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_count_averages_central_pair() {
        let mut v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut v), Ok(2.5));
        assert_eq!(v, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn odd_count_takes_central_value() {
        let mut v = [3.0, 1.0, 2.0];
        assert_eq!(median(&mut v), Ok(2.0));
        let mut single = [7.5];
        assert_eq!(median(&mut single), Ok(7.5));
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert_eq!(median(&mut []), Err(MedianError::Empty));
        let mut v = [1.0, f64::NAN, 2.0];
        assert_eq!(median(&mut v), Err(MedianError::NonFinite { index: 1 }));
        let mut v = [f64::INFINITY];
        assert_eq!(median(&mut v), Err(MedianError::NonFinite { index: 0 }));
    }
}
