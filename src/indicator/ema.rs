use super::window::RollingWindow;

/// Smoothing factor `2 / (period + 1)`.
pub fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Single-step EMA approximation over a full window:
/// `latest * k + mean(window) * (1 - k)` with `k = 2 / (period + 1)`.
///
/// Recomputed from the raw window each call; there is no carried state, so
/// this is not the recursive EMA series.
pub fn blended_ema(window: &RollingWindow, period: usize) -> Option<f64> {
    if !window.is_full() {
        return None;
    }
    let latest = window.latest()?;
    let mean = window.mean()?;
    let k = smoothing(period);
    Some(latest * k + mean * (1.0 - k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_until_window_full() {
        let mut w = RollingWindow::new(3);
        w.push(1.0);
        w.push(2.0);
        assert_eq!(blended_ema(&w, 3), None);
        w.push(3.0);
        assert!(blended_ema(&w, 3).is_some());
    }

    #[test]
    fn blends_latest_with_window_mean() {
        let mut w = RollingWindow::new(3);
        for v in [100.0, 100.0, 200.0] {
            w.push(v);
        }
        // k = 0.5, mean = 133.33..
        let v = blended_ema(&w, 3).unwrap();
        assert!((v - (200.0 * 0.5 + (400.0 / 3.0) * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn smoothing_factor() {
        assert!((smoothing(1) - 1.0).abs() < f64::EPSILON);
        assert!((smoothing(3) - 0.5).abs() < f64::EPSILON);
    }
}
