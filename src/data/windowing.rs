// ============================================================
// Layer 4 — Series Windower
// ============================================================
// Slides a fixed-length window over a normalised series to
// build training samples.
//
// Example with seq_len=3, horizon=1 over rows r0..r5:
//   Sample 1:  window [r0 r1 r2]  target from r3
//   Sample 2:  window [r1 r2 r3]  target from r4
//   Sample 3:  window [r2 r3 r4]  target from r5
//
// Each sample carries:
//   - window:  seq_len rows of the feature columns
//   - non_seq: the static columns of the window's LAST row
//              (None when no static columns are configured)
//   - target:  the target column, `horizon` rows past the window
//
// The static vector is read at the window's last row because
// that is the most recent information available at prediction
// time — anything later would leak the future into the input.

use anyhow::Result;

use crate::data::dataset::SeqSample;
use crate::domain::series::Series;

pub struct Windower {
    /// Number of rows per input window
    seq_len: usize,
    /// How many rows past the window end the target sits
    horizon: usize,
}

impl Windower {
    /// # Panics
    /// Panics if seq_len or horizon is zero — both would make the
    /// window/target geometry meaningless.
    pub fn new(seq_len: usize, horizon: usize) -> Self {
        assert!(seq_len > 0, "seq_len must be positive");
        assert!(horizon > 0, "horizon must be positive");
        Self { seq_len, horizon }
    }

    /// Build every full window the series supports, oldest first.
    /// Returns an empty Vec when the series is shorter than
    /// seq_len + horizon rows.
    pub fn windows(
        &self,
        series:       &Series,
        feature_cols: &[String],
        target_col:   &str,
        static_cols:  &[String],
    ) -> Result<Vec<SeqSample>> {
        let features = series.select(feature_cols)?;
        let statics = if static_cols.is_empty() {
            None
        } else {
            Some(series.select(static_cols)?)
        };
        let target_idx = series.column_index(target_col)?;

        let total = series.len();
        if total < self.seq_len + self.horizon {
            tracing::warn!(
                "'{}' has {} rows, needs {} for one window — no samples",
                series.source, total, self.seq_len + self.horizon
            );
            return Ok(Vec::new());
        }

        let mut samples = Vec::with_capacity(total - self.seq_len - self.horizon + 1);
        for end in (self.seq_len - 1)..(total - self.horizon) {
            let start = end + 1 - self.seq_len;

            let window: Vec<Vec<f32>> = features[start..=end]
                .iter()
                .map(|row| row.iter().map(|&v| v as f32).collect())
                .collect();

            let non_seq = statics
                .as_ref()
                .map(|s| s[end].iter().map(|&v| v as f32).collect());

            let target = vec![series.rows[end + self.horizon][target_idx] as f32];

            samples.push(SeqSample { window, non_seq, target });
        }

        Ok(samples)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// 6 rows: close = 1..6, dow cycles 0..2
    fn sample_series() -> Series {
        Series::new(
            "test.csv",
            vec!["close".into(), "dow".into()],
            (0..6).map(|i| vec![(i + 1) as f64, (i % 3) as f64]).collect(),
        )
    }

    #[test]
    fn test_window_count_and_shapes() {
        let windower = Windower::new(3, 1);
        let samples = windower
            .windows(&sample_series(), &["close".into()], "close", &[])
            .unwrap();

        // 6 rows, seq_len 3, horizon 1 → 3 full windows
        assert_eq!(samples.len(), 3);
        for s in &samples {
            assert_eq!(s.window.len(), 3);
            assert_eq!(s.window[0].len(), 1);
            assert_eq!(s.target.len(), 1);
            assert!(s.non_seq.is_none());
        }
    }

    #[test]
    fn test_target_is_horizon_rows_past_window() {
        let windower = Windower::new(3, 2);
        let samples = windower
            .windows(&sample_series(), &["close".into()], "close", &[])
            .unwrap();

        // First window covers closes [1,2,3]; horizon 2 → target 5
        assert_eq!(samples[0].window, vec![vec![1.0], vec![2.0], vec![3.0]]);
        assert_eq!(samples[0].target, vec![5.0]);
    }

    #[test]
    fn test_static_vector_comes_from_last_window_row() {
        let windower = Windower::new(3, 1);
        let samples = windower
            .windows(&sample_series(), &["close".into()], "close", &["dow".into()])
            .unwrap();

        // First window ends at row 2 where dow = 2
        assert_eq!(samples[0].non_seq, Some(vec![2.0]));
        // Second window ends at row 3 where dow = 0
        assert_eq!(samples[1].non_seq, Some(vec![0.0]));
    }

    #[test]
    fn test_short_series_yields_no_samples() {
        let windower = Windower::new(5, 2);
        let samples = windower
            .windows(&sample_series(), &["close".into()], "close", &[])
            .unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_zero_seq_len_panics() {
        let _ = Windower::new(0, 1);
    }
}
