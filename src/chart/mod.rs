//! Chart presentation state and render-surface lifecycle.
//!
//! A [`ChartState`] owns one rate schedule plus its floor/ceiling bounds and the
//! current [`DisplayMode`]. It derives display-ready datasets and holds at most
//! one live render surface. The state machine is:
//!
//! `Empty -> Rendered -> Rendered (toggle + re-render) -> Disposed`
//!
//! `Disposed` is terminal. The UI layer asks [`ChartState::needs_render`] after
//! each event and calls [`ChartState::render`] as a side effect; nothing here
//! depends on a particular UI toolkit.

use tracing::debug;

use crate::domain::{DisplayMode, RateSeries};
use crate::error::RenderError;

/// Display-ready series, all of the same length as the schedule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Datasets {
    pub series: Vec<f64>,
    pub floor_line: Vec<f64>,
    pub ceiling_line: Vec<f64>,
}

impl Datasets {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Min/max over all three lines, `None` when empty or non-finite.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self
            .series
            .iter()
            .chain(&self.floor_line)
            .chain(&self.ceiling_line)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
    }
}

/// Everything a surface needs to paint one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    /// Shared x-axis labels (schedule dates).
    pub labels: Vec<String>,
    pub datasets: Datasets,
    pub mode: DisplayMode,
}

/// An exclusively owned drawing context. Dropping it releases it.
pub trait RenderSurface {
    fn draw(&mut self, frame: &ChartFrame) -> Result<(), RenderError>;
}

/// Hands out fresh render surfaces.
pub trait SurfaceProvider {
    type Surface: RenderSurface;

    fn acquire(&mut self) -> Result<Self::Surface, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPhase {
    Empty,
    Rendered,
    Disposed,
}

#[derive(Debug)]
pub struct ChartState<S> {
    series: RateSeries,
    rate_floor: f64,
    rate_ceiling: f64,
    display_mode: DisplayMode,
    surface: Option<S>,
    phase: ChartPhase,
    dirty: bool,
}

impl<S> ChartState<S> {
    /// Start a chart view in decimal mode with no surface yet.
    pub fn present(series: RateSeries, rate_floor: f64, rate_ceiling: f64) -> Self {
        Self {
            series,
            rate_floor,
            rate_ceiling,
            display_mode: DisplayMode::Decimal,
            surface: None,
            phase: ChartPhase::Empty,
            dirty: true,
        }
    }

    pub fn toggle_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        self.dirty = true;
        self.display_mode
    }

    /// Replace the schedule (a new result arrived for this view).
    pub fn set_series(&mut self, series: RateSeries) {
        self.series = series;
        self.dirty = true;
    }

    pub fn set_bounds(&mut self, rate_floor: f64, rate_ceiling: f64) {
        self.rate_floor = rate_floor;
        self.rate_ceiling = rate_ceiling;
        self.dirty = true;
    }

    /// Force a redraw on the next UI pass (e.g. the chart area was resized).
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// True when state changed since the last successful render.
    pub fn needs_render(&self) -> bool {
        self.dirty && self.phase != ChartPhase::Disposed
    }

    pub fn derive_datasets(&self) -> Datasets {
        let k = self.display_mode.scale();
        let n = self.series.len();
        Datasets {
            series: self.series.iter().map(|p| p.rate * k).collect(),
            floor_line: vec![self.rate_floor * k; n],
            ceiling_line: vec![self.rate_ceiling * k; n],
        }
    }

    pub fn frame(&self) -> ChartFrame {
        ChartFrame {
            labels: self.series.iter().map(|p| p.date.clone()).collect(),
            datasets: self.derive_datasets(),
            mode: self.display_mode,
        }
    }

    /// Release the surface. The state cannot be rendered again afterwards.
    pub fn dispose(&mut self) {
        if self.phase != ChartPhase::Disposed {
            debug!("chart disposed");
        }
        drop(self.surface.take());
        self.phase = ChartPhase::Disposed;
        self.dirty = false;
    }

    pub fn series(&self) -> &RateSeries {
        &self.series
    }

    pub fn rate_floor(&self) -> f64 {
        self.rate_floor
    }

    pub fn rate_ceiling(&self) -> f64 {
        self.rate_ceiling
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn phase(&self) -> ChartPhase {
        self.phase
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }
}

impl<S: RenderSurface> ChartState<S> {
    /// Paint the current state onto a freshly acquired surface.
    ///
    /// Any previously held surface is released before the new one is acquired,
    /// so at most one is alive at a time. Fails without drawing once disposed.
    pub fn render<P>(&mut self, provider: &mut P) -> Result<(), RenderError>
    where
        P: SurfaceProvider<Surface = S>,
    {
        if self.phase == ChartPhase::Disposed {
            return Err(RenderError::Disposed);
        }

        drop(self.surface.take());
        // No retry: a failed attempt waits for the next state change.
        self.dirty = false;

        let mut surface = provider.acquire()?;
        surface.draw(&self.frame())?;

        debug!(
            points = self.series.len(),
            mode = self.display_mode.display_name(),
            "chart rendered"
        );
        self.surface = Some(surface);
        self.phase = ChartPhase::Rendered;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::domain::RatePoint;

    /// Tracks how many surfaces are alive and what was drawn.
    struct TestSurface {
        live: Rc<Cell<usize>>,
        drawn: Rc<Cell<usize>>,
    }

    impl RenderSurface for TestSurface {
        fn draw(&mut self, _frame: &ChartFrame) -> Result<(), RenderError> {
            self.drawn.set(self.drawn.get() + 1);
            Ok(())
        }
    }

    impl Drop for TestSurface {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    #[derive(Default)]
    struct TestProvider {
        live: Rc<Cell<usize>>,
        drawn: Rc<Cell<usize>>,
        acquired: usize,
        unavailable: bool,
    }

    impl SurfaceProvider for TestProvider {
        type Surface = TestSurface;

        fn acquire(&mut self) -> Result<TestSurface, RenderError> {
            if self.unavailable {
                return Err(RenderError::SurfaceUnavailable("no chart area".to_string()));
            }
            assert_eq!(self.live.get(), 0, "previous surface must be released first");
            self.acquired += 1;
            self.live.set(self.live.get() + 1);
            Ok(TestSurface {
                live: self.live.clone(),
                drawn: self.drawn.clone(),
            })
        }
    }

    fn series(rates: &[f64]) -> RateSeries {
        rates
            .iter()
            .enumerate()
            .map(|(i, &rate)| RatePoint {
                date: format!("2023-{:02}-01", i % 12 + 1),
                rate,
            })
            .collect()
    }

    #[test]
    fn present_then_derive_in_decimal_mode() {
        let state: ChartState<TestSurface> = ChartState::present(
            vec![
                RatePoint { date: "2023-01-01".to_string(), rate: 0.015 },
                RatePoint { date: "2023-02-01".to_string(), rate: 0.018 },
            ],
            0.01,
            0.05,
        );

        assert_eq!(state.display_mode(), DisplayMode::Decimal);
        assert_eq!(state.phase(), ChartPhase::Empty);
        assert!(state.surface().is_none());

        let ds = state.derive_datasets();
        assert_eq!(ds.series, vec![0.015, 0.018]);
        assert_eq!(ds.floor_line, vec![0.01, 0.01]);
        assert_eq!(ds.ceiling_line, vec![0.05, 0.05]);
    }

    #[test]
    fn percentage_mode_scales_everything() {
        let mut state: ChartState<TestSurface> = ChartState::present(series(&[0.015, 0.018]), 0.01, 0.05);
        state.toggle_mode();

        let ds = state.derive_datasets();
        assert_eq!(state.display_mode(), DisplayMode::Percentage);
        assert_relative_eq!(ds.series[0], 1.5, epsilon = 1e-12);
        assert_relative_eq!(ds.series[1], 1.8, epsilon = 1e-12);
        assert_relative_eq!(ds.floor_line[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(ds.ceiling_line[0], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_series_yields_empty_datasets() {
        let state: ChartState<TestSurface> = ChartState::present(Vec::new(), 0.01, 0.05);
        let ds = state.derive_datasets();
        assert!(ds.is_empty());
        assert!(ds.floor_line.is_empty());
        assert!(ds.ceiling_line.is_empty());
        assert_eq!(ds.value_range(), None);
    }

    #[test]
    fn value_range_spans_all_lines() {
        let state: ChartState<TestSurface> = ChartState::present(series(&[0.03, 0.02]), 0.01, 0.05);
        assert_eq!(state.derive_datasets().value_range(), Some((0.01, 0.05)));
    }

    #[test]
    fn repeated_renders_keep_one_live_surface() {
        let mut provider = TestProvider::default();
        let mut state = ChartState::present(series(&[0.02, 0.03, 0.04]), 0.01, 0.05);

        for i in 0..5 {
            if i % 2 == 1 {
                state.toggle_mode();
            }
            state.render(&mut provider).unwrap();
            assert_eq!(provider.live.get(), 1);
            assert_eq!(state.phase(), ChartPhase::Rendered);
        }
        assert_eq!(provider.acquired, 5);
        assert_eq!(provider.drawn.get(), 5);
    }

    #[test]
    fn state_changes_request_a_redraw() {
        let mut provider = TestProvider::default();
        let mut state = ChartState::present(series(&[0.02]), 0.01, 0.05);
        assert!(state.needs_render());

        state.render(&mut provider).unwrap();
        assert!(!state.needs_render());

        state.toggle_mode();
        assert!(state.needs_render());
        state.render(&mut provider).unwrap();

        state.set_series(series(&[0.02, 0.025]));
        assert!(state.needs_render());
        state.render(&mut provider).unwrap();

        state.set_bounds(0.0, 0.1);
        assert!(state.needs_render());
        // Still in percentage mode from the toggle above.
        assert_eq!(state.display_mode(), DisplayMode::Percentage);
        assert_relative_eq!(state.derive_datasets().ceiling_line[0], 10.0);
        state.render(&mut provider).unwrap();
        assert!(!state.needs_render());

        state.toggle_mode();
        assert_eq!(state.derive_datasets().ceiling_line, vec![0.1, 0.1]);
        state.render(&mut provider).unwrap();
        assert_eq!(provider.drawn.get(), 5);
        assert_eq!(provider.live.get(), 1);
    }

    #[test]
    fn dispose_releases_and_blocks_further_renders() {
        let mut provider = TestProvider::default();
        let mut state = ChartState::present(series(&[0.02]), 0.01, 0.05);
        state.render(&mut provider).unwrap();
        assert_eq!(provider.live.get(), 1);

        state.dispose();
        assert_eq!(provider.live.get(), 0);
        assert_eq!(state.phase(), ChartPhase::Disposed);
        assert!(!state.needs_render());

        state.toggle_mode();
        assert!(!state.needs_render());
        assert_eq!(state.render(&mut provider), Err(RenderError::Disposed));
        assert_eq!(provider.live.get(), 0);
        assert_eq!(provider.drawn.get(), 1);

        // Idempotent.
        state.dispose();
        assert_eq!(state.phase(), ChartPhase::Disposed);
    }

    #[test]
    fn dropping_state_releases_surface() {
        let mut provider = TestProvider::default();
        {
            let mut state = ChartState::present(series(&[0.02]), 0.01, 0.05);
            state.render(&mut provider).unwrap();
            assert_eq!(provider.live.get(), 1);
        }
        assert_eq!(provider.live.get(), 0);
    }

    #[test]
    fn unavailable_surface_fails_without_retry() {
        let mut provider = TestProvider::default();
        let mut state = ChartState::present(series(&[0.02]), 0.01, 0.05);
        state.render(&mut provider).unwrap();

        provider.unavailable = true;
        let err = state.render(&mut provider).unwrap_err();
        assert!(matches!(err, RenderError::SurfaceUnavailable(_)));
        // The old surface went away before the failed acquire.
        assert_eq!(provider.live.get(), 0);
        assert!(state.surface().is_none());
        assert!(!state.needs_render());
    }

    proptest! {
        #[test]
        fn percentage_is_exactly_hundredfold(
            rates in proptest::collection::vec(-0.5f64..0.5, 0..64),
            floor in -0.1f64..0.1,
            ceiling in 0.0f64..0.5,
        ) {
            let mut state: ChartState<TestSurface> = ChartState::present(series(&rates), floor, ceiling);
            let decimal = state.derive_datasets();
            state.toggle_mode();
            let pct = state.derive_datasets();

            prop_assert_eq!(pct.len(), rates.len());
            prop_assert_eq!(pct.floor_line.len(), rates.len());
            prop_assert_eq!(pct.ceiling_line.len(), rates.len());
            for i in 0..rates.len() {
                prop_assert_eq!(pct.series[i], decimal.series[i] * 100.0);
                prop_assert_eq!(pct.floor_line[i], decimal.floor_line[i] * 100.0);
                prop_assert_eq!(pct.ceiling_line[i], decimal.ceiling_line[i] * 100.0);
            }
        }

        #[test]
        fn double_toggle_is_identity(
            rates in proptest::collection::vec(0.0f64..0.2, 0..32),
        ) {
            let mut state: ChartState<TestSurface> = ChartState::present(series(&rates), 0.01, 0.05);
            let before = state.derive_datasets();
            state.toggle_mode();
            state.toggle_mode();
            prop_assert_eq!(state.display_mode(), DisplayMode::Decimal);
            prop_assert_eq!(state.derive_datasets(), before);
        }
    }
}
