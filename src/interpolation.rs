// Interpolation policies used by tabulated cross sections and distributions
use crate::error::CollisionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offset applied by the nudged cosine policies so that `mu = 1` stays finite.
pub const COSINE_NUDGE: f64 = 1e-10;

/// Tolerance used when clamping unit-base coordinates back onto `[0, 1]`.
pub const UNIT_BASE_TOL: f64 = 1e-3;

/// How an independent or dependent variable is transformed before a
/// linear interpolation is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Lin,
    Log,
    /// `ln(1 - mu + nudge)`
    LogCos { nudged: bool },
}

impl Scale {
    fn process(self, value: f64) -> f64 {
        match self {
            Scale::Lin => value,
            Scale::Log => value.ln(),
            Scale::LogCos { nudged } => (1.0 - value + nudge(nudged)).ln(),
        }
    }

    fn recover(self, processed: f64) -> f64 {
        match self {
            Scale::Lin => processed,
            Scale::Log => processed.exp(),
            Scale::LogCos { nudged } => 1.0 + nudge(nudged) - processed.exp(),
        }
    }
}

#[inline]
fn nudge(nudged: bool) -> f64 {
    if nudged {
        COSINE_NUDGE
    } else {
        0.0
    }
}

/// One-dimensional interpolation policy.
///
/// Names read dependent-then-independent: `LogLin` is log(y) against a
/// linear x, `LinLog` is linear y against log(x). The cosine variants treat
/// the independent variable as an angle cosine and work in `ln(1 - mu)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    LinLin,
    LinLog,
    LogLin,
    LogLog,
    LinLogCos,
    LogLogCos,
    LogNudgedLogCos,
}

const INTERPOLATION_NAMES: [(Interpolation, &str); 7] = [
    (Interpolation::LinLin, "LinLin"),
    (Interpolation::LinLog, "LinLog"),
    (Interpolation::LogLin, "LogLin"),
    (Interpolation::LogLog, "LogLog"),
    (Interpolation::LinLogCos, "LinLogCos"),
    (Interpolation::LogLogCos, "LogLogCos"),
    (Interpolation::LogNudgedLogCos, "LogNudgedLogCos"),
];

impl Interpolation {
    fn dep_scale(self) -> Scale {
        match self {
            Interpolation::LinLin | Interpolation::LinLog | Interpolation::LinLogCos => Scale::Lin,
            _ => Scale::Log,
        }
    }

    fn indep_scale(self) -> Scale {
        match self {
            Interpolation::LinLin | Interpolation::LogLin => Scale::Lin,
            Interpolation::LinLog | Interpolation::LogLog => Scale::Log,
            Interpolation::LinLogCos | Interpolation::LogLogCos => Scale::LogCos { nudged: false },
            Interpolation::LogNudgedLogCos => Scale::LogCos { nudged: true },
        }
    }

    pub fn name(self) -> &'static str {
        INTERPOLATION_NAMES
            .iter()
            .find(|(interp, _)| *interp == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }

    /// True if the independent variable is an angle cosine.
    pub fn is_cosine(self) -> bool {
        matches!(self.indep_scale(), Scale::LogCos { .. })
    }

    pub fn is_dep_log(self) -> bool {
        self.dep_scale() == Scale::Log
    }

    pub fn is_indep_log(self) -> bool {
        self.indep_scale() != Scale::Lin
    }

    /// The same policy with a linear dependent variable.
    pub fn with_linear_dep(self) -> Interpolation {
        match self {
            Interpolation::LogLin => Interpolation::LinLin,
            Interpolation::LogLog => Interpolation::LinLog,
            Interpolation::LogLogCos | Interpolation::LogNudgedLogCos => Interpolation::LinLogCos,
            other => other,
        }
    }

    /// The same policy with a linear independent variable.
    pub fn with_linear_indep(self) -> Interpolation {
        match self {
            Interpolation::LinLog | Interpolation::LinLogCos => Interpolation::LinLin,
            Interpolation::LogLog | Interpolation::LogLogCos | Interpolation::LogNudgedLogCos => {
                Interpolation::LogLin
            }
            other => other,
        }
    }

    pub fn process_indep_var(self, x: f64) -> f64 {
        self.indep_scale().process(x)
    }

    pub fn recover_processed_indep_var(self, processed_x: f64) -> f64 {
        self.indep_scale().recover(processed_x)
    }

    pub fn process_dep_var(self, y: f64) -> f64 {
        self.dep_scale().process(y)
    }

    pub fn recover_processed_dep_var(self, processed_y: f64) -> f64 {
        self.dep_scale().recover(processed_y)
    }

    pub fn is_indep_var_in_valid_range(self, x: f64) -> bool {
        match self.indep_scale() {
            Scale::Lin => x.is_finite(),
            Scale::Log => x > 0.0 && x.is_finite(),
            Scale::LogCos { nudged: true } => (-1.0..=1.0).contains(&x),
            Scale::LogCos { nudged: false } => (-1.0..1.0).contains(&x),
        }
    }

    pub fn is_dep_var_in_valid_range(self, y: f64) -> bool {
        match self.dep_scale() {
            Scale::Log => y > 0.0 && y.is_finite(),
            _ => y.is_finite(),
        }
    }

    /// Smallest value the independent variable may take.
    pub fn indep_var_zero_value(self) -> f64 {
        match self.indep_scale() {
            Scale::Lin => f64::MIN,
            Scale::Log => f64::MIN_POSITIVE,
            Scale::LogCos { .. } => -1.0,
        }
    }

    /// Fraction of the way `x` lies through `[x0, x1]` in processed space.
    ///
    /// A zero-width bin (in raw or processed space) returns 0.
    pub fn bin_fraction(self, x0: f64, x1: f64, x: f64) -> f64 {
        if x1 == x0 {
            return 0.0;
        }
        let scale = self.indep_scale();
        let (px0, px1) = (scale.process(x0), scale.process(x1));
        let width = px1 - px0;
        if width == 0.0 || !width.is_finite() {
            return 0.0;
        }
        (scale.process(x) - px0) / width
    }

    /// Interpolate between `(x0, y0)` and `(x1, y1)` at `x`.
    ///
    /// A zero-width bin returns `y0`. A log dependent variable with a zero
    /// endpoint falls back to a linear dependent variable.
    pub fn interpolate(self, x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        if x1 == x0 || x == x0 {
            return y0;
        }
        if x == x1 {
            return y1;
        }
        let t = self.bin_fraction(x0, x1, x);
        match self.dep_scale() {
            Scale::Log if y0 > 0.0 && y1 > 0.0 => y0 * (y1 / y0).powf(t),
            _ => y0 + (y1 - y0) * t,
        }
    }

    /// Interpolate using values that are already in processed space.
    ///
    /// `slope` is `(py1 - py0)/(px1 - px0)`.
    pub fn interpolate_processed(self, processed_x0: f64, processed_x: f64, processed_y0: f64, slope: f64) -> f64 {
        self.recover_processed_dep_var(processed_y0 + slope * (processed_x - processed_x0))
    }

    /// Interpolate at a raw `x` given processed grid data.
    pub fn interpolate_from_processed(
        self,
        processed_x0: f64,
        processed_x1: f64,
        x: f64,
        processed_y0: f64,
        processed_y1: f64,
    ) -> f64 {
        let width = processed_x1 - processed_x0;
        if width == 0.0 {
            return self.recover_processed_dep_var(processed_y0);
        }
        let slope = (processed_y1 - processed_y0) / width;
        self.interpolate_processed(processed_x0, self.process_indep_var(x), processed_y0, slope)
    }

    /// Length of a grid in unit-base (processed) space. Always non-negative.
    pub fn calculate_unit_base_grid_length(self, x_min: f64, x_max: f64) -> f64 {
        let scale = self.indep_scale();
        (scale.process(x_max) - scale.process(x_min)).abs()
    }

    /// Map `x` onto `[0, 1]` relative to a grid starting at `x_min` with the
    /// given unit-base length. Values within [`UNIT_BASE_TOL`] of the unit
    /// interval are clamped onto it.
    pub fn calculate_unit_base_indep_var(self, x: f64, x_min: f64, grid_length: f64) -> f64 {
        if grid_length == 0.0 {
            return 0.0;
        }
        let scale = self.indep_scale();
        let delta = if self.is_cosine() {
            scale.process(x_min) - scale.process(x)
        } else {
            scale.process(x) - scale.process(x_min)
        };
        let eta = delta / grid_length;
        if eta < 0.0 && eta >= -UNIT_BASE_TOL {
            0.0
        } else if eta > 1.0 && eta <= 1.0 + UNIT_BASE_TOL {
            1.0
        } else {
            eta
        }
    }

    /// Inverse of [`Interpolation::calculate_unit_base_indep_var`].
    pub fn calculate_indep_var(self, eta: f64, x_min: f64, grid_length: f64) -> f64 {
        let scale = self.indep_scale();
        let processed_min = scale.process(x_min);
        if self.is_cosine() {
            scale.recover(processed_min - eta * grid_length)
        } else {
            scale.recover(processed_min + eta * grid_length)
        }
    }

    pub fn calculate_fuzzy_lower_bound(self, value: f64, tol: f64) -> f64 {
        if value == 0.0 {
            -tol
        } else {
            value - value.abs() * tol
        }
    }

    pub fn calculate_fuzzy_upper_bound(self, value: f64, tol: f64) -> f64 {
        if value == 0.0 {
            tol
        } else {
            value + value.abs() * tol
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Interpolation {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        INTERPOLATION_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(interp, _)| *interp)
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "interpolation",
                name: s.to_string(),
            })
    }
}

/// Two-dimensional interpolation policy, named Z-Y-X.
///
/// Z is the tabulated value, Y the secondary variable (e.g. the scattering
/// angle cosine) and X the primary variable (the incoming energy). The policy
/// is a pair of one-dimensional policies: ZY along each secondary table and
/// ZX across the primary grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwoDInterpolation {
    LinLinLin,
    LinLinLog,
    LinLogLin,
    LinLogLog,
    LogLinLin,
    LogLinLog,
    LogLogLin,
    LogLogLog,
    LinLogCosLog,
    LogLogCosLog,
    LogNudgedLogCosLog,
}

const TWO_D_INTERPOLATION_NAMES: [(TwoDInterpolation, &str); 11] = [
    (TwoDInterpolation::LinLinLin, "LinLinLin"),
    (TwoDInterpolation::LinLinLog, "LinLinLog"),
    (TwoDInterpolation::LinLogLin, "LinLogLin"),
    (TwoDInterpolation::LinLogLog, "LinLogLog"),
    (TwoDInterpolation::LogLinLin, "LogLinLin"),
    (TwoDInterpolation::LogLinLog, "LogLinLog"),
    (TwoDInterpolation::LogLogLin, "LogLogLin"),
    (TwoDInterpolation::LogLogLog, "LogLogLog"),
    (TwoDInterpolation::LinLogCosLog, "LinLogCosLog"),
    (TwoDInterpolation::LogLogCosLog, "LogLogCosLog"),
    (TwoDInterpolation::LogNudgedLogCosLog, "LogNudgedLogCosLog"),
];

impl TwoDInterpolation {
    /// Policy along the secondary variable.
    pub fn zy(self) -> Interpolation {
        use Interpolation::*;
        match self {
            TwoDInterpolation::LinLinLin | TwoDInterpolation::LinLinLog => LinLin,
            TwoDInterpolation::LinLogLin | TwoDInterpolation::LinLogLog => LinLog,
            TwoDInterpolation::LogLinLin | TwoDInterpolation::LogLinLog => LogLin,
            TwoDInterpolation::LogLogLin | TwoDInterpolation::LogLogLog => LogLog,
            TwoDInterpolation::LinLogCosLog => LinLogCos,
            TwoDInterpolation::LogLogCosLog => LogLogCos,
            TwoDInterpolation::LogNudgedLogCosLog => LogNudgedLogCos,
        }
    }

    /// Policy across the primary grid.
    pub fn zx(self) -> Interpolation {
        use Interpolation::*;
        match self {
            TwoDInterpolation::LinLinLin | TwoDInterpolation::LinLogLin => LinLin,
            TwoDInterpolation::LinLinLog
            | TwoDInterpolation::LinLogLog
            | TwoDInterpolation::LinLogCosLog => LinLog,
            TwoDInterpolation::LogLinLin | TwoDInterpolation::LogLogLin => LogLin,
            TwoDInterpolation::LogLinLog
            | TwoDInterpolation::LogLogLog
            | TwoDInterpolation::LogLogCosLog
            | TwoDInterpolation::LogNudgedLogCosLog => LogLog,
        }
    }

    /// True for the cosine-log policies that process the angle as `ln(1 - mu)`.
    pub fn is_cosine_log(self) -> bool {
        matches!(
            self,
            TwoDInterpolation::LogLogCosLog | TwoDInterpolation::LogNudgedLogCosLog
        )
    }

    pub fn name(self) -> &'static str {
        TWO_D_INTERPOLATION_NAMES
            .iter()
            .find(|(interp, _)| *interp == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }

    /// Fraction of the way `x` lies through the primary bin `[x0, x1]`.
    pub fn primary_weight(self, x0: f64, x1: f64, x: f64) -> f64 {
        self.zx().bin_fraction(x0, x1, x).clamp(0.0, 1.0)
    }

    /// Interpolate tabulated values across the primary grid.
    pub fn interpolate_primary(self, x0: f64, x1: f64, x: f64, z0: f64, z1: f64) -> f64 {
        self.zx().interpolate(x0, x1, x, z0, z1)
    }

    /// Interpolate secondary-variable values (e.g. two sampled angles) across
    /// the primary grid. The secondary variable is processed the way ZY
    /// processes it and weighted by the processed primary fraction.
    pub fn interpolate_secondary(self, x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        if y0 == y1 {
            return y0;
        }
        let t = self.primary_weight(x0, x1, x);
        let zy = self.zy();
        let (py0, py1) = (zy.process_indep_var(y0), zy.process_indep_var(y1));
        if !py0.is_finite() || !py1.is_finite() {
            return y0 + (y1 - y0) * t;
        }
        zy.recover_processed_indep_var(py0 + (py1 - py0) * t)
    }
}

impl fmt::Display for TwoDInterpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TwoDInterpolation {
    type Err = CollisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TWO_D_INTERPOLATION_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(interp, _)| *interp)
            .ok_or_else(|| CollisionError::UnknownName {
                kind: "2D interpolation",
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Interpolation; 7] = [
        Interpolation::LinLin,
        Interpolation::LinLog,
        Interpolation::LogLin,
        Interpolation::LogLog,
        Interpolation::LinLogCos,
        Interpolation::LogLogCos,
        Interpolation::LogNudgedLogCos,
    ];

    #[test]
    fn test_lin_lin() {
        let y = Interpolation::LinLin.interpolate(2.0, 4.0, 3.0, 10.0, 20.0);
        assert!((y - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_log() {
        // y = x^2 is exact under log-log interpolation
        let y = Interpolation::LogLog.interpolate(1.0, 10.0, 3.0, 1.0, 100.0);
        assert!((y - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_lin_log() {
        // y = ln(x) is exact under lin-log interpolation
        let y = Interpolation::LinLog.interpolate(1.0, 100.0, 10.0, 0.0, 100f64.ln());
        assert!((y - 10f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_log_lin() {
        // y = e^x is exact under log-lin interpolation
        let y = Interpolation::LogLin.interpolate(0.0, 2.0, 1.0, 1.0, 2f64.exp());
        assert!((y - 1f64.exp()).abs() < 1e-12);
    }

    #[test]
    fn test_log_log_cos() {
        // y = (1 - mu)^-1 is exact under log-logcos interpolation
        let f = |mu: f64| 1.0 / (1.0 - mu);
        let y = Interpolation::LogLogCos.interpolate(-1.0, 0.9, 0.5, f(-1.0), f(0.9));
        assert!((y - f(0.5)).abs() < 1e-10);
    }

    #[test]
    fn test_zero_width_bin_returns_lower_value() {
        for interp in ALL {
            assert_eq!(interp.interpolate(0.5, 0.5, 0.5, 3.0, 7.0), 3.0, "{}", interp);
        }
    }

    #[test]
    fn test_log_dep_with_zero_endpoint_is_linear() {
        let y = Interpolation::LogLog.interpolate(1.0, 3.0, 2.0, 0.0, 4.0);
        assert!(y.is_finite());
        let expected = 4.0 * (2f64.ln() / 3f64.ln());
        assert!((y - expected).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_is_monotonic() {
        for interp in ALL {
            let (x0, x1) = if interp.is_cosine() { (-0.9, 0.9) } else { (1.0, 5.0) };
            let (y0, y1) = (2.0, 7.0);
            for i in 0..=20 {
                let x = x0 + (x1 - x0) * i as f64 / 20.0;
                let y = interp.interpolate(x0, x1, x, y0, y1);
                assert!(y >= y0 - 1e-12 && y <= y1 + 1e-12, "{} gave {} at {}", interp, y, x);
            }
        }
    }

    #[test]
    fn test_process_round_trip() {
        for interp in ALL {
            let x = if interp.is_cosine() { 0.3 } else { 2.5 };
            let px = interp.process_indep_var(x);
            assert!((interp.recover_processed_indep_var(px) - x).abs() < 1e-12);
            assert!((interp.process_indep_var(interp.recover_processed_indep_var(px)) - px).abs() < 1e-12);
            let py = interp.process_dep_var(4.0);
            assert!((interp.recover_processed_dep_var(py) - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_processed_interpolation_matches_raw() {
        for interp in [Interpolation::LinLin, Interpolation::LogLog, Interpolation::LinLog, Interpolation::LogLin] {
            let (x0, x1, y0, y1) = (1.0, 4.0, 3.0, 12.0);
            let raw = interp.interpolate(x0, x1, 2.0, y0, y1);
            let processed = interp.interpolate_from_processed(
                interp.process_indep_var(x0),
                interp.process_indep_var(x1),
                2.0,
                interp.process_dep_var(y0),
                interp.process_dep_var(y1),
            );
            assert!((raw - processed).abs() < 1e-10, "{}", interp);
        }
    }

    #[test]
    fn test_valid_ranges() {
        assert!(!Interpolation::LogLog.is_indep_var_in_valid_range(0.0));
        assert!(Interpolation::LogLog.is_indep_var_in_valid_range(1e-5));
        assert!(!Interpolation::LogLin.is_dep_var_in_valid_range(0.0));
        assert!(Interpolation::LinLog.is_dep_var_in_valid_range(0.0));
        assert!(!Interpolation::LogLogCos.is_indep_var_in_valid_range(1.0));
        assert!(Interpolation::LogNudgedLogCos.is_indep_var_in_valid_range(1.0));
        assert!(!Interpolation::LinLogCos.is_indep_var_in_valid_range(-1.5));
    }

    #[test]
    fn test_unit_base_round_trip() {
        for interp in ALL {
            let (min, max, x) = if interp.is_cosine() { (-1.0, 0.9, 0.2) } else { (1.0, 9.0, 3.0) };
            let length = interp.calculate_unit_base_grid_length(min, max);
            assert!(length > 0.0);
            let eta = interp.calculate_unit_base_indep_var(x, min, length);
            assert!(eta > 0.0 && eta < 1.0, "{} eta {}", interp, eta);
            let back = interp.calculate_indep_var(eta, min, length);
            assert!((back - x).abs() < 1e-10, "{}", interp);
            assert_eq!(interp.calculate_unit_base_indep_var(max, min, length).round(), 1.0);
        }
    }

    #[test]
    fn test_unit_base_clamps_within_tolerance() {
        let interp = Interpolation::LinLin;
        let eta = interp.calculate_unit_base_indep_var(10.0005, 0.0, 10.0);
        assert_eq!(eta, 1.0);
        let eta = interp.calculate_unit_base_indep_var(-0.005, 0.0, 10.0);
        assert_eq!(eta, 0.0);
    }

    #[test]
    fn test_fuzzy_bounds() {
        let interp = Interpolation::LinLin;
        assert!((interp.calculate_fuzzy_lower_bound(2.0, 1e-3) - 1.998).abs() < 1e-12);
        assert!((interp.calculate_fuzzy_upper_bound(2.0, 1e-3) - 2.002).abs() < 1e-12);
        assert!((interp.calculate_fuzzy_lower_bound(-1.0, 1e-3) + 1.001).abs() < 1e-12);
    }

    #[test]
    fn test_names_round_trip() {
        for interp in ALL {
            assert_eq!(interp.name().parse::<Interpolation>().unwrap(), interp);
        }
        assert!("LinCubic".parse::<Interpolation>().is_err());
        assert_eq!(
            "LogLogCosLog".parse::<TwoDInterpolation>().unwrap(),
            TwoDInterpolation::LogLogCosLog
        );
        assert!("Nope".parse::<TwoDInterpolation>().is_err());
    }

    #[test]
    fn test_two_d_composition() {
        assert_eq!(TwoDInterpolation::LogLogCosLog.zy(), Interpolation::LogLogCos);
        assert_eq!(TwoDInterpolation::LogLogCosLog.zx(), Interpolation::LogLog);
        assert_eq!(TwoDInterpolation::LinLinLog.zy(), Interpolation::LinLin);
        assert_eq!(TwoDInterpolation::LinLinLog.zx(), Interpolation::LinLog);
        assert_eq!(TwoDInterpolation::LogLinLin.zx(), Interpolation::LogLin);
        assert_eq!(TwoDInterpolation::LogNudgedLogCosLog.zy(), Interpolation::LogNudgedLogCos);
        assert!(TwoDInterpolation::LogNudgedLogCosLog.is_cosine_log());
        assert!(!TwoDInterpolation::LogLogLog.is_cosine_log());
    }

    #[test]
    fn test_two_d_secondary_interpolation() {
        let interp = TwoDInterpolation::LinLinLin;
        let mu = interp.interpolate_secondary(1.0, 3.0, 2.0, 0.2, 0.6);
        assert!((mu - 0.4).abs() < 1e-12);
        let weight = TwoDInterpolation::LogLogLog.primary_weight(1.0, 100.0, 10.0);
        assert!((weight - 0.5).abs() < 1e-12);
    }
}
