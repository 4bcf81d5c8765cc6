//! Fibonacci ratio templates and the XABCD ratio classifier
//!
//! Four ratios describe a quintuple:
//!
//! - `AB/XA = |B - A| / |A - X|`
//! - `BC/AB = |C - B| / |B - A|`
//! - `CD/BC = |D - C| / |C - B|`
//! - `AD/XA = |D - A| / |A - X|`
//!
//! Templates are tried in a fixed order and the first full match wins.

use serde::{Deserialize, Serialize};

use crate::{pivots::PivotPoint, HarmonicError, Result};

// ============================================================
// PATTERN KINDS
// ============================================================

/// Named XABCD pattern template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmonicKind {
    Gartley,
    Bat,
    Crab,
    Butterfly,
}

impl HarmonicKind {
    /// Classification order
    pub const ALL: [HarmonicKind; 4] = [
        HarmonicKind::Gartley,
        HarmonicKind::Bat,
        HarmonicKind::Crab,
        HarmonicKind::Butterfly,
    ];

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            HarmonicKind::Gartley => "Gartley",
            HarmonicKind::Bat => "Bat",
            HarmonicKind::Crab => "Crab",
            HarmonicKind::Butterfly => "Butterfly",
        }
    }

    #[inline]
    pub fn template(self) -> RatioTemplate {
        match self {
            HarmonicKind::Gartley => GARTLEY,
            HarmonicKind::Bat => BAT,
            HarmonicKind::Crab => CRAB,
            HarmonicKind::Butterfly => BUTTERFLY,
        }
    }
}

impl std::fmt::Display for HarmonicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================
// RATIOS
// ============================================================

/// The four dimensionless leg ratios of an XABCD quintuple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XabcdRatios {
    pub ab_xa: f64,
    pub bc_ab: f64,
    pub cd_bc: f64,
    pub ad_xa: f64,
}

impl XabcdRatios {
    /// Compute ratios from raw prices.
    ///
    /// Fails with [`HarmonicError::DegenerateGeometry`] when XA, AB or BC has
    /// zero (or non-finite) length.
    pub fn from_prices(x: f64, a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let xa = leg(x, a, "zero-length XA leg")?;
        let ab = leg(a, b, "zero-length AB leg")?;
        let bc = leg(b, c, "zero-length BC leg")?;

        Ok(Self {
            ab_xa: ab / xa,
            bc_ab: bc / ab,
            cd_bc: (d - c).abs() / bc,
            ad_xa: (d - a).abs() / xa,
        })
    }

    pub fn from_pivots(
        x: &PivotPoint,
        a: &PivotPoint,
        b: &PivotPoint,
        c: &PivotPoint,
        d: &PivotPoint,
    ) -> Result<Self> {
        Self::from_prices(x.price, a.price, b.price, c.price, d.price)
    }
}

#[inline]
fn leg(from: f64, to: f64, reason: &'static str) -> Result<f64> {
    let len = (to - from).abs();
    if len == 0.0 || !len.is_finite() {
        return Err(HarmonicError::DegenerateGeometry(reason));
    }
    Ok(len)
}

// ============================================================
// TEMPLATES
// ============================================================

/// Target ratio with an inclusive absolute tolerance band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioTarget {
    pub target: f64,
    pub tolerance: f64,
}

impl RatioTarget {
    pub const fn new(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }

    /// `|value - target| <= tolerance`; NaN never matches
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        (value - self.target).abs() <= self.tolerance
    }
}

/// One named set of four ratio targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioTemplate {
    pub kind: HarmonicKind,
    pub ab_xa: RatioTarget,
    pub bc_ab: RatioTarget,
    pub cd_bc: RatioTarget,
    pub ad_xa: RatioTarget,
}

impl RatioTemplate {
    #[inline]
    pub fn matches(&self, ratios: &XabcdRatios) -> bool {
        self.ab_xa.contains(ratios.ab_xa)
            && self.bc_ab.contains(ratios.bc_ab)
            && self.cd_bc.contains(ratios.cd_bc)
            && self.ad_xa.contains(ratios.ad_xa)
    }
}

const TOL: f64 = 0.05;

pub const GARTLEY: RatioTemplate = RatioTemplate {
    kind: HarmonicKind::Gartley,
    ab_xa: RatioTarget::new(0.618, TOL),
    bc_ab: RatioTarget::new(0.382, TOL),
    cd_bc: RatioTarget::new(1.272, TOL),
    ad_xa: RatioTarget::new(0.786, TOL),
};

pub const BAT: RatioTemplate = RatioTemplate {
    kind: HarmonicKind::Bat,
    ab_xa: RatioTarget::new(0.382, TOL),
    bc_ab: RatioTarget::new(0.382, TOL),
    cd_bc: RatioTarget::new(1.618, TOL),
    ad_xa: RatioTarget::new(0.886, TOL),
};

/// Crab allows a wider CD/BC band
pub const CRAB: RatioTemplate = RatioTemplate {
    kind: HarmonicKind::Crab,
    ab_xa: RatioTarget::new(0.382, TOL),
    bc_ab: RatioTarget::new(0.382, TOL),
    cd_bc: RatioTarget::new(2.24, 0.10),
    ad_xa: RatioTarget::new(1.618, TOL),
};

pub const BUTTERFLY: RatioTemplate = RatioTemplate {
    kind: HarmonicKind::Butterfly,
    ab_xa: RatioTarget::new(0.786, TOL),
    bc_ab: RatioTarget::new(0.382, TOL),
    cd_bc: RatioTarget::new(1.618, TOL),
    ad_xa: RatioTarget::new(1.27, TOL),
};

// ============================================================
// CLASSIFIER
// ============================================================

/// Ordered template set; the first matching template names the quintuple
#[derive(Debug, Clone)]
pub struct RatioClassifier {
    templates: Vec<RatioTemplate>,
}

impl Default for RatioClassifier {
    fn default() -> Self {
        Self {
            templates: HarmonicKind::ALL.iter().map(|k| k.template()).collect(),
        }
    }
}

impl RatioClassifier {
    /// Restrict to the given kinds, keeping the fixed classification order
    pub fn with_kinds(kinds: &[HarmonicKind]) -> Self {
        Self {
            templates: HarmonicKind::ALL
                .iter()
                .filter(|k| kinds.contains(k))
                .map(|k| k.template())
                .collect(),
        }
    }

    #[inline]
    pub fn templates(&self) -> &[RatioTemplate] {
        &self.templates
    }

    /// Classify five prices. Degenerate geometry is an error, not a panic.
    pub fn classify(&self, x: f64, a: f64, b: f64, c: f64, d: f64) -> Result<Option<HarmonicKind>> {
        let ratios = XabcdRatios::from_prices(x, a, b, c, d)?;
        Ok(self.classify_ratios(&ratios))
    }

    #[inline]
    pub fn classify_ratios(&self, ratios: &XabcdRatios) -> Option<HarmonicKind> {
        self.templates
            .iter()
            .find(|t| t.matches(ratios))
            .map(|t| t.kind)
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(t: &RatioTemplate) -> XabcdRatios {
        XabcdRatios {
            ab_xa: t.ab_xa.target,
            bc_ab: t.bc_ab.target,
            cd_bc: t.cd_bc.target,
            ad_xa: t.ad_xa.target,
        }
    }

    #[test]
    fn test_each_template_matches_its_targets() {
        let classifier = RatioClassifier::default();
        for kind in HarmonicKind::ALL {
            assert_eq!(classifier.classify_ratios(&exact(&kind.template())), Some(kind));
        }
    }

    #[test]
    fn test_gartley_within_tolerance() {
        let ratios = XabcdRatios {
            ab_xa: 0.618 + 0.03,
            bc_ab: 0.382 - 0.03,
            cd_bc: 1.272 + 0.03,
            ad_xa: 0.786 - 0.03,
        };
        assert_eq!(
            RatioClassifier::default().classify_ratios(&ratios),
            Some(HarmonicKind::Gartley)
        );
    }

    #[test]
    fn test_single_ratio_out_of_tolerance() {
        let ratios = XabcdRatios {
            ab_xa: 0.618 + 0.06,
            ..exact(&GARTLEY)
        };
        assert_eq!(RatioClassifier::default().classify_ratios(&ratios), None);
    }

    #[test]
    fn test_crab_wider_cd_band() {
        let ratios = XabcdRatios {
            cd_bc: 2.24 + 0.08,
            ..exact(&CRAB)
        };
        assert_eq!(
            RatioClassifier::default().classify_ratios(&ratios),
            Some(HarmonicKind::Crab)
        );

        let too_far = XabcdRatios {
            cd_bc: 2.24 + 0.12,
            ..exact(&CRAB)
        };
        assert_eq!(RatioClassifier::default().classify_ratios(&too_far), None);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let target = RatioTarget::new(0.5, 0.25);
        assert!(target.contains(0.75));
        assert!(target.contains(0.25));
        assert!(!target.contains(0.75 + 1e-9));
        assert!(!target.contains(f64::NAN));
    }

    #[test]
    fn test_classify_from_prices() {
        // Bullish Gartley: AB/XA 0.66, BC/AB 0.43, CD/BC 1.32, AD/XA ~0.7508
        let (x, a) = (100.0, 200.0);
        let b = a - 66.0;
        let c = b + 0.43 * 66.0;
        let d = c - 1.32 * (c - b);
        let kind = RatioClassifier::default().classify(x, a, b, c, d).unwrap();
        assert_eq!(kind, Some(HarmonicKind::Gartley));
    }

    #[test]
    fn test_zero_xa_is_degenerate() {
        let err = XabcdRatios::from_prices(100.0, 100.0, 90.0, 95.0, 80.0).unwrap_err();
        assert!(matches!(err, HarmonicError::DegenerateGeometry(_)));
        assert!(RatioClassifier::default()
            .classify(100.0, 100.0, 90.0, 95.0, 80.0)
            .is_err());
    }

    #[test]
    fn test_nan_price_is_degenerate() {
        assert!(XabcdRatios::from_prices(f64::NAN, 100.0, 90.0, 95.0, 80.0).is_err());
    }

    #[test]
    fn test_filtered_classifier_keeps_order() {
        let classifier =
            RatioClassifier::with_kinds(&[HarmonicKind::Butterfly, HarmonicKind::Gartley]);
        let kinds: Vec<_> = classifier.templates().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![HarmonicKind::Gartley, HarmonicKind::Butterfly]);
        assert_eq!(classifier.classify_ratios(&exact(&BAT)), None);
    }
}
