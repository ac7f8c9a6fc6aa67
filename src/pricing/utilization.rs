//! Marginal-cost pricing over CPU utilization.
//!
//! A curve gives the marginal price `p(u)` at utilization `u`. The price of an SLA is the
//! integral of `p` over the utilization interval the SLA occupies on the node, so splitting a
//! request into consecutive parts never changes the total price.

use serde::Deserialize;

use crate::core::error::ConfigurationError;
use crate::core::fog_node::FogNode;
use crate::core::sla::Sla;
use crate::pricing::interface::{utilization_interval, PricingStrategy};

pub trait MarginalPriceCurve {
    fn marginal_price(&self, utilization: f64) -> f64;

    /// Antiderivative of `marginal_price` with value 0 at utilization 0.
    fn antiderivative(&self, utilization: f64) -> f64;

    fn integral(&self, from: f64, to: f64) -> f64 {
        if from == to {
            return 0.0;
        }
        self.antiderivative(to) - self.antiderivative(from)
    }
}

/// `p(u) = initial_price + slope * u`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LinearCurve {
    pub initial_price: f64,
    pub slope: f64,
}

impl MarginalPriceCurve for LinearCurve {
    fn marginal_price(&self, utilization: f64) -> f64 {
        self.initial_price + self.slope * utilization
    }

    fn antiderivative(&self, utilization: f64) -> f64 {
        self.initial_price * utilization + self.slope * utilization * utilization / 2.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SlopeSegment {
    /// Utilization where the segment starts.
    pub from: f64,
    pub slope: f64,
}

/// Continuous marginal price whose slope changes at the segment breakpoints.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PiecewiseLinearCurve {
    pub initial_price: f64,
    pub segments: Vec<SlopeSegment>,
}

impl PiecewiseLinearCurve {
    fn validate(&self) -> Result<(), String> {
        match self.segments.first() {
            None => return Err("at least one segment is required".to_string()),
            Some(first) if first.from != 0.0 => {
                return Err(format!("first segment must start at 0, got {}", first.from))
            }
            _ => {}
        }
        for pair in self.segments.windows(2) {
            if pair[1].from <= pair[0].from {
                return Err(format!(
                    "segment breakpoints must be strictly increasing, got {} after {}",
                    pair[1].from, pair[0].from
                ));
            }
        }
        if let Some(segment) = self.segments.iter().find(|s| s.slope < 0.0) {
            return Err(format!(
                "negative slope {} at {} makes price decreasing",
                segment.slope, segment.from
            ));
        }
        Ok(())
    }

    /// End of the segment with index `idx`.
    fn segment_end(&self, idx: usize) -> f64 {
        self.segments
            .get(idx + 1)
            .map(|s| s.from)
            .unwrap_or(f64::INFINITY)
    }
}

impl MarginalPriceCurve for PiecewiseLinearCurve {
    fn marginal_price(&self, utilization: f64) -> f64 {
        let mut price = self.initial_price;
        for (idx, segment) in self.segments.iter().enumerate() {
            let end = self.segment_end(idx);
            if utilization <= end {
                return price + segment.slope * (utilization - segment.from);
            }
            price += segment.slope * (end - segment.from);
        }
        price
    }

    fn antiderivative(&self, utilization: f64) -> f64 {
        let mut total = 0.0;
        // marginal price at the start of the current segment
        let mut price = self.initial_price;
        for (idx, segment) in self.segments.iter().enumerate() {
            if utilization <= segment.from {
                break;
            }
            let end = self.segment_end(idx);
            let width = utilization.min(end) - segment.from;
            total += price * width + segment.slope * width * width / 2.0;
            if utilization <= end {
                break;
            }
            price += segment.slope * (end - segment.from);
        }
        total
    }
}

/// `p(u) = initial_price + max_price / (1 + exp(-steepness * (u - midpoint)))`
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogisticCurve {
    pub initial_price: f64,
    pub max_price: f64,
    pub steepness: f64,
    pub midpoint: f64,
}

/// `ln(1 + e^x)` without overflow for large `x`.
fn softplus(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

impl MarginalPriceCurve for LogisticCurve {
    fn marginal_price(&self, utilization: f64) -> f64 {
        self.initial_price
            + self.max_price / (1.0 + (-self.steepness * (utilization - self.midpoint)).exp())
    }

    fn antiderivative(&self, utilization: f64) -> f64 {
        let k = self.steepness;
        let shifted = |u: f64| softplus(k * (u - self.midpoint));
        self.initial_price * utilization
            + self.max_price / k * (shifted(utilization) - shifted(0.0))
    }
}

/// Pricing strategy integrating a marginal price curve over the utilization increment of the SLA.
pub struct UtilizationPricing<C: MarginalPriceCurve> {
    name: &'static str,
    curve: C,
}

impl<C: MarginalPriceCurve> UtilizationPricing<C> {
    pub fn new(name: &'static str, curve: C) -> Self {
        Self { name, curve }
    }
}

impl<C: MarginalPriceCurve> PricingStrategy for UtilizationPricing<C> {
    fn name(&self) -> &str {
        self.name
    }

    fn price(&self, node: &FogNode, sla: &Sla, _accumulated_latency: f64) -> f64 {
        let (before, after) = utilization_interval(node, sla);
        self.curve.integral(before, after)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(model: &str, config: &str) -> Result<T, ConfigurationError> {
    serde_yaml::from_str::<T>(config)
        .map_err(|e| ConfigurationError::InvalidPricing(format!("{}: {}", model, e)))
}

fn check_non_negative(model: &str, field: &str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigurationError::InvalidPricing(format!(
            "{}: {} must be finite and non-negative, got {}",
            model, field, value
        )));
    }
    Ok(())
}

impl UtilizationPricing<LinearCurve> {
    /// Expects `initial_price` and `slope` fields.
    pub fn linear_from_str(config: &str) -> Result<Self, ConfigurationError> {
        let curve: LinearCurve = parse("linear", config)?;
        check_non_negative("linear", "initial_price", curve.initial_price)?;
        if !curve.slope.is_finite() || curve.slope <= 0.0 {
            return Err(ConfigurationError::InvalidPricing(format!(
                "linear: slope must be finite and positive, got {}",
                curve.slope
            )));
        }
        Ok(Self::new("linear", curve))
    }
}

impl UtilizationPricing<PiecewiseLinearCurve> {
    /// Expects `initial_price` and a list of `segments` with `from` and `slope` fields.
    pub fn piecewise_linear_from_str(config: &str) -> Result<Self, ConfigurationError> {
        let curve: PiecewiseLinearCurve = parse("piecewise_linear", config)?;
        check_non_negative("piecewise_linear", "initial_price", curve.initial_price)?;
        curve
            .validate()
            .map_err(|e| ConfigurationError::InvalidPricing(format!("piecewise_linear: {}", e)))?;
        Ok(Self::new("piecewise_linear", curve))
    }
}

impl UtilizationPricing<LogisticCurve> {
    /// Expects `initial_price`, `max_price`, `steepness` and `midpoint` fields.
    pub fn logistic_from_str(config: &str) -> Result<Self, ConfigurationError> {
        let curve: LogisticCurve = parse("logistic", config)?;
        check_non_negative("logistic", "initial_price", curve.initial_price)?;
        check_non_negative("logistic", "max_price", curve.max_price)?;
        if !curve.steepness.is_finite() || curve.steepness <= 0.0 {
            return Err(ConfigurationError::InvalidPricing(format!(
                "logistic: steepness must be strictly positive, got {}",
                curve.steepness
            )));
        }
        if !curve.midpoint.is_finite() {
            return Err(ConfigurationError::InvalidPricing(
                "logistic: midpoint must be finite".to_string(),
            ));
        }
        Ok(Self::new("logistic", curve))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::fog_node::FogNode;
    use crate::core::sla::Sla;
    use crate::pricing::constant::ConstantPricing;
    use crate::pricing::interface::PricingStrategy;
    use crate::pricing::utilization::{
        LinearCurve, LogisticCurve, MarginalPriceCurve, PiecewiseLinearCurve, SlopeSegment,
        UtilizationPricing,
    };

    fn node_with_usage(cores_used: f64) -> FogNode {
        let mut node = FogNode::new(
            0,
            "node".to_string(),
            0,
            None,
            8.0,
            4096.0,
            Box::new(ConstantPricing::new(0.0)),
        );
        node.cores_used = cores_used;
        node
    }

    fn sla(core: f64) -> Sla {
        Sla::new(128.0, core, 50.0, 1000.0)
    }

    #[test]
    fn test_linear_price_is_integral_of_marginal_price() {
        let pricing = UtilizationPricing::new(
            "linear",
            LinearCurve {
                initial_price: 2.0,
                slope: 4.0,
            },
        );
        // u goes from 0.25 to 0.5: 2 * 0.25 + 4 / 2 * (0.25 - 0.0625) = 0.875
        let price = pricing.price(&node_with_usage(2.0), &sla(2.0), 0.0);
        assert!((price - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_zero_width_request_costs_nothing() {
        let linear = UtilizationPricing::linear_from_str("initial_price: 1.0\nslope: 2.0").unwrap();
        let logistic = UtilizationPricing::logistic_from_str(
            "initial_price: 1.0\nmax_price: 10.0\nsteepness: 12.0\nmidpoint: 0.7",
        )
        .unwrap();
        let node = node_with_usage(3.0);
        assert_eq!(linear.price(&node, &sla(0.0), 0.0), 0.0);
        assert_eq!(logistic.price(&node, &sla(0.0), 0.0), 0.0);
    }

    #[test]
    fn test_piecewise_matches_linear_with_single_segment() {
        let linear = LinearCurve {
            initial_price: 1.5,
            slope: 3.0,
        };
        let piecewise = PiecewiseLinearCurve {
            initial_price: 1.5,
            segments: vec![SlopeSegment {
                from: 0.0,
                slope: 3.0,
            }],
        };
        for (from, to) in [(0.0, 0.3), (0.2, 0.9), (0.5, 1.0)] {
            assert!((linear.integral(from, to) - piecewise.integral(from, to)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_piecewise_marginal_price_is_continuous() {
        let curve = PiecewiseLinearCurve {
            initial_price: 1.0,
            segments: vec![
                SlopeSegment {
                    from: 0.0,
                    slope: 1.0,
                },
                SlopeSegment {
                    from: 0.5,
                    slope: 10.0,
                },
            ],
        };
        assert!((curve.marginal_price(0.5) - 1.5).abs() < 1e-12);
        assert!((curve.marginal_price(0.6) - 2.5).abs() < 1e-12);
        // 0..0.5: 1 * 0.5 + 1 * 0.125 = 0.625, 0.5..0.6: 1.5 * 0.1 + 10 * 0.005 = 0.2
        assert!((curve.antiderivative(0.6) - 0.825).abs() < 1e-12);
    }

    #[test]
    fn test_linear_requires_positive_slope() {
        assert!(UtilizationPricing::linear_from_str("initial_price: 1.0\nslope: 0.0").is_err());
        assert!(UtilizationPricing::linear_from_str("initial_price: 1.0\nslope: -1.0").is_err());
        assert!(UtilizationPricing::linear_from_str("initial_price: 0.0\nslope: 0.5").is_ok());
    }

    #[test]
    fn test_piecewise_validation() {
        assert!(UtilizationPricing::piecewise_linear_from_str(
            "initial_price: 1.0\nsegments: []"
        )
        .is_err());
        assert!(UtilizationPricing::piecewise_linear_from_str(
            "initial_price: 1.0\nsegments:\n- from: 0.1\n  slope: 1.0"
        )
        .is_err());
        assert!(UtilizationPricing::piecewise_linear_from_str(
            "initial_price: 1.0\nsegments:\n- from: 0.0\n  slope: 1.0\n- from: 0.5\n  slope: -1.0"
        )
        .is_err());
        assert!(UtilizationPricing::piecewise_linear_from_str(
            "initial_price: 1.0\nsegments:\n- from: 0.0\n  slope: 1.0\n- from: 0.5\n  slope: 5.0"
        )
        .is_ok());
    }

    #[test]
    fn test_logistic_is_cheap_when_idle_and_expensive_when_full() {
        let curve = LogisticCurve {
            initial_price: 0.0,
            max_price: 100.0,
            steepness: 20.0,
            midpoint: 0.8,
        };
        let low = curve.integral(0.0, 0.1);
        let high = curve.integral(0.9, 1.0);
        assert!(low < 0.1);
        assert!(high > 5.0);

        // numeric integration agrees with the closed form
        let steps = 10_000;
        let width = 0.1 / steps as f64;
        let numeric: f64 = (0..steps)
            .map(|i| curve.marginal_price(0.9 + (i as f64 + 0.5) * width) * width)
            .sum();
        assert!((numeric - high).abs() < 1e-6);
    }
}
