//! ESG scoring over a farmer's sales.

use std::collections::HashSet;

use agri_core::models::esg::{
    EnvironmentalImpact, EsgAssessment, ImpactLevel, SalesLine, SocialImpact,
};
use agri_core::service::EsgScorer;

const FAIR_TRADE_PER_UNIT: f64 = 0.005;
const FAIR_TRADE_CAP: f64 = 0.95;
const CARBON_TONS_PER_UNIT: f64 = 0.002;
const HIGH_WATER_EFFICIENCY_QUANTITY: i64 = 1000;

/// Rule-based ESG calculator.
///
/// `environmental_override`, when set, replaces the derived carbon
/// reduction figure (tons) with an externally measured one.
#[derive(Debug, Clone, Copy, Default)]
pub struct EsgCalculator {
    pub environmental_override: Option<f64>,
}

impl EsgCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environmental_override(tons: f64) -> Self {
        Self {
            environmental_override: Some(tons),
        }
    }
}

impl EsgScorer for EsgCalculator {
    fn assess(&self, sales: &[SalesLine]) -> EsgAssessment {
        if sales.is_empty() {
            return EsgAssessment {
                esg_score: 0.0,
                social_impact: SocialImpact {
                    fair_trade_index: 0.0,
                    community_engagement: ImpactLevel::None,
                },
                environmental_impact: EnvironmentalImpact {
                    carbon_footprint_reduction_tons: 0.0,
                    water_usage_efficiency: ImpactLevel::None,
                },
            };
        }

        let total_quantity = sales
            .iter()
            .fold(0i64, |acc, s| acc.saturating_add(s.quantity.max(0)));
        let distinct = sales
            .iter()
            .map(|s| s.product_id)
            .collect::<HashSet<_>>()
            .len();

        let fair_trade_index = (total_quantity as f64 * FAIR_TRADE_PER_UNIT).min(FAIR_TRADE_CAP);
        let community_engagement = match distinct {
            d if d > 3 => ImpactLevel::High,
            d if d > 1 => ImpactLevel::Moderate,
            _ => ImpactLevel::Low,
        };
        let carbon = self
            .environmental_override
            .unwrap_or(total_quantity as f64 * CARBON_TONS_PER_UNIT);
        let water_usage_efficiency = if total_quantity > HIGH_WATER_EFFICIENCY_QUANTITY {
            ImpactLevel::High
        } else {
            ImpactLevel::Moderate
        };

        let raw = fair_trade_index * 50.0 + distinct as f64 * 10.0 + carbon * 20.0;
        let esg_score = if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 0.0 };

        EsgAssessment {
            esg_score,
            social_impact: SocialImpact {
                fair_trade_index,
                community_engagement,
            },
            environmental_impact: EnvironmentalImpact {
                carbon_footprint_reduction_tons: carbon,
                water_usage_efficiency,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn line(product_id: Uuid, quantity: i64) -> SalesLine {
        SalesLine {
            product_id,
            quantity,
        }
    }

    #[test]
    fn no_sales_scores_zero() {
        let a = EsgCalculator::new().assess(&[]);
        assert_eq!(a.esg_score, 0.0);
        assert_eq!(a.social_impact.community_engagement, ImpactLevel::None);
        assert_eq!(a.environmental_impact.water_usage_efficiency, ImpactLevel::None);
    }

    #[test]
    fn single_product_small_volume() {
        let p = Uuid::new_v4();
        let a = EsgCalculator::new().assess(&[line(p, 10), line(p, 10)]);

        // 20 units: fti 0.1, carbon 0.04, one product
        assert!((a.social_impact.fair_trade_index - 0.1).abs() < 1e-9);
        assert_eq!(a.social_impact.community_engagement, ImpactLevel::Low);
        assert!((a.environmental_impact.carbon_footprint_reduction_tons - 0.04).abs() < 1e-9);
        assert_eq!(a.environmental_impact.water_usage_efficiency, ImpactLevel::Moderate);
        assert!((a.esg_score - (5.0 + 10.0 + 0.8)).abs() < 1e-9);
    }

    #[test]
    fn fair_trade_index_is_capped_and_score_clamped() {
        let lines: Vec<_> = (0..5).map(|_| line(Uuid::new_v4(), 1000)).collect();
        let a = EsgCalculator::new().assess(&lines);

        assert_eq!(a.social_impact.fair_trade_index, FAIR_TRADE_CAP);
        assert_eq!(a.social_impact.community_engagement, ImpactLevel::High);
        assert_eq!(a.environmental_impact.water_usage_efficiency, ImpactLevel::High);
        assert_eq!(a.esg_score, 100.0);
    }

    #[test]
    fn huge_quantities_saturate_instead_of_overflowing() {
        let lines = [line(Uuid::new_v4(), i64::MAX), line(Uuid::new_v4(), i64::MAX)];
        let a = EsgCalculator::new().assess(&lines);

        assert_eq!(a.social_impact.fair_trade_index, FAIR_TRADE_CAP);
        assert_eq!(a.environmental_impact.water_usage_efficiency, ImpactLevel::High);
        assert!(a.environmental_impact.carbon_footprint_reduction_tons > 0.0);
        assert_eq!(a.esg_score, 100.0);
    }

    #[test]
    fn engagement_is_moderate_for_two_or_three_products() {
        let lines = [line(Uuid::new_v4(), 1), line(Uuid::new_v4(), 1)];
        let a = EsgCalculator::new().assess(&lines);
        assert_eq!(a.social_impact.community_engagement, ImpactLevel::Moderate);
    }

    #[test]
    fn override_replaces_carbon_figure() {
        let p = Uuid::new_v4();
        let a = EsgCalculator::with_environmental_override(1.5).assess(&[line(p, 100)]);

        assert_eq!(a.environmental_impact.carbon_footprint_reduction_tons, 1.5);
        // 0.5 * 50 + 10 + 1.5 * 20
        assert!((a.esg_score - 65.0).abs() < 1e-9);
    }

    #[test]
    fn exactly_one_thousand_units_is_moderate_water_efficiency() {
        let a = EsgCalculator::new().assess(&[line(Uuid::new_v4(), 1000)]);
        assert_eq!(a.environmental_impact.water_usage_efficiency, ImpactLevel::Moderate);
    }
}
