//! ESG report types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One sold line fed into an ESG calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesLine {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Qualitative rating used by the social and environmental indicators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImpactLevel {
    None,
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialImpact {
    pub fair_trade_index: f64,
    pub community_engagement: ImpactLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentalImpact {
    pub carbon_footprint_reduction_tons: f64,
    pub water_usage_efficiency: ImpactLevel,
}

/// Output of a scorer, before it is attached to a farmer.
#[derive(Debug, Clone, PartialEq)]
pub struct EsgAssessment {
    pub esg_score: f64,
    pub social_impact: SocialImpact,
    pub environmental_impact: EnvironmentalImpact,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EsgReport {
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub esg_score: f64,
    pub total_sales: f64,
    pub social_impact: SocialImpact,
    pub environmental_impact: EnvironmentalImpact,
}
