//! Low-stock alert projection.
//!
//! Alerts are derived from current product state at read time and are never
//! persisted; every query recomputes them from the latest committed
//! quantities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::product::Product;

/// Alert severity tiers, ordered most severe first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

/// A product at or below its low-stock threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAlert {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub severity: Severity,
    pub updated_at: DateTime<Utc>,
}

/// Alert counts per severity tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertSummary {
    pub critical: usize,
    pub warning: usize,
}

/// Classifies a stock level against its threshold.
///
/// Exhausted stock (zero, or negative under back-orders) is critical for any
/// threshold. A positive level at or below the threshold is a warning. A
/// threshold of zero alerts only once stock is exhausted.
pub fn severity_for(quantity: i64, low_stock_threshold: i64) -> Option<Severity> {
    if quantity <= 0 {
        Some(Severity::Critical)
    } else if quantity <= low_stock_threshold {
        Some(Severity::Warning)
    } else {
        None
    }
}

/// Projects the alert view over a set of products.
///
/// Critical alerts sort before warnings; within a tier the most recently
/// updated product comes first.
pub fn compute_alerts(products: &[Product]) -> Vec<StockAlert> {
    let mut alerts: Vec<StockAlert> = products
        .iter()
        .filter_map(|product| {
            severity_for(product.quantity, product.low_stock_threshold).map(|severity| {
                StockAlert {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: product.quantity,
                    low_stock_threshold: product.low_stock_threshold,
                    severity,
                    updated_at: product.updated_at,
                }
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });

    alerts
}

/// Tallies a computed alert set by severity.
pub fn summarize(alerts: &[StockAlert]) -> AlertSummary {
    let mut summary = AlertSummary::default();
    for alert in alerts {
        match alert.severity {
            Severity::Critical => summary.critical += 1,
            Severity::Warning => summary.warning += 1,
        }
    }
    summary
}
