//! Multi-Market Sizing
//!
//! Sizes a batch of opportunities. With a correlation matrix the combined
//! fraction is held to `max_correlation_exposure` by proportional scaling.
//! This is a budget heuristic, not a covariance-aware portfolio optimizer.

use std::collections::HashMap;

use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Result, SizerError};
use crate::model::{KellyResult, MarketOpportunity};
use crate::portfolio::correlation::CorrelationMatrix;
use crate::sizing::KellyOptimizer;
use crate::sizing::engine::settle_stake;
use crate::sizing::report::recommend;

impl KellyOptimizer {
    /// Size every opportunity, keyed by `market_id`.
    ///
    /// Opportunities are evaluated in parallel; scaling happens after all
    /// individual results exist. Duplicate market ids keep the last entry.
    pub fn calculate_multi_market(
        &self,
        opportunities: &[MarketOpportunity],
        correlations: Option<&CorrelationMatrix>,
        bankroll: Decimal,
    ) -> Result<HashMap<String, KellyResult>> {
        if let Some(matrix) = correlations {
            if matrix.len() != opportunities.len() {
                return Err(SizerError::InvalidCorrelation(format!(
                    "matrix is {n}x{n} but {} opportunities were given",
                    opportunities.len(),
                    n = matrix.len()
                )));
            }
        }

        let individual: Vec<KellyResult> = opportunities
            .par_iter()
            .map(|opp| self.calculate_optimal_position(opp, bankroll, None))
            .collect();

        let results = match correlations {
            None => individual,
            Some(_) => self.scale_to_budget(opportunities, individual, bankroll),
        };

        Ok(results
            .into_iter()
            .map(|result| (result.market_id.clone(), result))
            .collect())
    }

    fn scale_to_budget(
        &self,
        opportunities: &[MarketOpportunity],
        mut results: Vec<KellyResult>,
        bankroll: Decimal,
    ) -> Vec<KellyResult> {
        let budget = self.config().max_correlation_exposure;
        let total: f64 = results.iter().map(|r| r.adjusted_fraction).sum();

        if total <= budget {
            return results;
        }

        let scale = budget / total;
        debug!(total, budget, scale, "Scaling correlated batch to budget");

        for (result, opp) in results.iter_mut().zip(opportunities) {
            let fraction = result.adjusted_fraction * scale;

            result.adjusted_fraction = fraction;
            result.final_position_size = fraction;
            result.recommendation = recommend(fraction, result.expected_value, opp);
            settle_stake(result, bankroll);
            result
                .reasoning
                .push_str(&format!(" | Correlated budget scaling: x{scale:.3}"));
        }

        results
    }
}

/// Combined fraction of a batch
pub fn total_fraction<'a>(results: impl IntoIterator<Item = &'a KellyResult>) -> f64 {
    results.into_iter().map(|r| r.final_position_size).sum()
}
