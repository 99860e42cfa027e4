//! Weighted composite of the category scores.

use crate::report::{Category, CategoryScore};

/// Relative weight of each category in the composite score. The defaults sum
/// to 1.0; they are data, not behavior, so recalibrating them never touches
/// scorer logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryWeights {
    /// Frontend weight.
    pub frontend: f64,
    /// Backend weight.
    pub backend: f64,
    /// Authentication weight.
    pub authentication: f64,
    /// Database weight.
    pub database: f64,
    /// Payments weight.
    pub payments: f64,
    /// Security weight.
    pub security: f64,
    /// Deployment-readiness weight.
    pub deployment: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            frontend: 0.20,
            backend: 0.15,
            authentication: 0.15,
            database: 0.15,
            payments: 0.10,
            security: 0.10,
            deployment: 0.15,
        }
    }
}

impl CategoryWeights {
    /// Weight for one category.
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Frontend => self.frontend,
            Category::Backend => self.backend,
            Category::Authentication => self.authentication,
            Category::Database => self.database,
            Category::Payments => self.payments,
            Category::Security => self.security,
            Category::DeploymentReadiness => self.deployment,
        }
    }
}

/// Weighted sum of the category scores, rounded to the nearest integer.
/// Pure: identical inputs yield the identical composite, whatever order the
/// scores arrive in. A category absent from the input contributes zero.
pub fn aggregate(scores: &[CategoryScore], weights: &CategoryWeights) -> u8 {
    let total: f64 = scores
        .iter()
        .map(|score| f64::from(score.score) * weights.weight(score.category))
        .sum();
    total.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::{CategoryWeights, aggregate};
    use crate::report::{Category, CategoryScore, Status};

    fn score(category: Category, value: u8) -> CategoryScore {
        CategoryScore {
            category,
            score: value,
            status: Status::Pass,
            findings: Vec::new(),
            suggestion: String::new(),
            fix_available: false,
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        let weights = CategoryWeights::default();
        let sum: f64 = Category::ALL
            .iter()
            .map(|category| weights.weight(*category))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn uniform_scores_aggregate_to_that_score() {
        let scores: Vec<CategoryScore> = Category::ALL
            .iter()
            .map(|category| score(*category, 80))
            .collect();
        assert_eq!(aggregate(&scores, &CategoryWeights::default()), 80);
    }

    #[test]
    fn composite_is_order_invariant() {
        let weights = CategoryWeights::default();
        let mut scores: Vec<CategoryScore> = Category::ALL
            .iter()
            .enumerate()
            .map(|(i, category)| score(*category, (i as u8) * 15))
            .collect();

        let forward = aggregate(&scores, &weights);
        scores.reverse();
        let backward = aggregate(&scores, &weights);

        assert_eq!(forward, backward);
    }

    #[test]
    fn absent_categories_contribute_zero() {
        let weights = CategoryWeights::default();
        let only_frontend = vec![score(Category::Frontend, 100)];
        assert_eq!(aggregate(&only_frontend, &weights), 20);
        assert_eq!(aggregate(&[], &weights), 0);
    }

    #[test]
    fn rounds_to_nearest_integer() {
        let weights = CategoryWeights::default();
        // 55 * 0.20 = 11.0; 51 * 0.15 = 7.65 -> 18.65 -> 19.
        let scores = vec![
            score(Category::Frontend, 55),
            score(Category::Backend, 51),
        ];
        assert_eq!(aggregate(&scores, &weights), 19);
    }
}
