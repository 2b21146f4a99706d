//! The function the optimizers climb.

use fold_rs_sim::Snapshot;

/// A smooth scalar function of the borrow amount, with analytic first and
/// second derivatives.
pub trait Objective {
    fn value(&self, b: f64) -> f64;
    fn gradient(&self, b: f64) -> f64;
    fn curvature(&self, b: f64) -> f64;
}

impl Objective for Snapshot {
    fn value(&self, b: f64) -> f64 {
        self.revenue(b)
    }

    fn gradient(&self, b: f64) -> f64 {
        self.revenue_prime(b)
    }

    fn curvature(&self, b: f64) -> f64 {
        self.revenue_prime2(b)
    }
}
