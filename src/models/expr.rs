use std::{
    collections::BTreeMap,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
};

use derive_more::{Deref, Display, From, Into};
use typed_index_collections::TiSlice;

/// Handle to a decision variable in a model's variable arena.
#[derive(Deref, Debug, PartialEq, Eq, PartialOrd, Ord, From, Into, Clone, Copy, Hash)]
pub struct VarId(usize);

/// An affine expression `sum(coeff * var) + constant`.
///
/// Terms whose coefficient cancels to exactly zero are dropped, so two
/// expressions compare equal iff they have the same coefficient map and constant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinExpr {
    pub fn zero() -> LinExpr {
        LinExpr::default()
    }

    pub fn constant_expr(constant: f64) -> LinExpr {
        LinExpr {
            terms: BTreeMap::new(),
            constant,
        }
    }

    pub fn term(coeff: f64, var: VarId) -> LinExpr {
        let mut expr = LinExpr::zero();
        expr.add_term(coeff, var);
        expr
    }

    pub fn add_term(&mut self, coeff: f64, var: VarId) -> &mut Self {
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coeff;
        if *entry == 0.0 {
            self.terms.remove(&var);
        }
        self
    }

    pub fn add_constant(&mut self, constant: f64) -> &mut Self {
        self.constant += constant;
        self
    }

    /// The coefficient of `var`, zero if it does not appear.
    pub fn coeff(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Terms in increasing variable order.
    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(var, coeff)| (*var, *coeff))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Splits the expression into its variable part and its constant.
    pub fn into_parts(self) -> (LinExpr, f64) {
        let constant = self.constant;
        (
            LinExpr {
                terms: self.terms,
                constant: 0.0,
            },
            constant,
        )
    }

    /// Value of the expression under the given assignment.
    pub fn eval(&self, values: &TiSlice<VarId, f64>) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| coeff * values[*var])
            .sum::<f64>()
            + self.constant
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> Self {
        LinExpr::term(1.0, var)
    }
}

impl From<f64> for LinExpr {
    fn from(constant: f64) -> Self {
        LinExpr::constant_expr(constant)
    }
}

impl AddAssign<LinExpr> for LinExpr {
    fn add_assign(&mut self, rhs: LinExpr) {
        for (var, coeff) in rhs.terms {
            self.add_term(coeff, var);
        }
        self.constant += rhs.constant;
    }
}

impl SubAssign<LinExpr> for LinExpr {
    fn sub_assign(&mut self, rhs: LinExpr) {
        *self += -rhs;
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        self += rhs.into();
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(mut self, rhs: T) -> LinExpr {
        self -= rhs.into();
        self
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self * -1.0
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, rhs: f64) -> LinExpr {
        if rhs == 0.0 {
            self.terms.clear();
        } else {
            self.terms.values_mut().for_each(|coeff| *coeff *= rhs);
        }
        self.constant *= rhs;
        self
    }
}

impl Mul<LinExpr> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: LinExpr) -> LinExpr {
        rhs * self
    }
}

impl Div<f64> for LinExpr {
    type Output = LinExpr;

    fn div(mut self, rhs: f64) -> LinExpr {
        self.terms.values_mut().for_each(|coeff| *coeff /= rhs);
        self.terms.retain(|_, coeff| *coeff != 0.0);
        self.constant /= rhs;
        self
    }
}

impl Mul<VarId> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: VarId) -> LinExpr {
        LinExpr::term(self, rhs)
    }
}

impl Mul<f64> for VarId {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        LinExpr::term(rhs, self)
    }
}

impl<T: Into<LinExpr>> Add<T> for VarId {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for VarId {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Sum<LinExpr> for LinExpr {
    fn sum<I: Iterator<Item = LinExpr>>(iter: I) -> Self {
        iter.fold(LinExpr::zero(), |acc, e| acc + e)
    }
}

impl Sum<VarId> for LinExpr {
    fn sum<I: Iterator<Item = VarId>>(iter: I) -> Self {
        let mut expr = LinExpr::zero();
        for var in iter {
            expr.add_term(1.0, var);
        }
        expr
    }
}

/// Direction of a linear row `expr sense rhs`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    #[display(fmt = "<=")]
    Le,
    #[display(fmt = ">=")]
    Ge,
    #[display(fmt = "=")]
    Eq,
}

impl Sense {
    /// Whether `lhs sense rhs` holds, allowing for `tolerance`.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Sense::Le => lhs <= rhs + tolerance,
            Sense::Ge => lhs + tolerance >= rhs,
            Sense::Eq => (lhs - rhs).abs() <= tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typed_index_collections::TiVec;

    fn v(i: usize) -> VarId {
        VarId::from(i)
    }

    #[test]
    fn cancelling_terms_are_dropped() {
        let expr = v(0) + 2.0 * v(1) - v(0);
        assert_eq!(expr.len(), 1);
        assert_eq!(expr.coeff(v(0)), 0.0);
        assert_eq!(expr.coeff(v(1)), 2.0);
        assert_eq!(expr, LinExpr::term(2.0, v(1)));
    }

    #[test]
    fn scaling_and_division() {
        let expr = (3.0 * v(0) + 6.0) / 3.0;
        assert_eq!(expr.coeff(v(0)), 1.0);
        assert_eq!(expr.constant(), 2.0);

        let zeroed = (v(0) + v(1) + 4.0) * 0.0;
        assert!(zeroed.is_constant());
        assert_eq!(zeroed.constant(), 0.0);
    }

    #[test]
    fn sums() {
        let vars: LinExpr = (0..3).map(v).sum();
        assert_eq!(vars.len(), 3);
        let exprs: LinExpr = (0..3).map(|i| 2.0 * v(i) + 1.0).sum();
        assert_eq!(exprs.coeff(v(2)), 2.0);
        assert_eq!(exprs.constant(), 3.0);
        assert_eq!(std::iter::empty::<VarId>().sum::<LinExpr>(), LinExpr::zero());
    }

    #[test]
    fn evaluation() {
        let values: TiVec<VarId, f64> = vec![1.0, 2.0, 3.0].into();
        let expr = v(0) - 2.0 * v(2) + 0.5;
        assert_eq!(expr.eval(&values), 1.0 - 6.0 + 0.5);
    }

    #[test]
    fn into_parts_moves_constant_out() {
        let (terms, constant) = (v(0) * 4.0 + 7.0).into_parts();
        assert_eq!(constant, 7.0);
        assert_eq!(terms.constant(), 0.0);
        assert_eq!(terms.coeff(v(0)), 4.0);
    }

    #[test]
    fn sense_tolerance() {
        assert!(Sense::Le.holds(1.0 + 1e-9, 1.0, 1e-6));
        assert!(!Sense::Ge.holds(0.9, 1.0, 1e-6));
        assert!(Sense::Eq.holds(2.0, 2.0, 0.0));
    }
}
