use std::{cell::RefCell, collections::HashMap};

use log::trace;
use ndarray::Array2;

use super::sets_and_parameters::{DayIndex, SiteIndex};
use crate::models::expr::{LinExpr, VarId};

/// Plastic present at a site at the start of a day, as an affine expression
/// over the collector variables `x` of earlier days.
///
/// The inventory is never a variable of its own: every reference re-derives it
/// from the recurrence
///
/// ```text
/// Q(j, 0) = 0
/// Q(j, t) = Q(j, t-1) - P * x[t-1][j] + E[j][t]
/// ```
///
/// so the model only ever contains the primitive variable families.
pub trait Inventory {
    /// The inventory of `site` on `day`. Requires `day < T`.
    fn at(&self, site: SiteIndex, day: DayIndex) -> LinExpr;
}

/// Unrolls the recurrence on every call.
///
/// A call costs O(day) and the builder calls it from inside its (t, j) loops,
/// so building is O(T² m) overall. This is intentional: horizons are a week
/// and sites are few, and the recomputation is what keeps inventory out of
/// the variable set. Use [`Memoized`] for larger instances.
pub struct Recurrence<'a> {
    /// Collectors deployed, indexed `[t][j]`
    x: &'a [Vec<VarId>],
    /// Plastic gathered per collector and day
    rate: f64,
    /// Inflow, indexed `[j, t]`
    inflow: &'a Array2<f64>,
}

impl<'a> Recurrence<'a> {
    pub fn new(x: &'a [Vec<VarId>], rate: f64, inflow: &'a Array2<f64>) -> Self {
        Self { x, rate, inflow }
    }
}

impl Inventory for Recurrence<'_> {
    fn at(&self, site: SiteIndex, day: DayIndex) -> LinExpr {
        if day == 0 {
            return LinExpr::zero();
        }

        self.at(site, day - 1) - self.rate * self.x[day - 1][site] + self.inflow[[site, day]]
    }
}

/// Same expressions as [`Recurrence`], cached per (site, day) so each is
/// built once.
pub struct Memoized<'a> {
    recurrence: &'a Recurrence<'a>,
    cache: RefCell<HashMap<(SiteIndex, DayIndex), LinExpr>>,
}

impl<'a> Memoized<'a> {
    pub fn new(recurrence: &'a Recurrence<'a>) -> Self {
        Self {
            recurrence,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl Inventory for Memoized<'_> {
    fn at(&self, site: SiteIndex, day: DayIndex) -> LinExpr {
        if let Some(expr) = self.cache.borrow().get(&(site, day)) {
            return expr.clone();
        }

        let expr = if day == 0 {
            LinExpr::zero()
        } else {
            let r = self.recurrence;
            self.at(site, day - 1) - r.rate * r.x[day - 1][site] + r.inflow[[site, day]]
        };

        trace!("Q({}, {}) = {:?}", site, day, expr);
        self.cache.borrow_mut().insert((site, day), expr.clone());
        expr
    }
}
