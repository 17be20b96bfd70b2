use derive_more::Display;
use itertools::iproduct;
use log::{debug, info};
use typed_index_collections::{TiSlice, TiVec};

use super::inventory::{Inventory, Memoized, Recurrence};
use super::sets_and_parameters::{
    CenterIndex, DayIndex, Parameters, PointIndex, Sets, SiteIndex,
};
use crate::models::expr::{LinExpr, Sense, VarId};
use crate::models::utils::{AddVars, ConvertVars};
use crate::solver::Solution;

/// The family and index tuple a variable was declared for.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// collectors deployed to site j on day t
    #[display(fmt = "x_{}_{}", t, j)]
    X { t: DayIndex, j: SiteIndex },
    /// collectors routed through meeting point k to site j on day t
    #[display(fmt = "y_{}_{}_{}", t, j, k)]
    Y {
        t: DayIndex,
        j: SiteIndex,
        k: PointIndex,
    },
    /// buses routed through meeting point k to site j on day t
    #[display(fmt = "z_{}_{}_{}", t, j, k)]
    Z {
        t: DayIndex,
        j: SiteIndex,
        k: PointIndex,
    },
    /// trucks from site j to recycling center r on day t
    #[display(fmt = "s_{}_{}_{}", t, r, j)]
    S {
        t: DayIndex,
        r: CenterIndex,
        j: SiteIndex,
    },
}

/// A non-negative integer decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub key: VarKey,
}

impl Variable {
    pub fn name(&self) -> String {
        self.key.to_string()
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// R1
    #[display(fmt = "collection_target")]
    CollectionTarget,
    /// R2
    #[display(fmt = "inventory_balance")]
    InventoryBalance,
    /// R3
    #[display(fmt = "inventory_cap")]
    InventoryCap,
    /// R4
    #[display(fmt = "truck_fleet")]
    TruckFleet,
    /// R5
    #[display(fmt = "bus_fleet")]
    BusFleet,
    /// R6
    #[display(fmt = "truck_capacity")]
    TruckCapacity,
    /// R7
    #[display(fmt = "bus_capacity")]
    BusCapacity,
    /// R8
    #[display(fmt = "routing_consistency")]
    RoutingConsistency,
    /// R9
    #[display(fmt = "availability")]
    Availability,
    /// R10 to R13
    #[display(fmt = "non_negative")]
    NonNegative,
}

/// A row `expr sense rhs`, with every constant folded into `rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub name: String,
    pub expr: LinExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied(&self, values: &TiSlice<VarId, f64>, tolerance: f64) -> bool {
        self.sense.holds(self.expr.eval(values), self.rhs, tolerance)
    }
}

/// A minimisation MILP over non-negative integer variables, ready to be
/// handed to a solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    vars: TiVec<VarId, Variable>,
    objective: LinExpr,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new(name: &str) -> Model {
        Model {
            name: name.to_string(),
            vars: TiVec::new(),
            objective: LinExpr::zero(),
            constraints: Vec::new(),
        }
    }

    pub fn add_var(&mut self, key: VarKey) -> VarId {
        let id = VarId::from(self.vars.len());
        self.vars.push(Variable { key });
        id
    }

    /// Adds `lhs sense rhs`, normalised so that all constants end up on the right.
    pub fn add_constr(
        &mut self,
        kind: ConstraintKind,
        name: String,
        lhs: impl Into<LinExpr>,
        sense: Sense,
        rhs: impl Into<LinExpr>,
    ) {
        let (expr, constant) = (lhs.into() - rhs.into()).into_parts();
        self.constraints.push(Constraint {
            kind,
            name,
            expr,
            sense,
            // keeps an absent constant at 0 rather than -0
            rhs: 0.0 - constant,
        });
    }

    pub fn set_objective(&mut self, objective: LinExpr) {
        self.objective = objective;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vars(&self) -> &TiSlice<VarId, Variable> {
        &self.vars
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraints_of(&self, kind: ConstraintKind) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.kind == kind)
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// The objective value of an assignment, one value per variable.
    pub fn objective_value(&self, values: &TiSlice<VarId, f64>) -> f64 {
        self.objective.eval(values)
    }

    /// Constraints violated by an assignment, beyond `tolerance`. Negative or
    /// fractional values are not reported here; see [`Model::is_integral`].
    pub fn violations<'a>(
        &'a self,
        values: &'a TiSlice<VarId, f64>,
        tolerance: f64,
    ) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| !c.is_satisfied(values, tolerance))
    }

    /// Whether every value is a non-negative integer, within `tolerance`.
    pub fn is_integral(&self, values: &TiSlice<VarId, f64>, tolerance: f64) -> bool {
        values.len() == self.vars.len()
            && values
                .iter()
                .all(|v| *v >= -tolerance && (v - v.round()).abs() <= tolerance)
    }
}

/// Variable handles of the collection model.
#[derive(Debug, Clone, PartialEq)]
pub struct Variables {
    /// `x[t][j]`
    pub x: Vec<Vec<VarId>>,
    /// `y[t][j][k]`
    pub y: Vec<Vec<Vec<VarId>>>,
    /// `z[t][j][k]`
    pub z: Vec<Vec<Vec<VarId>>>,
    /// `s[t][r][j]`
    pub s: Vec<Vec<Vec<VarId>>>,
}

impl Variables {
    /// The handle declared for `key`, if its indices are in range.
    pub fn get(&self, key: VarKey) -> Option<VarId> {
        match key {
            VarKey::X { t, j } => self.x.get(t)?.get(j).copied(),
            VarKey::Y { t, j, k } => self.y.get(t)?.get(j)?.get(k).copied(),
            VarKey::Z { t, j, k } => self.z.get(t)?.get(j)?.get(k).copied(),
            VarKey::S { t, r, j } => self.s.get(t)?.get(r)?.get(j).copied(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Emit `v >= 0` rows for every variable, on top of the variable bounds
    pub explicit_non_negativity: bool,
    /// Cache inventory expressions per (site, day)
    pub memoize_inventory: bool,
}

pub struct CollectionModel {}

#[allow(non_snake_case)]
impl CollectionModel {
    /// builds the collection model
    pub fn build(sets: &Sets, parameters: &Parameters, options: &BuildOptions) -> (Model, Variables) {
        info!(
            "Building collection model: {} days, {} sites, {} meeting points, {} centers",
            sets.T.len(),
            sets.J.len(),
            sets.K.len(),
            sets.R.len()
        );

        let mut model = Model::new("beach_collection");

        //*************CREATE VARIABLES*************//
        let T = sets.T.len();
        let m = sets.J.len();
        let K = sets.K.len();
        let R = sets.R.len();

        let x = (T, m).vars_with(|(t, j)| model.add_var(VarKey::X { t, j }));
        let y = (T, m, K).vars_with(|(t, j, k)| model.add_var(VarKey::Y { t, j, k }));
        let z = (T, m, K).vars_with(|(t, j, k)| model.add_var(VarKey::Z { t, j, k }));
        let s = (T, R, m).vars_with(|(t, r, j)| model.add_var(VarKey::S { t, r, j }));

        let P = parameters.P;
        let E = &parameters.E;

        let recurrence = Recurrence::new(&x, P, E);
        let memoized = Memoized::new(&recurrence);
        let Q: &dyn Inventory = if options.memoize_inventory {
            &memoized
        } else {
            &recurrence
        };

        //*************OBJECTIVE*************//
        let bus_trips = iproduct!(&sets.T, &sets.J, &sets.K)
            .map(|(t, j, k)| 2.0 * z[*t][*j][*k])
            .sum::<LinExpr>();
        let truck_costs = iproduct!(&sets.T, &sets.R, &sets.J)
            .map(|(t, r, j)| 2.0 * parameters.H[[*j, *r, *t]] * s[*t][*r][*j])
            .sum::<LinExpr>();
        model.set_objective(bus_trips + truck_costs);

        // ******************** ADD CONSTRAINTS ********************
        // the collection target must be met over the horizon
        let collected = iproduct!(&sets.T, &sets.J)
            .map(|(t, j)| P * x[*t][*j])
            .sum::<LinExpr>();
        model.add_constr(
            ConstraintKind::CollectionTarget,
            ConstraintKind::CollectionTarget.to_string(),
            collected,
            Sense::Ge,
            parameters.B,
        );

        // the collection of one day is what the inventory loses by the next
        for (t, j) in iproduct!(&sets.T[T.min(1)..], &sets.J) {
            let (before, after) = (Q.at(*j, t - 1), Q.at(*j, *t));
            let scale = before.constant().abs().max(after.constant().abs()) / P;
            let mut drawn = (before - after + E[[*j, *t]]) / P;
            // the inflow cancels exactly, up to rounding in the unrolled sums
            if drawn.constant().abs() <= 4.0 * f64::EPSILON * scale {
                drawn.add_constant(-drawn.constant());
            }
            model.add_constr(
                ConstraintKind::InventoryBalance,
                format!("inventory_balance_{t}_{j}"),
                x[t - 1][*j],
                Sense::Le,
                drawn,
            );
        }

        // nothing beyond the current inventory can be collected
        for (t, j) in iproduct!(&sets.T, &sets.J) {
            model.add_constr(
                ConstraintKind::InventoryCap,
                format!("inventory_cap_{t}_{j}"),
                Q.at(*j, *t),
                Sense::Ge,
                P * x[*t][*j],
            );
        }

        // daily truck fleet, only for days with trucks to route
        for t in sets.T.iter().filter(|_| R * m > 0) {
            let trucks = iproduct!(&sets.R, &sets.J)
                .map(|(r, j)| s[*t][*r][*j])
                .sum::<LinExpr>();
            model.add_constr(
                ConstraintKind::TruckFleet,
                format!("truck_fleet_{t}"),
                trucks,
                Sense::Le,
                parameters.C,
            );
        }

        // daily bus fleet, only for days with buses to route
        for t in sets.T.iter().filter(|_| m * K > 0) {
            let buses = iproduct!(&sets.J, &sets.K)
                .map(|(j, k)| z[*t][*j][*k])
                .sum::<LinExpr>();
            model.add_constr(
                ConstraintKind::BusFleet,
                format!("bus_fleet_{t}"),
                buses,
                Sense::Le,
                parameters.V,
            );
        }

        // trucks must carry what is collected at the site
        for (t, j) in iproduct!(&sets.T, &sets.J) {
            let capacity = parameters.Cc * sets.R.iter().map(|r| s[*t][*r][*j]).sum::<LinExpr>();
            model.add_constr(
                ConstraintKind::TruckCapacity,
                format!("truck_capacity_{t}_{j}"),
                P * x[*t][*j],
                Sense::Le,
                capacity,
            );
        }

        // buses must seat the collectors routed through them
        for (t, j, k) in iproduct!(&sets.T, &sets.J, &sets.K) {
            model.add_constr(
                ConstraintKind::BusCapacity,
                format!("bus_capacity_{t}_{j}_{k}"),
                y[*t][*j][*k],
                Sense::Le,
                parameters.Cv * z[*t][*j][*k],
            );
        }

        // every deployed collector arrives through some meeting point
        for (t, j) in iproduct!(&sets.T, &sets.J) {
            let routed = sets.K.iter().map(|k| y[*t][*j][*k]).sum::<LinExpr>();
            model.add_constr(
                ConstraintKind::RoutingConsistency,
                format!("routing_consistency_{t}_{j}"),
                x[*t][*j],
                Sense::Eq,
                routed,
            );
        }

        // no more collectors than are available
        for (t, j) in iproduct!(&sets.T, &sets.J) {
            model.add_constr(
                ConstraintKind::Availability,
                format!("availability_{t}_{j}"),
                x[*t][*j],
                Sense::Le,
                parameters.available(*t, *j),
            );
        }

        if options.explicit_non_negativity {
            let families = x
                .iter()
                .flatten()
                .chain(y.iter().flatten().flatten())
                .chain(z.iter().flatten().flatten())
                .chain(s.iter().flatten().flatten());
            let rows = families
                .map(|var| (*var, model.vars()[*var].name()))
                .collect::<Vec<_>>();
            for (var, name) in rows {
                model.add_constr(
                    ConstraintKind::NonNegative,
                    format!("non_negative_{name}"),
                    var,
                    Sense::Ge,
                    0.0,
                );
            }
        }

        for kind in [
            ConstraintKind::CollectionTarget,
            ConstraintKind::InventoryBalance,
            ConstraintKind::InventoryCap,
            ConstraintKind::TruckFleet,
            ConstraintKind::BusFleet,
            ConstraintKind::TruckCapacity,
            ConstraintKind::BusCapacity,
            ConstraintKind::RoutingConsistency,
            ConstraintKind::Availability,
            ConstraintKind::NonNegative,
        ] {
            debug!("{}: {} rows", kind, model.constraints_of(kind).count());
        }

        info!(
            "Successfully built collection model: {} variables, {} constraints",
            model.num_vars(),
            model.constraints().len()
        );

        (model, Variables { x, y, z, s })
    }
}

/// Values of the collection model's variables in a solution
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    /// collectors deployed, `[t][j]`
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<Vec<f64>>>,
    pub z: Vec<Vec<Vec<f64>>>,
    pub s: Vec<Vec<Vec<f64>>>,
}

impl CollectionResult {
    pub fn new(variables: &Variables, solution: &Solution) -> CollectionResult {
        let values = &solution.values;
        CollectionResult {
            x: variables.x.convert(values),
            y: variables.y.convert(values),
            z: variables.z.convert(values),
            s: variables.s.convert(values),
        }
    }

    /// Collectors deployed on each day, summed over sites
    pub fn collectors_per_day(&self) -> Vec<f64> {
        self.x.iter().map(|day| day.iter().sum()).collect()
    }
}
