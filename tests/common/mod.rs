#![allow(dead_code)]

use std::convert::Infallible;

use beachcrew::models::expr::VarId;
use beachcrew::models::Model;
use beachcrew::params::Params;
use beachcrew::solver::{Solution, SolveOutcome, Solver};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;
use typed_index_collections::TiVec;

/// The one-site, two-day instance with a target of `target`.
pub fn scenario(target: f64) -> Params {
    serde_json::from_value(json!({
        "n": 1, "m": 1, "K": 1, "R": 1, "T": 2,
        "V": 1, "C": 1, "Cv": 5, "Cc": 5, "P": 1, "B": target,
        "E_jt": [[0, 5]],
        "L_jkt": [[[0, 0]]],
        "H_jrt": [[[1, 1]]],
        "a_tji": [[[1]], [[1]]]
    }))
    .unwrap()
}

/// A random but well formed instance.
#[allow(non_snake_case)]
pub fn random_params(rng: &mut StdRng) -> Params {
    let n = rng.gen_range(1..4);
    let m = rng.gen_range(0..4);
    let K = rng.gen_range(0..3);
    let R = rng.gen_range(0..3);
    let T = rng.gen_range(0..7);

    let mut table = |a: usize, b: usize, c: usize, max: f64| -> Vec<Vec<Vec<f64>>> {
        (0..a)
            .map(|_| {
                (0..b)
                    .map(|_| (0..c).map(|_| rng.gen_range(0.0..max)).collect())
                    .collect()
            })
            .collect()
    };
    let E_jt = table(1, m, T, 20.0).pop().unwrap_or_default();
    let L_jkt = table(m, K, T, 10.0);
    let H_jrt = table(m, R, T, 10.0);
    let a_tji = table(T, m, n, 1.0)
        .into_iter()
        .map(|day| {
            day.into_iter()
                .map(|site| site.into_iter().map(|v| (v < 0.6) as u8 as f64).collect())
                .collect()
        })
        .collect();

    Params {
        n,
        m,
        K,
        R,
        T,
        V: rng.gen_range(0..10) as f64,
        C: rng.gen_range(0..10) as f64,
        Cv: rng.gen_range(1..20) as f64,
        Cc: rng.gen_range(1.0..50.0),
        P: rng.gen_range(0.5..3.0),
        B: rng.gen_range(0.0..100.0),
        E_jt,
        L_jkt,
        H_jrt,
        a_tji,
    }
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A random non-negative integer assignment.
pub fn random_values(rng: &mut StdRng, model: &Model) -> TiVec<VarId, f64> {
    (0..model.num_vars())
        .map(|_| rng.gen_range(0..6) as f64)
        .collect::<Vec<_>>()
        .into()
}

/// Enumerates every assignment in `[0, bound]^n`. Only usable on tiny models.
pub struct BruteForce {
    pub bound: u32,
}

impl Solver for BruteForce {
    type Error = Infallible;

    fn solve(&mut self, model: &Model) -> Result<SolveOutcome, Infallible> {
        let n = model.num_vars();
        let mut values: TiVec<VarId, f64> = vec![0.0; n].into();
        let mut best: Option<(f64, TiVec<VarId, f64>)> = None;
        let mut improvements = 0;

        loop {
            if model.violations(&values, 1e-9).next().is_none() {
                let objective = model.objective_value(&values);
                if best.as_ref().map_or(true, |(b, _)| objective < *b) {
                    improvements += 1;
                    best = Some((objective, values.clone()));
                }
            }

            let mut i = 0;
            loop {
                if i == n {
                    return Ok(match best {
                        Some((objective, values)) => SolveOutcome::Solved(Solution {
                            solution_count: improvements,
                            values,
                            objective,
                        }),
                        None => SolveOutcome::NoSolution {
                            status: "Infeasible".to_string(),
                        },
                    });
                }
                let slot = &mut values[VarId::from(i)];
                if *slot < self.bound as f64 {
                    *slot += 1.0;
                    break;
                }
                *slot = 0.0;
                i += 1;
            }
        }
    }
}
