use ndarray::{s, Array2, Array3};

use crate::params::{Params, ParamsError};

pub type CollectorIndex = usize;
pub type SiteIndex = usize;
pub type PointIndex = usize;
pub type CenterIndex = usize;
pub type DayIndex = usize;

/// sets for the collection model
#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct Sets {
    /// Set of collectors
    pub I: Vec<CollectorIndex>,
    /// Set of sites
    pub J: Vec<SiteIndex>,
    /// Set of meeting points
    pub K: Vec<PointIndex>,
    /// Set of recycling centers
    pub R: Vec<CenterIndex>,
    /// Set of days
    pub T: Vec<DayIndex>,
}

/// parameters for the collection model
#[derive(Debug, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct Parameters {
    /// Buses available per day
    pub V: f64,
    /// Trucks available per day
    pub C: f64,
    /// Passenger capacity of one bus
    pub Cv: f64,
    /// Plastic capacity of one truck
    pub Cc: f64,
    /// Plastic gathered by one collector in one day
    pub P: f64,
    /// Collection target over the horizon
    pub B: f64,
    /// Plastic arriving at site j on day t, indexed `[j, t]`
    pub E: Array2<f64>,
    /// Bus cost from point k to site j on day t, indexed `[j, k, t]`.
    /// Part of the input contract, but no constraint or objective term uses it.
    pub L: Array3<f64>,
    /// Truck cost from site j to center r on day t, indexed `[j, r, t]`
    pub H: Array3<f64>,
    /// 1 if collector i can go to site j on day t, indexed `[t, j, i]`
    pub a: Array3<f64>,
}

impl Sets {
    pub fn new(params: &Params) -> Sets {
        Sets {
            I: (0..params.n).collect(),
            J: (0..params.m).collect(),
            K: (0..params.K).collect(),
            R: (0..params.R).collect(),
            T: (0..params.T).collect(),
        }
    }
}

#[allow(non_snake_case)]
impl Parameters {
    /// Validates the payload against the index domains. Nothing is built
    /// from a payload that fails here.
    pub fn new(params: &Params, sets: &Sets) -> Result<Parameters, ParamsError> {
        let (n, m, K, R, T) = (
            sets.I.len(),
            sets.J.len(),
            sets.K.len(),
            sets.R.len(),
            sets.T.len(),
        );

        for (name, value) in [
            ("V", params.V),
            ("C", params.C),
            ("Cv", params.Cv),
            ("Cc", params.Cc),
            ("P", params.P),
            ("B", params.B),
        ] {
            if !value.is_finite() {
                return Err(ParamsError::NotFinite(name));
            }
        }

        for (name, value) in [
            ("V", params.V),
            ("C", params.C),
            ("Cv", params.Cv),
            ("Cc", params.Cc),
        ] {
            if value < 0.0 {
                return Err(ParamsError::Negative(name));
            }
        }

        // R2 divides by P
        if params.P <= 0.0 {
            return Err(ParamsError::NonPositiveRate);
        }

        let E = table2("E_jt", &params.E_jt, (m, T))?;
        let L = table3("L_jkt", &params.L_jkt, (m, K, T))?;
        let H = table3("H_jrt", &params.H_jrt, (m, R, T))?;
        let a = table3("a_tji", &params.a_tji, (T, m, n))?;

        if let Some(((t, j, i), _)) = a
            .indexed_iter()
            .find(|(_, value)| **value != 0.0 && **value != 1.0)
        {
            return Err(ParamsError::AvailabilityNotBinary { t, j, i });
        }

        Ok(Parameters {
            V: params.V,
            C: params.C,
            Cv: params.Cv,
            Cc: params.Cc,
            P: params.P,
            B: params.B,
            E,
            L,
            H,
            a,
        })
    }

    /// Number of collectors available for site j on day t
    pub fn available(&self, t: DayIndex, j: SiteIndex) -> f64 {
        self.a.slice(s![t, j, ..]).sum()
    }
}

fn check_len(
    table: &'static str,
    axis: usize,
    expected: usize,
    actual: usize,
) -> Result<(), ParamsError> {
    if expected != actual {
        return Err(ParamsError::Shape {
            table,
            axis,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_finite<'a>(
    table: &'static str,
    values: impl IntoIterator<Item = &'a f64>,
) -> Result<(), ParamsError> {
    if values.into_iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ParamsError::NotFinite(table))
    }
}

fn table2(
    table: &'static str,
    rows: &[Vec<f64>],
    shape: (usize, usize),
) -> Result<Array2<f64>, ParamsError> {
    check_len(table, 0, shape.0, rows.len())?;
    for row in rows {
        check_len(table, 1, shape.1, row.len())?;
    }

    let array = Array2::from_shape_fn(shape, |(i, j)| rows[i][j]);
    check_finite(table, array.iter())?;
    Ok(array)
}

fn table3(
    table: &'static str,
    rows: &[Vec<Vec<f64>>],
    shape: (usize, usize, usize),
) -> Result<Array3<f64>, ParamsError> {
    check_len(table, 0, shape.0, rows.len())?;
    for row in rows {
        check_len(table, 1, shape.1, row.len())?;
        for column in row {
            check_len(table, 2, shape.2, column.len())?;
        }
    }

    let array = Array3::from_shape_fn(shape, |(i, j, k)| rows[i][j][k]);
    check_finite(table, array.iter())?;
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Params {
        Params {
            n: 2,
            m: 1,
            K: 1,
            R: 1,
            T: 2,
            V: 1.0,
            C: 1.0,
            Cv: 5.0,
            Cc: 5.0,
            P: 1.0,
            B: 3.0,
            E_jt: vec![vec![0.0, 5.0]],
            L_jkt: vec![vec![vec![0.0, 0.0]]],
            H_jrt: vec![vec![vec![1.0, 1.0]]],
            a_tji: vec![vec![vec![1.0, 0.0]], vec![vec![1.0, 1.0]]],
        }
    }

    #[test]
    fn builds_sets_and_tables() {
        let params = sample();
        let sets = Sets::new(&params);
        assert_eq!(sets.I, vec![0, 1]);
        assert_eq!(sets.T, vec![0, 1]);

        let parameters = Parameters::new(&params, &sets).unwrap();
        assert_eq!(parameters.E[[0, 1]], 5.0);
        assert_eq!(parameters.H.dim(), (1, 1, 2));
        assert_eq!(parameters.available(0, 0), 1.0);
        assert_eq!(parameters.available(1, 0), 2.0);
    }

    #[test]
    fn rejects_ragged_tables() {
        let mut params = sample();
        params.E_jt[0].pop();
        let sets = Sets::new(&params);
        assert!(matches!(
            Parameters::new(&params, &sets),
            Err(ParamsError::Shape {
                table: "E_jt",
                axis: 1,
                expected: 2,
                actual: 1
            })
        ));

        let mut params = sample();
        params.a_tji.pop();
        assert!(matches!(
            Parameters::new(&params, &sets),
            Err(ParamsError::Shape { table: "a_tji", axis: 0, .. })
        ));
    }

    #[test]
    fn rejects_bad_scalars() {
        let mut params = sample();
        let sets = Sets::new(&params);
        params.P = 0.0;
        assert!(matches!(
            Parameters::new(&params, &sets),
            Err(ParamsError::NonPositiveRate)
        ));

        params.P = 1.0;
        params.C = -1.0;
        assert!(matches!(
            Parameters::new(&params, &sets),
            Err(ParamsError::Negative("C"))
        ));

        params.C = 1.0;
        params.B = f64::NAN;
        assert!(matches!(
            Parameters::new(&params, &sets),
            Err(ParamsError::NotFinite("B"))
        ));
    }

    #[test]
    fn rejects_non_binary_availability() {
        let mut params = sample();
        params.a_tji[1][0][1] = 0.5;
        let sets = Sets::new(&params);
        assert!(matches!(
            Parameters::new(&params, &sets),
            Err(ParamsError::AvailabilityNotBinary { t: 1, j: 0, i: 1 })
        ));
    }

    #[test]
    fn empty_domains_are_legal() {
        let params = Params {
            m: 0,
            T: 0,
            E_jt: vec![],
            L_jkt: vec![],
            H_jrt: vec![],
            a_tji: vec![],
            ..sample()
        };
        let sets = Sets::new(&params);
        let parameters = Parameters::new(&params, &sets).unwrap();
        assert_eq!(parameters.E.dim(), (0, 0));
        assert_eq!(parameters.a.dim(), (0, 0, 2));
    }
}
