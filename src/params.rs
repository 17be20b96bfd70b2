use std::{fs::File, io::BufReader, path::Path};

use derive_more::{Display, From};
use serde::Deserialize;

/// The raw input payload, as found in `params.json`.
///
/// Tables keep the index order of their key: `E_jt` is `[site][day]`,
/// `L_jkt` is `[site][point][day]`, `H_jrt` is `[site][center][day]` and
/// `a_tji` is `[day][site][collector]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(non_snake_case)]
pub struct Params {
    /// Number of collectors
    pub n: usize,
    /// Number of sites
    pub m: usize,
    /// Number of meeting points
    pub K: usize,
    /// Number of recycling centers
    pub R: usize,
    /// Number of days in the horizon
    pub T: usize,
    /// Buses available per day
    pub V: f64,
    /// Trucks available per day
    pub C: f64,
    /// Passenger capacity of a bus
    pub Cv: f64,
    /// Plastic capacity of a truck
    pub Cc: f64,
    /// Plastic gathered by one collector in one day
    pub P: f64,
    /// Weekly collection target
    pub B: f64,
    pub E_jt: Vec<Vec<f64>>,
    pub L_jkt: Vec<Vec<Vec<f64>>>,
    pub H_jrt: Vec<Vec<Vec<f64>>>,
    pub a_tji: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Display, From)]
pub enum ParamsError {
    #[display(fmt = "failed to read parameters: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "malformed parameters: {}", _0)]
    Json(serde_json::Error),
    #[from(ignore)]
    #[display(
        fmt = "table {} has length {} along axis {}, expected {}",
        table,
        actual,
        axis,
        expected
    )]
    Shape {
        table: &'static str,
        axis: usize,
        expected: usize,
        actual: usize,
    },
    #[from(ignore)]
    #[display(fmt = "{} contains a value that is not finite", _0)]
    NotFinite(&'static str),
    #[from(ignore)]
    #[display(fmt = "{} must not be negative", _0)]
    Negative(&'static str),
    #[from(ignore)]
    #[display(fmt = "P must be strictly positive")]
    NonPositiveRate,
    #[from(ignore)]
    #[display(fmt = "a_tji[{}][{}][{}] is neither 0 nor 1", t, j, i)]
    AvailabilityNotBinary { t: usize, j: usize, i: usize },
}

impl std::error::Error for ParamsError {}

impl Params {
    /// Reads the payload at `path`. A missing file is not an error: there is
    /// simply nothing to do, which is reported as `Ok(None)`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Params>, ParamsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let params = serde_json::from_reader(reader)?;
        Ok(Some(params))
    }

    pub fn from_json(string: &str) -> Result<Params, ParamsError> {
        Ok(serde_json::from_str(string)?)
    }
}
