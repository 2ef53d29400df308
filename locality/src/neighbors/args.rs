use crate::Error;

/// The different kinds of neighbor queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// No mode was selected, it will be inferred from the other arguments
    #[default]
    None,
    /// Find all points within `r_max` of each query point
    Ball,
    /// Find the `num_neighbors` points closest to each query point
    Nearest,
}

/// Arguments of a neighbor query.
///
/// The mode of the query can be left to [`QueryMode::None`], in which case it
/// is inferred from the other arguments: setting `num_neighbors` selects a
/// k-nearest neighbors query, and setting only `r_max` selects a ball query.
///
/// ```
/// # use locality::{QueryArgs, QueryMode};
/// let args = QueryArgs::from_json(r#"{"num_neighbors": 6, "exclude_ii": true}"#).unwrap();
/// assert_eq!(args.mode, QueryMode::Nearest);
/// assert_eq!(args.scale, QueryArgs::DEFAULT_SCALE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QueryArgs {
    /// Kind of query to run
    #[serde(default)]
    pub mode: QueryMode,
    /// Number of neighbors to find for each query point, used by nearest
    /// queries
    #[serde(default)]
    pub num_neighbors: Option<usize>,
    /// Cutoff radius. This is required for ball queries; for nearest queries
    /// it restricts the neighbors to points closer than `r_max`.
    #[serde(default)]
    pub r_max: Option<f64>,
    /// Multiplicative factor used to grow the search radius of nearest
    /// queries, must be larger than 1
    #[serde(default = "serde_default_scale")]
    pub scale: f64,
    /// Should we exclude pairs where the query point and the point have the
    /// same index? This is useful when querying a set of points against
    /// itself.
    #[serde(default = "serde_default_exclude_ii")]
    pub exclude_ii: bool,
}

fn serde_default_scale() -> f64 {
    return QueryArgs::DEFAULT_SCALE;
}

fn serde_default_exclude_ii() -> bool {
    return QueryArgs::DEFAULT_EXCLUDE_II;
}

impl Default for QueryArgs {
    fn default() -> QueryArgs {
        QueryArgs {
            mode: QueryArgs::DEFAULT_MODE,
            num_neighbors: None,
            r_max: None,
            scale: QueryArgs::DEFAULT_SCALE,
            exclude_ii: QueryArgs::DEFAULT_EXCLUDE_II,
        }
    }
}

impl QueryArgs {
    /// Default growth factor of the search radius in nearest queries
    pub const DEFAULT_SCALE: f64 = 1.1;
    /// By default, pairs between points with the same index are included
    pub const DEFAULT_EXCLUDE_II: bool = false;
    /// By default, the query mode is inferred from the other arguments
    pub const DEFAULT_MODE: QueryMode = QueryMode::None;

    /// Arguments for a ball query with the given cutoff
    pub fn ball(r_max: f64) -> QueryArgs {
        QueryArgs {
            mode: QueryMode::Ball,
            r_max: Some(r_max),
            ..Default::default()
        }
    }

    /// Arguments for a query of the `num_neighbors` nearest neighbors
    pub fn nearest(num_neighbors: usize) -> QueryArgs {
        QueryArgs {
            mode: QueryMode::Nearest,
            num_neighbors: Some(num_neighbors),
            ..Default::default()
        }
    }

    /// Set `exclude_ii` on these arguments
    #[must_use]
    pub fn with_exclude_ii(mut self, exclude_ii: bool) -> QueryArgs {
        self.exclude_ii = exclude_ii;
        return self;
    }

    /// Parse query arguments from JSON, inferring the mode and validating the
    /// result.
    pub fn from_json(json: &str) -> Result<QueryArgs, Error> {
        let mut args = serde_json::from_str::<QueryArgs>(json)?;
        args.validate()?;
        return Ok(args);
    }

    /// Infer the query mode if it is not set, and check that the arguments
    /// required by this mode are present and valid.
    pub fn validate(&mut self) -> Result<(), Error> {
        if self.mode == QueryMode::None {
            if self.num_neighbors.is_some() {
                self.mode = QueryMode::Nearest;
            } else if self.r_max.is_some() {
                self.mode = QueryMode::Ball;
            }
        }

        if let Some(r_max) = self.r_max {
            if !(r_max > 0.0 && r_max.is_finite()) {
                return Err(Error::InvalidParameter(format!(
                    "r_max must be a positive number, got {}", r_max
                )));
            }
        }

        match self.mode {
            QueryMode::None => {
                return Err(Error::MissingArgument(
                    "could not infer the query mode, one of r_max or num_neighbors must be set".into()
                ));
            }
            QueryMode::Ball => {
                if self.r_max.is_none() {
                    return Err(Error::MissingArgument(
                        "r_max must be set for ball queries".into()
                    ));
                }
            }
            QueryMode::Nearest => {
                match self.num_neighbors {
                    None => {
                        return Err(Error::MissingArgument(
                            "num_neighbors must be set for nearest queries".into()
                        ));
                    }
                    Some(0) => {
                        return Err(Error::InvalidParameter(
                            "num_neighbors must be at least 1".into()
                        ));
                    }
                    Some(_) => {}
                }

                if !(self.scale > 1.0 && self.scale.is_finite()) {
                    return Err(Error::InvalidParameter(format!(
                        "scale must be larger than 1, got {}", self.scale
                    )));
                }
            }
        }

        return Ok(());
    }
}
