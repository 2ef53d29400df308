#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::must_use_candidate, clippy::comparison_chain)]
#![allow(clippy::redundant_field_names, clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unreadable_literal, clippy::option_if_let_else, clippy::range_plus_one)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::cast_sign_loss)]
#![allow(clippy::default_trait_access, clippy::too_many_arguments)]

// Tests lints
#![cfg_attr(test, allow(clippy::float_cmp))]

//! Neighbor searches for particle configurations with periodic boundary
//! conditions.
//!
//! The points are indexed in a [`NeighborQuery`] (either an [`AabbQuery`] or a
//! [`LinkCell`]), which can then find the neighbors of a set of query points
//! within a cutoff, or their `k` nearest neighbors. The results are stored in
//! a [`NeighborList`], or consumed directly with the drivers in [`compute`].
//!
//! ```
//! use locality::{AabbQuery, NeighborQuery, QueryArgs, SimulationBox, Vector3D};
//!
//! let cell = SimulationBox::square(10.0);
//! let points = [
//!     Vector3D::new(-4.75, 0.0, 0.0),
//!     Vector3D::new(4.75, 0.0, 0.0),
//! ];
//!
//! let query = NeighborQuery::from(AabbQuery::new(cell, &points));
//! let args = QueryArgs::ball(1.0).with_exclude_ii(true);
//! let list = query.query(&points, args)?.to_neighbor_list();
//!
//! assert_eq!(list.num_bonds(), 2);
//! assert!((list.distances()[0] - 0.5).abs() < 1e-12);
//! # Ok::<(), locality::Error>(())
//! ```

pub mod types;
pub use types::*;

mod errors;
pub use self::errors::Error;

mod simulation_box;
pub use self::simulation_box::{BoxShape, SimulationBox};

pub mod neighbors;
pub use self::neighbors::{NeighborBond, NeighborList};
pub use self::neighbors::{QueryArgs, QueryMode};
pub use self::neighbors::{NeighborQuery, NeighborQueryIterator, AabbQuery, LinkCell, RawPoints};

pub mod compute;
pub use self::compute::{loop_over_neighbors, loop_over_neighbors_iterator};
