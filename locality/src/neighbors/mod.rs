//! Spatial indexes used to find the neighbors of points under periodic
//! boundary conditions, and the `NeighborList` used to store the result of
//! these searches.

mod bond;
pub use self::bond::NeighborBond;

mod list;
pub use self::list::{NeighborList, NeighborListPointIterator};

mod args;
pub use self::args::{QueryArgs, QueryMode};

mod images;

mod aabb;
mod aabb_query;
pub use self::aabb_query::{AabbQuery, AabbBallIterator};

mod link_cell;
pub use self::link_cell::{LinkCell, LinkCellBallIterator};

mod nearest;
pub use self::nearest::NearestIterator;

mod query;
pub use self::query::{NeighborQuery, NeighborQueryIterator, PointNeighbors, RawPoints};
