//! Stage topology for layerview.
//!
//! Turns the static [`LayerTable`] and a [`GroupedSnapshot`] of the store
//! into an ordered list of [`Stage`]s. Layers sharing a rank are one stage;
//! stages run in ascending rank. Categories seen in the snapshot but absent
//! from the table land in one extra stage ranked after everything else.
//!
//! The output is rebuilt from scratch on every call and never patched.

mod activity;
mod builder;

pub use activity::{is_app_active, is_layer_active};
pub use builder::{build_topology, capitalize, DependencyEdge, LayerView, Stage, Topology, Transition};

#[doc(no_inline)]
pub use layerview_store::GroupedSnapshot;
#[doc(no_inline)]
pub use layerview_types::LayerTable;
