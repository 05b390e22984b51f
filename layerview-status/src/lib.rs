//! Status classification for layerview.
//!
//! Maps the raw, partially-populated status fields of an application onto a
//! small set of rendering tiers. Every function here is pure and total:
//! unrecognized or absent inputs fall through to [`StatusTier::Pending`]
//! rather than failing.
//!
//! When several signals are combined the precedence is fixed:
//! error beats running beats ok beats pending.

mod classify;
mod rollup;
mod tier;

pub use classify::{
    classify_app, classify_health, classify_hook, classify_sync, classify_validation,
    layer_status, AppStatus, HookBadge, LayerHealth,
};
pub use rollup::{classify_resource_rollup, kind_priority, summarize_resources, KindSummary, ResourceSummary};
pub use tier::{Classification, HookIcon, StatusTier};
