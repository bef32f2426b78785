//! Animation evaluation over a loaded scene.
//!
//! Curves are sampled per component, properties combine across the layers
//! of an [`crate::fbx::Anim`], and [`evaluate_scene`] derives a posed copy
//! of the whole scene from them.

mod blend;
mod curve;
mod props;
mod scene;
mod skin;

/// Blend channel weights.
pub use blend::evaluate_blend_weight;
pub(crate) use blend::update_blend_keyframes;
/// Keyframe curve sampling.
pub use curve::evaluate_curve;
/// Layered property evaluation.
pub use props::{evaluate_prop, evaluate_props, evaluate_transform, prepare_prop_overrides};
/// Posed scene snapshots.
pub use scene::{EvaluateOpts, EvaluatedScene, evaluate_scene};
pub(crate) use skin::deformed_positions;

#[cfg(test)]
mod tests;
