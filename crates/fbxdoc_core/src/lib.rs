//! Public library API for loading binary and ASCII `.fbx` scenes.

/// FBX parsing, scene resolution, evaluation, and geometry helpers.
pub mod fbx;
