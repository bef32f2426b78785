/// Geometry cache listing and sampling command.
pub mod cache;
/// Retained document tree command.
pub mod dom;
/// Element listing command.
pub mod elements;
/// Animation evaluation command.
pub mod eval;
/// File-level information command.
pub mod info;
/// Node hierarchy command.
pub mod nodes;
/// Element property listing command.
pub mod props;
/// Shared command helpers.
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;
