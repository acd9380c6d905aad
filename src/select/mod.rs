pub(crate) mod color;
pub(crate) mod mapping;
