pub(crate) mod descriptor;
pub(crate) mod model;
pub(crate) mod registry;
