pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod gradient;
pub(crate) mod layers;
pub(crate) mod mask;
pub(crate) mod silhouette;
