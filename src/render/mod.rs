pub(crate) mod anim;
pub(crate) mod cpu;
pub(crate) mod raster;
pub(crate) mod tint;
