pub(crate) mod svg;
