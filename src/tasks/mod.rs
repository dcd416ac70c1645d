pub(crate) mod evaluation;
pub(crate) mod staging;
pub(crate) mod upload;
