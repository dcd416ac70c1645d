pub(crate) mod auth;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod materials;
pub(crate) mod practice;
pub(crate) mod router;
pub(crate) mod validation;
