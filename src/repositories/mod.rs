pub(crate) mod desks;
pub(crate) mod users;
