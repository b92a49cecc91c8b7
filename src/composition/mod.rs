pub(crate) mod action;
pub(crate) mod layout;
pub(crate) mod model;
