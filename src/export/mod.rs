pub(crate) mod capture;
pub(crate) mod media;
pub(crate) mod picker;
pub(crate) mod pipeline;
