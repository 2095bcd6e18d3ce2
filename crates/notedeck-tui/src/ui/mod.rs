pub(crate) mod modal;
pub(crate) mod text;
