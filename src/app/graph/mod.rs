mod build;
pub(super) mod interaction;
mod view;
