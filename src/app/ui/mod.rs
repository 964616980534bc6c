pub(super) mod controls;
mod details;
mod panels;
