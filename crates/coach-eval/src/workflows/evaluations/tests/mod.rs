mod autosave;
mod common;
mod routing;
