//! Configuration persistence

mod xdg;

pub use xdg::XdgConfigStore;
