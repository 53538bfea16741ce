//! Host process services: lifecycle notifications, background execution
//! grants and directory resolution.

mod background;
mod directories;
mod lifecycle;

pub use background::HostBackgroundExecution;
pub use directories::PlatformDirectories;
pub use lifecycle::HostLifecycle;
