// This is free and unencumbered software released into the public domain.

mod camera;
pub use camera::*;

mod config;
pub use config::*;

mod driver;
pub use driver::*;

pub mod drivers {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "android")] {
            pub mod ndk;
        }
    }

    pub mod synthetic;
}

mod error;
pub use error::*;

mod frame;
pub use frame::*;

mod open;
pub use open::*;

mod rotation;
pub use rotation::*;

mod slot;
pub use slot::*;
