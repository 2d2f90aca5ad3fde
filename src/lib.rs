//! Dithered poster backgrounds: a photo reduced to one ink color, drawn on a
//! tilted plane that fills the camera's view.

pub mod asset;
pub mod config;
pub mod error;
pub mod events;
pub mod processing;
pub mod render;
pub mod session;
pub mod tasks {
    pub mod loader;
    pub mod viewer;
}
pub mod testkit;

pub use error::Error;
pub use session::{LoadOutcome, LoadTicket, RenderSession};
