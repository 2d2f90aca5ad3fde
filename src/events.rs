use std::path::PathBuf;

use crate::asset::ImageAsset;
use crate::error::Error;
use crate::session::LoadTicket;

/// Delivered to the viewer's event loop from background tasks.
#[derive(Debug)]
pub enum ViewerEvent {
    Decoded(ImageDecoded),
    Cancelled,
}

/// Outcome of a background decode, tagged with the load it belongs to.
#[derive(Debug)]
pub struct ImageDecoded {
    pub ticket: LoadTicket,
    pub path: PathBuf,
    pub result: Result<ImageAsset, Error>,
}

/// User intents the viewer maps keys and drops onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    Randomize,
    NextInk,
    Clear,
    ToggleStrategy,
    Open(PathBuf),
    Quit,
}
