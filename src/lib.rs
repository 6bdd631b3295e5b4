/// wallcrop: browse a directory of images and crop each one to a fixed
/// aspect ratio.
///
/// - `selection`: the aspect-locked selection box and its constraint rules
/// - `state`: navigation ring, session coordinator and configuration
/// - `validation`: lazy decode/render checks for ring entries
/// - `io`: directory scan, image collaborators and crop export
/// - `ui`: keyboard mapping, overlay drawing and window title

pub mod cli;
pub mod color;
pub mod error;
pub mod geometry;
pub mod io;
pub mod selection;
pub mod state;
pub mod ui;
pub mod validation;
