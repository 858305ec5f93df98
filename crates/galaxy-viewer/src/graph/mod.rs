pub mod interaction;
pub mod model;
pub mod state;

pub use interaction::InteractionState;
pub use state::{GalaxyState, InfoTab};
