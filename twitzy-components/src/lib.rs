macro_rules! impl_compose {
    ($($part:ty),* $(,)?) => {
        $(
            impl $crate::component::Compose for $part {
                fn props_mut(&mut self) -> &mut $crate::component::Props {
                    &mut self.props
                }
            }
        )*
    };
}

pub mod app;
pub mod clipboard;
pub mod component;
pub mod config;
pub mod error;
pub mod gradient;
pub mod node;

pub mod overview;
pub mod thread;
pub mod threads;
pub mod tweet;

pub use app::App;
#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use component::{from_fn, Component, Compose, Cx, Props};
pub use config::Config;
pub use error::RenderError;
pub use gradient::{generate_gradient, Gradient};
pub use node::{Element, Node};
