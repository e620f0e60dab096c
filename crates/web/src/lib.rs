//! Browser host for frame widgets.
//!
//! The default build is a stub; enable the `web` feature and target
//! `wasm32-unknown-unknown` to get the DOM bindings.  A page mounts each
//! widget element once the bundle is initialised:
//!
//! ```js
//! import init, { mount_loader, mount_frame } from "./frame_web.js";
//!
//! await init();
//! // <wasm-loader src="/games/asteroids.wasm.gz" script-path="/games/asteroids.js">
//! document.querySelectorAll("wasm-loader").forEach((el) => mount_loader(el));
//! document.querySelectorAll("wasm-frame").forEach((el) => mount_frame(el));
//! ```
//!
//! The module named by `script-path` is imported only when the load control
//! is clicked.  Pages that already hold the module may pass it as the second
//! argument to `mount_loader` instead.

pub mod attrs;

pub use attrs::{config_from_attributes, part_selector};

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod console;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod dom;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod glue;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use dom::{mount_frame, mount_loader, WidgetHandle};
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use glue::{highlight_nav, track_clicks};
