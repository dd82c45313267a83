//! Frame-level scheduling and the frame driver.
//!
//! - [`FrameUniforms`] - values shared by every draw of a frame
//! - [`Drawable`] - one mesh instance with its material
//! - [`DrawScheduler`] - buckets, orders and issues drawables
//! - [`Renderer`] - owns the backend and every component, runs frames
//!
//! # Frame Flow
//!
//! ```text
//! begin_frame(FrameUniforms)   poll backend errors, reset scheduler
//!   submit(Drawable) ...       classify into opaque / transparent
//! end_frame()                  sort opaque by program, issue opaque,
//!                              issue transparent in submission order
//! ```

mod drawable;
mod frame;
mod renderer;
mod scheduler;

pub use drawable::{Drawable, RenderBucket};
pub use frame::{FrameUniforms, LightParameters};
pub use renderer::{FrameReport, Renderer};
pub use scheduler::{DrawScheduler, FrameState, IssueSummary, QueuedDraw, SkippedDraw};
