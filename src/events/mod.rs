//! # Events Module
//!
//! Push-style notifications for scan jobs.
//!
//! ## Design
//! Polling the [`JobRegistry`](crate::core::registry::JobRegistry) is the primary way
//! to follow a job. A registry built with an [`EventSender`] additionally pushes
//! [`ScanEvent`]s, which lets a UI react to skipped files without re-polling.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let registry = JobRegistry::builder().events(sender).build();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let ScanEvent::FileSkipped { path, .. } = event {
//!             eprintln!("skipped {}", path.display());
//!         }
//!     }
//! });
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender};
pub use types::*;
