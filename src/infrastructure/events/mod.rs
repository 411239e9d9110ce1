//! In-process event delivery.
//!
//! - [`ChannelEventBus`] - Publishes into a bounded tokio channel
//! - [`EventDispatcher`] - Drains the channel and fans events out to the
//!   handlers registered at startup, with bounded concurrency and retry

mod channel_bus;
mod dispatcher;

pub use channel_bus::ChannelEventBus;
pub use dispatcher::{DispatcherSettings, EventDispatcher};
