//! In-process publish/subscribe bus
//!
//! Topics are named broadcast channels bound to a single payload kind.
//! Publishers stamp every message with a per-topic sequence number and
//! deliver it to every live subscription; publishing never blocks and never
//! fails for lack of subscribers.
//!
//! ```text
//!  Publisher<M> ──publish──▶ ┌──────────────┐ ──recv──▶ Subscription<M>
//!                            │ topic "/x"   │ ──recv──▶ Subscription<M>
//!  Publisher<M> ──publish──▶ │ KeepLast(N)  │
//!                            └──────────────┘
//! ```

pub mod bus;
pub mod error;
pub mod qos;
pub mod shutdown;

pub use bus::{Bus, Delivery, Publisher, Subscription};
pub use error::BusError;
pub use qos::{LagTracker, QosProfile};
pub use shutdown::{ShutdownListener, ShutdownSignal};
