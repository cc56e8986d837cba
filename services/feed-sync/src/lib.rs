//! Feed Synchronizer
//!
//! Keeps a live, queryable snapshot of sporting events by periodically
//! pulling two upstream feeds:
//! - An identifier → name mapping table (`id:name;id:name;...`)
//! - A line-encoded event feed (one event per line, eight fields)
//!
//! Each poll cycle decodes both payloads and reconciles the decoded batch
//! into the snapshot store. Events that vanish from the feed are
//! tombstoned with status `REMOVED`, hidden from readers, and revived if
//! they reappear.
//!
//! # Architecture
//!
//! ```text
//!   Scheduler tick
//!        │
//!   ┌────┴──────────────┐
//!   │                   │
//! ┌─▼──────────┐  ┌─────▼──────┐
//! │ Mapping    │  │ State      │   ← fetched concurrently
//! │ Provider   │  │ Provider   │
//! └─┬──────────┘  └─────┬──────┘
//!   │                   │
//! ┌─▼──────────┐        │
//! │ Mapping    │        │
//! │ Decoder    ├──┐     │
//! └────────────┘  │     │
//!               ┌─▼─────▼────┐
//!               │ Event Line │  ← bad lines dropped, rest continue
//!               │ Decoder    │
//!               └─────┬──────┘
//!               ┌─────▼──────┐
//!               │ Reconciler │  ← added / changed / removed
//!               └─────┬──────┘
//!               ┌─────▼──────┐
//!               │ Snapshot   │  ← read by the HTTP layer
//!               │ Store      │
//!               └────────────┘
//! ```

pub mod decoder;
pub mod mappings;
pub mod metrics;
pub mod providers;
pub mod reconciler;
pub mod scheduler;
pub mod store;

pub use decoder::{decode_event_line, decode_event_payload, DecodedBatch, LineFailure};
pub use mappings::{decode_mappings, MappingDecode};
pub use metrics::FeedMetrics;
pub use providers::{
    build_client, HttpMappingProvider, HttpStateProvider, MappingProvider, ProviderError,
    StateProvider,
};
pub use reconciler::{reconcile, EventChange, FieldChange, ReconcileReport};
pub use scheduler::{CycleReport, PollError, Scheduler, SchedulerConfig};
pub use store::SnapshotStore;
