use std::collections::HashMap;
use std::marker::PhantomData;
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope, Aggregate, serialize_event, deserialize_event};

// ============================================================================
// In-Memory Event Store
// ============================================================================
//
// Append-only event log per aggregate, kept for the lifetime of the process.
//
// Responsibilities:
// 1. Append events (append-only)
// 2. Load event history for aggregates
// 3. Optimistic concurrency control on the aggregate version
//
// Payloads are kept as JSON so that what is stored is exactly what would go
// over the wire, and a history that no longer deserializes fails loudly.
//
// ============================================================================

#[derive(Debug, Clone)]
struct StoredEvent {
    event_id: Uuid,
    sequence_number: i64,
    event_type: String,
    event_version: i32,
    event_data: String,
    causation_id: Option<Uuid>,
    correlation_id: Uuid,
    user_id: Option<Uuid>,
    timestamp: DateTime<Utc>,
    metadata: HashMap<String, String>,
}

#[derive(Debug)]
pub struct InMemoryEventStore<E: DomainEvent> {
    aggregate_type_name: String,
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
    _phantom: PhantomData<E>,
}

impl<E: DomainEvent> InMemoryEventStore<E> {
    pub fn new(aggregate_type_name: &str) -> Self {
        Self {
            aggregate_type_name: aggregate_type_name.to_string(),
            streams: RwLock::new(HashMap::new()),
            _phantom: PhantomData,
        }
    }

    /// Append events to the event store
    /// Returns the new version number after appending
    pub async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64> {
        if events.is_empty() {
            bail!("Cannot append empty event list");
        }

        // Serialize before taking the lock so a bad payload leaves the stream untouched
        let mut rows = Vec::with_capacity(events.len());
        let mut new_version = expected_version;
        for envelope in &events {
            new_version += 1;
            rows.push(StoredEvent {
                event_id: envelope.event_id,
                sequence_number: new_version,
                event_type: envelope.event_type.clone(),
                event_version: envelope.event_version,
                event_data: serialize_event(&envelope.event_data)?,
                causation_id: envelope.causation_id,
                correlation_id: envelope.correlation_id,
                user_id: envelope.user_id,
                timestamp: envelope.timestamp,
                metadata: envelope.metadata.clone(),
            });
        }

        let mut streams = self.streams.write().await;
        let stream = streams.entry(aggregate_id).or_default();

        let current_version = stream.last().map_or(0, |e| e.sequence_number);
        if current_version != expected_version {
            bail!(
                "Concurrency conflict: expected version {}, but current is {}",
                expected_version,
                current_version
            );
        }

        stream.extend(rows);

        tracing::debug!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version = new_version,
            event_count = events.len(),
            "Appended events to event store"
        );

        Ok(new_version)
    }

    /// Load all events for an aggregate, in sequence order
    pub async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>> {
        let streams = self.streams.read().await;
        let Some(stream) = streams.get(&aggregate_id) else {
            return Ok(Vec::new());
        };

        let mut events = Vec::with_capacity(stream.len());
        for row in stream {
            let event_data: E = deserialize_event(&row.event_data)?;
            events.push(EventEnvelope {
                event_id: row.event_id,
                aggregate_id,
                sequence_number: row.sequence_number,
                event_type: row.event_type.clone(),
                event_version: row.event_version,
                event_data,
                causation_id: row.causation_id,
                correlation_id: row.correlation_id,
                user_id: row.user_id,
                timestamp: row.timestamp,
                metadata: row.metadata.clone(),
            });
        }

        tracing::trace!("Loaded {} events for aggregate {}", events.len(), aggregate_id);
        Ok(events)
    }

    /// Current version of an aggregate, 0 when it has no events
    pub async fn get_current_version(&self, aggregate_id: Uuid) -> Result<i64> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(0, |e| e.sequence_number))
    }

    pub async fn load_aggregate<A>(&self, aggregate_id: Uuid) -> Result<A>
    where
        A: Aggregate<Event = E>,
        <A as Aggregate>::Error: std::fmt::Display,
    {
        let events = self.load_events(aggregate_id).await?;

        if events.is_empty() {
            bail!("Aggregate not found: {}", aggregate_id);
        }

        A::load_from_events(events)
    }

    pub async fn aggregate_exists(&self, aggregate_id: Uuid) -> Result<bool> {
        let version = self.get_current_version(aggregate_id).await?;
        Ok(version > 0)
    }
}
